use super::*;

#[test]
fn fnv_seeded_hash_is_stable() {
    let mut a = Fnv1a64::new(7);
    a.write_bytes(b"lyric");
    let mut b = Fnv1a64::new(7);
    b.write_bytes(b"ly");
    b.write_bytes(b"ric");
    assert_eq!(a.finish(), b.finish());

    let mut c = Fnv1a64::new(8);
    c.write_bytes(b"lyric");
    assert_ne!(a.finish(), c.finish());
}

#[test]
fn finish_unit_stays_in_range() {
    for i in 0..1000u64 {
        let mut h = Fnv1a64::new(42);
        h.write_u64(i);
        let u = h.finish_unit();
        assert!((0.0..=1.0).contains(&u));
    }
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u8(255, 255), 255);
    assert_eq!(mul_div255_u8(128, 255), 128);
    assert_eq!(mul_div255_u8(0, 200), 0);
    assert_eq!(mul_div255_u16(100, 128), 50);
}
