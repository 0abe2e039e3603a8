use super::*;

fn sprite(w: u32, h: u32, px: [u8; 4]) -> TextSprite {
    TextSprite {
        width: w,
        height: h,
        rgba8_premul: px.repeat((w * h) as usize),
    }
}

#[test]
fn over_opaque_replaces_and_transparent_keeps() {
    let dst = [10, 20, 30, 255];
    assert_eq!(over(dst, [200, 100, 50, 255], 255), [200, 100, 50, 255]);
    assert_eq!(over(dst, [200, 100, 50, 0], 255), dst);
    assert_eq!(over(dst, [200, 100, 50, 255], 0), dst);
}

#[test]
fn over_half_opacity_blends() {
    let out = over([0, 0, 0, 255], [255, 255, 255, 255], opacity_u8(0.5));
    assert_eq!(out[3], 255);
    assert!((127..=129).contains(&out[0]), "{out:?}");
}

#[test]
fn blit_clips_to_destination() {
    let mut dst = vec![0u8; 4 * 4 * 4];
    blit_over(&mut dst, 4, 4, &sprite(3, 3, [255, 0, 0, 255]), -1, 2, 1.0);
    let at = |x: usize, y: usize| &dst[(y * 4 + x) * 4..(y * 4 + x) * 4 + 4];
    assert_eq!(at(0, 2), &[255, 0, 0, 255]);
    assert_eq!(at(1, 3), &[255, 0, 0, 255]);
    assert_eq!(at(2, 2), &[0, 0, 0, 0]);
    assert_eq!(at(0, 1), &[0, 0, 0, 0]);
}

#[test]
fn blit_fully_outside_is_noop() {
    let mut dst = vec![7u8; 2 * 2 * 4];
    blit_over(&mut dst, 2, 2, &sprite(2, 2, [255; 4]), 5, 5, 1.0);
    blit_over(&mut dst, 2, 2, &sprite(2, 2, [255; 4]), -3, 0, 1.0);
    blit_over(&mut dst, 2, 2, &sprite(2, 2, [255; 4]), 0, 0, 0.0);
    assert!(dst.iter().all(|&b| b == 7));
}

#[test]
fn flatten_over_black() {
    let mut out = Vec::new();
    flatten_to_opaque_rgba8(&mut out, &[128, 64, 0, 128, 0, 0, 0, 0], [0, 0, 0, 255]);
    assert_eq!(out, vec![128, 64, 0, 255, 0, 0, 0, 255]);

    flatten_to_opaque_rgba8(&mut out, &[0, 0, 0, 0], [255, 255, 255, 255]);
    assert_eq!(out, vec![255, 255, 255, 255]);
}
