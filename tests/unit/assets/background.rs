use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, f: impl Fn(u32, u32) -> [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(w, h, |x, y| image::Rgba(f(x, y)));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn wide_source_crops_width_centered() {
    let rect = center_crop_rect(2000, 1000, Resolution::new(1920, 1080));
    assert_eq!(
        rect,
        CropRect {
            left: 111,
            top: 0,
            width: 1777,
            height: 1000
        }
    );
}

#[test]
fn tall_source_crops_height_centered() {
    let rect = center_crop_rect(1000, 1000, Resolution::new(1920, 1080));
    // 1000 * 1080 / 1920 = 562.5 -> 562
    assert_eq!(
        rect,
        CropRect {
            left: 0,
            top: 219,
            width: 1000,
            height: 562
        }
    );

    let portrait = center_crop_rect(1920, 1080, Resolution::new(1080, 1920));
    // 1080 * 1080 / 1920 = 607.5 -> 607, (1920 - 607) / 2 = 656
    assert_eq!(portrait.width, 607);
    assert_eq!(portrait.left, 656);
    assert_eq!(portrait.height, 1080);
}

#[test]
fn exact_aspect_keeps_everything() {
    let rect = center_crop_rect(1280, 720, Resolution::new(1920, 1080));
    assert_eq!(
        rect,
        CropRect {
            left: 0,
            top: 0,
            width: 1280,
            height: 720
        }
    );
}

#[test]
fn crop_is_deterministic() {
    let a = center_crop_rect(4032, 3024, Resolution::new(3840, 2160));
    let b = center_crop_rect(4032, 3024, Resolution::new(3840, 2160));
    assert_eq!(a, b);
}

#[test]
fn decoded_background_matches_target_size() {
    let bytes = png_bytes(40, 20, |x, _| if x < 20 { [255, 0, 0, 255] } else { [0, 0, 255, 255] });
    let bg = Background::decode(&bytes, Resolution::new(32, 18)).unwrap();
    assert_eq!(bg.resolution, Resolution::new(32, 18));
    assert_eq!(bg.rgba8_premul.len(), 32 * 18 * 4);
    // left column red, right column blue
    let first = &bg.rgba8_premul[0..4];
    assert!(first[0] > 240 && first[2] < 15 && first[3] > 250, "{first:?}");
    let last = (18 * 32 - 1) * 4;
    let last = &bg.rgba8_premul[last..last + 4];
    assert!(last[2] > 240 && last[0] < 15 && last[3] > 250, "{last:?}");
}

#[test]
fn translucent_pixels_are_premultiplied() {
    let bytes = png_bytes(16, 9, |_, _| [200, 100, 50, 128]);
    let bg = Background::decode(&bytes, Resolution::new(16, 9)).unwrap();
    let expected = [
        ((200u16 * 128 + 127) / 255) as u8,
        ((100u16 * 128 + 127) / 255) as u8,
        ((50u16 * 128 + 127) / 255) as u8,
        128,
    ];
    for (got, want) in bg.rgba8_premul[0..4].iter().zip(expected) {
        assert!(got.abs_diff(want) <= 1, "{got} vs {want}");
    }
}

#[test]
fn load_errors_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("cover.png");
    std::fs::write(&bad, b"not a png").unwrap();
    let err = Background::load(&bad, Resolution::new(16, 9)).unwrap_err();
    assert!(matches!(err, LyricError::Asset(_)));
    assert!(err.to_string().contains("cover.png"));
}

#[test]
fn folder_pick_is_stable_and_filtered() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.jpg", "b.PNG", "c.bmp", "notes.txt"] {
        std::fs::write(dir.path().join(name), b"x").unwrap();
    }
    let listed = list_background_images(dir.path()).unwrap();
    assert_eq!(listed.len(), 3);

    let first = pick_background(dir.path(), "song1", 7).unwrap();
    let again = pick_background(dir.path(), "song1", 7).unwrap();
    assert_eq!(first, again);
    assert!(listed.contains(&first));

    let file = dir.path().join("a.jpg");
    assert_eq!(pick_background(&file, "song1", 7).unwrap(), file);

    let empty = tempfile::tempdir().unwrap();
    assert!(matches!(
        pick_background(empty.path(), "x", 0),
        Err(LyricError::Config(_))
    ));
}
