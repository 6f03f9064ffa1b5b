use super::*;
use crate::foundation::core::Canvas;

const CAT: Rgb8 = Rgb8::new(255, 204, 0);

#[test]
fn half_opacity_rounds_to_128() {
    assert_eq!(Paint::with_opacity(CAT, 0.5).alpha, 128);
    assert_eq!(Paint::with_opacity(CAT, 2.0).alpha, 255);
    assert_eq!(Paint::with_opacity(CAT, -1.0).alpha, 0);
}

#[test]
fn overwrite_replaces_destination_opaque() {
    let out = blend([9, 9, 9, 255], Paint::with_opacity(CAT, 0.5), BlendMode::Overwrite);
    assert_eq!(out, [255, 204, 0, 255]);
}

#[test]
fn toggle_over_background_is_half_blend_over_black() {
    let out = blend(BACKGROUND, Paint::with_opacity(CAT, 0.5), BlendMode::ToggleAlpha);
    assert_eq!(out, [128, 102, 0, 255]);
}

#[test]
fn toggle_twice_restores_any_destination() {
    let paint = Paint::with_opacity(Rgb8::new(174, 255, 0), 0.5);
    for dst in [BACKGROUND, [17, 200, 33, 255], [255, 255, 255, 255], [1, 2, 3, 4]] {
        let once = blend(dst, paint, BlendMode::ToggleAlpha);
        assert_ne!(once, dst);
        assert_eq!(blend(once, paint, BlendMode::ToggleAlpha), dst);
    }
}

#[test]
fn clear_under_resets_to_background() {
    let paint = Paint::opaque(Rgb8::BLACK);
    assert_eq!(blend([200, 10, 30, 255], paint, BlendMode::ClearUnder), BACKGROUND);
    assert_eq!(blend(BACKGROUND, paint, BlendMode::ClearUnder), BACKGROUND);
}

#[test]
fn blend_covered_touches_only_covered_pixels() {
    let canvas = Canvas::new(3, 1).unwrap();
    let mut coverage = Coverage::new(canvas);
    coverage.set(1, 0);

    let mut buf = BACKGROUND.repeat(3);
    blend_covered_in_place(&mut buf, &coverage, Paint::opaque(CAT), BlendMode::Overwrite)
        .unwrap();
    assert_eq!(&buf[0..4], &BACKGROUND);
    assert_eq!(&buf[4..8], &[255, 204, 0, 255]);
    assert_eq!(&buf[8..12], &BACKGROUND);
}

#[test]
fn blend_covered_rejects_mismatched_buffer() {
    let coverage = Coverage::new(Canvas::new(2, 2).unwrap());
    let mut buf = vec![0u8; 4];
    assert!(
        blend_covered_in_place(&mut buf, &coverage, Paint::opaque(CAT), BlendMode::Overwrite)
            .is_err()
    );
}

#[test]
fn toggle_depends_on_paint_order() {
    let cat = Paint::with_opacity(CAT, 0.5);
    let dog = Paint::with_opacity(Rgb8::new(174, 255, 0), 0.5);
    let cat_then_dog = blend(
        blend(BACKGROUND, cat, BlendMode::ToggleAlpha),
        dog,
        BlendMode::ToggleAlpha,
    );
    let dog_then_cat = blend(
        blend(BACKGROUND, dog, BlendMode::ToggleAlpha),
        cat,
        BlendMode::ToggleAlpha,
    );
    assert_eq!(cat_then_dog, [215, 26, 0, 255]);
    assert_eq!(dog_then_cat, [41, 230, 0, 255]);
}
