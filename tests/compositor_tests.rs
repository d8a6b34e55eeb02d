//! End-to-end compositor behavior through the public crate API

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};
use sketchsolve::canvas::compositor::{CANVAS_HEIGHT, CANVAS_WIDTH};
use sketchsolve::canvas::{Compositor, InputMode, Stroke};

fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

#[test]
fn freehand_drawing_produces_opaque_fixed_canvas() {
    let mut compositor = Compositor::new();
    for i in 0..5 {
        let offset = i as f32 * 20.0;
        compositor.apply_stroke(&Stroke::freehand(vec![
            (10.0 + offset, 10.0),
            (10.0 + offset, 390.0),
        ]));
    }

    let composite = compositor.composite().expect("freehand always composites");
    assert_eq!(composite.dimensions(), (CANVAS_WIDTH, CANVAS_HEIGHT));
    assert!(composite.pixels().all(|p| p.0[3] == 255));
}

#[test]
fn jpeg_upload_is_accepted() {
    let img = RgbaImage::from_pixel(64, 48, image::Rgba([200, 180, 160, 255]));
    let mut bytes = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .to_rgb8()
        .write_to(&mut bytes, ImageFormat::Jpeg)
        .unwrap();

    let mut compositor = Compositor::new();
    compositor.select_mode(InputMode::Overlay);
    compositor.set_base_image(&bytes.into_inner()).unwrap();

    let composite = compositor.composite().unwrap();
    assert_eq!(composite.dimensions(), (64, 48));
}

#[test]
fn annotated_photo_keeps_base_outside_strokes() {
    let base = RgbaImage::from_pixel(80, 80, image::Rgba([10, 20, 30, 255]));

    let mut compositor = Compositor::new();
    compositor.select_mode(InputMode::Overlay);
    compositor.set_base_image(&png_bytes(&base)).unwrap();
    compositor.apply_stroke(&Stroke::annotation(vec![(10.0, 40.0), (70.0, 40.0)]));

    let composite = compositor.composite().unwrap();
    // A corner far from the stroke still shows the photo
    assert_eq!(composite.get_pixel(2, 2).0, [10, 20, 30, 255]);
    // The stroke is on top of the photo
    assert_eq!(composite.get_pixel(40, 40).0, [255, 0, 0, 255]);
}

#[test]
fn transparent_base_pixels_are_forced_opaque() {
    let base = RgbaImage::from_pixel(16, 16, image::Rgba([40, 40, 40, 0]));

    let mut compositor = Compositor::new();
    compositor.select_mode(InputMode::Overlay);
    compositor.set_base_image(&png_bytes(&base)).unwrap();

    let composite = compositor.composite().unwrap();
    assert!(composite.pixels().all(|p| p.0[3] == 255));
}

#[test]
fn round_trip_through_submission_encoding() {
    let mut compositor = Compositor::new();
    compositor.apply_stroke(&Stroke::freehand(vec![(50.0, 50.0), (350.0, 350.0)]));

    let png = compositor.composite_png().unwrap().unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.as_raw(), compositor.composite().unwrap().as_raw());
}

#[test]
fn mode_round_trip_starts_from_scratch() {
    let mut compositor = Compositor::new();
    compositor.apply_stroke(&Stroke::freehand(vec![(100.0, 100.0), (300.0, 300.0)]));

    compositor.select_mode(InputMode::Overlay);
    assert!(compositor.composite().is_none());

    compositor.select_mode(InputMode::Freehand);
    let composite = compositor.composite().unwrap();
    assert!(composite.pixels().all(|p| p.0 == [255, 255, 255, 255]));
}
