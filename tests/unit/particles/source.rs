use std::io::Cursor;

use super::*;

fn encode_png(img: &image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_keeps_straight_alpha() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100, 50, 200, 128]).unwrap();
    let src = SourceImage::decode(&encode_png(&img), 400).unwrap();
    assert_eq!(src.canvas(), Canvas { width: 1, height: 1 });
    assert_eq!(src.pixel(0, 0), Some(Rgba8::new(100, 50, 200, 128)));
    assert_eq!(src.pixel(1, 0), None);
}

#[test]
fn decode_rejects_garbage() {
    assert!(SourceImage::decode(b"definitely not an image", 400).is_err());
}

#[test]
fn fitted_size_preserves_aspect() {
    assert_eq!(fitted_size(800, 400, 400), Some((400, 200)));
    assert_eq!(fitted_size(300, 900, 400), Some((133, 400)));
    assert_eq!(fitted_size(400, 400, 400), None);
    assert_eq!(fitted_size(10, 10, 400), None);
    assert_eq!(fitted_size(4000, 1, 400), Some((400, 1)));
    assert_eq!(fitted_size(0, 10, 400), None);
}

#[test]
fn fit_within_downscales_large_images() {
    let img = image::RgbaImage::from_pixel(80, 40, image::Rgba([1, 2, 3, 255]));
    let src = SourceImage::from_rgba(img).fit_within(20);
    assert_eq!((src.width(), src.height()), (20, 10));
    assert_eq!(src.as_raw().len(), 20 * 10 * 4);
}

#[test]
fn from_rgba_does_not_resize() {
    let img = image::RgbaImage::new(500, 2);
    let src = SourceImage::from_rgba(img);
    assert_eq!(src.width(), 500);
}
