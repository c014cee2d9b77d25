//! Integration tests for the binary stream format.

use pixtwin_core::prelude::*;
use pixtwin_core::registry;

fn patterned(width: u32, height: u32, format: BufferFormat) -> DualImage {
    let mut img = DualImage::with_size(width, height, format);
    for y in 0..height {
        for x in 0..width {
            let v = ((x * 13 + y * 7) % 256) as u8;
            img.buffer_mut().set_pixel_color(x, y, Color::rgba(v, 255 - v, v / 3, v));
        }
    }
    img
}

#[test]
fn round_trip_every_registry_format() {
    for format in BufferFormat::ALL {
        if !registry::is_valid_buffer_format(format) {
            continue;
        }
        // odd width so 8/16/24-bit rows carry padding
        let img = patterned(7, 3, format);
        let bytes = img.to_bytes().expect("serialize");
        let back = DualImage::from_bytes(&bytes).expect("deserialize");

        assert_eq!(back.format(), format, "{format:?}");
        assert_eq!(back.buffer(), img.buffer(), "{format:?}");
        assert_eq!(back.is_view_bound(), img.is_view_bound(), "{format:?}");
        assert!(back.is_view_bound(), "{format:?}");
        assert_eq!(back.view().to_packed_bytes(), img.view().to_packed_bytes());
    }
}

#[test]
fn alpha8_and_grayscale8_stay_distinct() {
    let alpha = patterned(4, 4, BufferFormat::Alpha8);
    let gray = patterned(4, 4, BufferFormat::Grayscale8);

    let alpha_back = DualImage::from_bytes(&alpha.to_bytes().unwrap()).unwrap();
    let gray_back = DualImage::from_bytes(&gray.to_bytes().unwrap()).unwrap();
    assert_eq!(alpha_back.format(), BufferFormat::Alpha8);
    assert_eq!(gray_back.format(), BufferFormat::Grayscale8);
    assert_eq!(alpha_back, alpha);
    assert_eq!(gray_back, gray);
}

#[test]
fn round_trip_through_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("image.ptw");

    let img = patterned(16, 9, BufferFormat::Argb32);
    img.save(&path).expect("save");
    let back = DualImage::load(&path).expect("load");
    assert_eq!(back, img);
}

#[test]
fn round_trip_keeps_unbound_state() {
    let mut img = patterned(5, 5, BufferFormat::Rgb888);
    img.view_mut().release();
    let back = DualImage::from_bytes(&img.to_bytes().unwrap()).unwrap();
    assert!(!back.is_view_bound());
    assert_eq!(back, img);
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = DualImage::load(dir.path().join("missing.ptw")).unwrap_err();
    assert!(err.is_stream_error());
}
