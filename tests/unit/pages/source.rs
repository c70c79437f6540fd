use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_page_dimensions_and_premul() {
    let page = decode_page(&png_bytes(3, 2, [100, 50, 200, 128])).unwrap();
    assert_eq!((page.width, page.height), (3, 2));
    assert_eq!(
        &page.rgba8_premul[..4],
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
    assert!(decode_page(b"not an image").is_err());
}

#[test]
fn byte_length_is_validated() {
    assert!(PageBitmap::from_premul_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(PageBitmap::from_premul_rgba8(0, 2, Vec::new()).is_err());
    assert!(PageBitmap::from_premul_rgba8(2, 2, vec![0; 16]).is_ok());
}

#[test]
fn clones_share_identity_and_new_bitmaps_do_not() {
    let a = PageBitmap::solid(2, 2, [255, 255, 255, 255]).unwrap();
    let b = a.clone();
    let c = PageBitmap::solid(2, 2, [255, 255, 255, 255]).unwrap();
    assert_eq!(a.id(), b.id());
    assert_ne!(a.id(), c.id());
}

#[test]
fn sequence_reports_first_page_aspect() {
    let seq: PageSequence = [
        PageBitmap::solid(200, 100, [0, 0, 0, 255]).unwrap(),
        PageBitmap::solid(50, 100, [0, 0, 0, 255]).unwrap(),
    ]
    .into_iter()
    .collect();
    assert_eq!(seq.page_count(), 2);
    assert_eq!(seq.aspect_ratio(), Some(2.0));
    assert!(seq.page(2).is_none());
    assert_eq!(PageSequence::default().aspect_ratio(), None);
}

#[test]
fn load_page_dir_sorts_and_filters() {
    let dir = std::env::temp_dir().join(format!("flipbook-pages-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("b.png"), png_bytes(4, 8, [0, 0, 255, 255])).unwrap();
    std::fs::write(dir.join("a.png"), png_bytes(2, 8, [255, 0, 0, 255])).unwrap();
    std::fs::write(dir.join("notes.txt"), b"skip me").unwrap();

    let seq = load_page_dir(&dir).unwrap();
    assert_eq!(seq.page_count(), 2);
    assert_eq!(seq.page(0).map(|p| p.width), Some(2));
    assert_eq!(seq.page(1).map(|p| p.width), Some(4));

    std::fs::remove_dir_all(&dir).unwrap();
    assert!(load_page_dir(&dir).is_err());
}
