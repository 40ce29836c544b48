//! Image fixtures encoded with the `image` crate.

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]))
        .write_to(&mut bytes, format)
        .expect("Failed to encode fixture");
    bytes.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

pub fn gif(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Gif)
}

/// A valid PNG padded with trailing bytes up to `len`.
pub fn padded_png(width: u32, height: u32, len: usize) -> Vec<u8> {
    let mut bytes = png(width, height);
    bytes.resize(len.max(bytes.len()), 0);
    bytes
}


/// Photoshop header for an RGB image, padded to 400 bytes.
pub fn psd(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = b"8BPS\x00\x01\x00\x00\x00\x00\x00\x00\x00\x03".to_vec();
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&[0x00, 0x08, 0x00, 0x03]);
    bytes.resize(400, 0);
    bytes
}
