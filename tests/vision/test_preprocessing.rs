// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Preprocessing tests over encoded uploads
//!
//! Every decodable upload, whatever its format, color mode, or size, must come
//! out as a `[1, 256, 256, 1]` tensor of intensities in `[0, 1]`.

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use mammo_screen::vision::{normalize, ImageError, PreprocessError, TargetSize};
use std::io::Cursor;

fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), format)
        .expect("encode test image");
    buf
}

fn gradient_rgb(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }))
}

fn assert_valid_tensor(bytes: &[u8]) {
    let tensor = normalize(bytes, TargetSize::default()).expect("normalize");
    assert_eq!(tensor.shape(), &[1, 256, 256, 1]);
    assert!(
        tensor.iter().all(|v| (0.0..=1.0).contains(v)),
        "tensor values must lie in [0, 1]"
    );
}

/// Test 1: A 256x256 black PNG normalizes to all zeros
#[test]
fn test_black_png_is_all_zero() {
    let black = DynamicImage::ImageLuma8(GrayImage::from_pixel(256, 256, Luma([0])));
    let tensor = normalize(&encode(&black, ImageFormat::Png), TargetSize::default()).unwrap();

    assert_eq!(tensor.shape(), &[1, 256, 256, 1]);
    assert!(tensor.iter().all(|v| *v == 0.0));
}

/// Test 2: A white image normalizes to all ones
#[test]
fn test_white_png_is_all_one() {
    let white = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 64, Luma([255])));
    let tensor = normalize(&encode(&white, ImageFormat::Png), TargetSize::default()).unwrap();

    assert!(tensor.iter().all(|v| (*v - 1.0).abs() < 1e-6));
}

/// Test 3: Color modes collapse to one channel
#[test]
fn test_color_modes_produce_single_channel() {
    let rgb = gradient_rgb(300, 200);
    assert_valid_tensor(&encode(&rgb, ImageFormat::Png));

    let rgba = DynamicImage::ImageRgba8(RgbaImage::from_fn(120, 90, |x, y| {
        Rgba([(x * 2) as u8, (y * 2) as u8, 128, (x % 256) as u8])
    }));
    assert_valid_tensor(&encode(&rgba, ImageFormat::Png));

    let gray16 = DynamicImage::ImageLuma16(image::ImageBuffer::from_fn(50, 50, |x, _| {
        Luma([(x as u16) * 1000])
    }));
    assert_valid_tensor(&encode(&gray16, ImageFormat::Png));
}

/// Test 4: Other container formats decode to the same shape
#[test]
fn test_jpeg_bmp_and_tiff_uploads() {
    let rgb = gradient_rgb(512, 384);
    assert_valid_tensor(&encode(&rgb, ImageFormat::Jpeg));
    assert_valid_tensor(&encode(&rgb, ImageFormat::Bmp));
    assert_valid_tensor(&encode(&rgb, ImageFormat::Tiff));
}

/// Test 5: Tiny and non-square inputs are scaled to the target
#[test]
fn test_extreme_sizes() {
    assert_valid_tensor(&encode(&gradient_rgb(1, 1), ImageFormat::Png));
    assert_valid_tensor(&encode(&gradient_rgb(1000, 20), ImageFormat::Png));
    assert_valid_tensor(&encode(&gradient_rgb(20, 1000), ImageFormat::Png));
}

/// Test 6: The same bytes always produce the same tensor
#[test]
fn test_normalize_is_deterministic() {
    let bytes = encode(&gradient_rgb(333, 222), ImageFormat::Png);
    let a = normalize(&bytes, TargetSize::default()).unwrap();
    let b = normalize(&bytes, TargetSize::default()).unwrap();
    assert_eq!(a, b);
}

/// Test 7: Non-image and truncated uploads are decode errors
#[test]
fn test_invalid_uploads_are_decode_errors() {
    let result = normalize(b"%PDF-1.4 definitely not a scan", TargetSize::default());
    assert!(matches!(result, Err(PreprocessError::Decode(ImageError::UnsupportedFormat))));

    let mut truncated = encode(&gradient_rgb(64, 64), ImageFormat::Png);
    truncated.truncate(40);
    let result = normalize(&truncated, TargetSize::default());
    assert!(matches!(result, Err(PreprocessError::Decode(_))));

    let result = normalize(&[], TargetSize::default());
    assert!(matches!(result, Err(PreprocessError::Decode(ImageError::EmptyData))));
}

/// Test 8: Custom targets change the tensor shape accordingly
#[test]
fn test_custom_target() {
    let bytes = encode(&gradient_rgb(100, 100), ImageFormat::Png);
    let target = TargetSize::new(128, 64).unwrap();
    let tensor = normalize(&bytes, target).unwrap();
    assert_eq!(tensor.shape(), &[1, 64, 128, 1]);
    assert_eq!(target.tensor_shape(), [1, 64, 128, 1]);
}
