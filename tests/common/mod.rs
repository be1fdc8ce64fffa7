#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const GREEN: [u8; 4] = [0, 255, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 255, 255];

/// A horizontal strip of 16x16 frames, each one solid colour.
pub fn strip(colors: &[[u8; 4]]) -> RgbaImage {
    let mut img = RgbaImage::new(16 * colors.len() as u32, 16);
    for (i, color) in colors.iter().enumerate() {
        for y in 0..16 {
            for x in 0..16 {
                img.put_pixel(i as u32 * 16 + x, y, Rgba(*color));
            }
        }
    }
    img
}

pub fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

/// Aseprite-style JSON for a strip of 16x16 frames with the given
/// durations and `(name, from, to)` tags.
pub fn sheet_json(durations: &[u32], tags: &[(&str, usize, usize)]) -> String {
    let frames: Vec<serde_json::Value> = durations
        .iter()
        .enumerate()
        .map(|(i, d)| {
            serde_json::json!({
                "filename": format!("sheet {i}.aseprite"),
                "frame": { "x": i * 16, "y": 0, "w": 16, "h": 16 },
                "rotated": false,
                "trimmed": false,
                "spriteSourceSize": { "x": 0, "y": 0, "w": 16, "h": 16 },
                "sourceSize": { "w": 16, "h": 16 },
                "duration": d
            })
        })
        .collect();
    let tags: Vec<serde_json::Value> = tags
        .iter()
        .map(|(name, from, to)| {
            serde_json::json!({ "name": name, "from": from, "to": to, "direction": "forward" })
        })
        .collect();
    serde_json::json!({
        "frames": frames,
        "meta": {
            "app": "https://www.aseprite.org/",
            "format": "RGBA8888",
            "size": { "w": durations.len() * 16, "h": 16 },
            "frameTags": tags
        }
    })
    .to_string()
}

/// The `hero` sheet: red (100 ms) then green (200 ms), tagged `idle`.
pub fn write_hero(dir: &Path) {
    std::fs::write(dir.join("hero.png"), png_bytes(&strip(&[RED, GREEN]))).unwrap();
    std::fs::write(
        dir.join("hero.json"),
        sheet_json(&[100, 200], &[("idle", 0, 1)]),
    )
    .unwrap();
}
