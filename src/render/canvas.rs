use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use super::{Placement, Surface};
use crate::error::SheetError;
use crate::sheet::Rect;

/// In-memory RGBA surface.
///
/// Smoothing starts enabled, like a fresh browser canvas.
pub struct Canvas {
    target: RgbaImage,
    smoothing: bool,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba([0, 0, 0, 0]))
    }

    pub fn filled(width: u32, height: u32, color: Rgba<u8>) -> Self {
        Self {
            target: RgbaImage::from_pixel(width, height, color),
            smoothing: true,
        }
    }

    pub fn smoothing(&self) -> bool {
        self.smoothing
    }

    pub fn image(&self) -> &RgbaImage {
        &self.target
    }

    pub fn into_image(self) -> RgbaImage {
        self.target
    }

    pub fn save(&self, path: &Path) -> Result<(), SheetError> {
        self.target
            .save(path)
            .map_err(|e| SheetError::from(e).with_arg("path", path.display()))
    }
}

impl Surface for Canvas {
    fn disable_smoothing(&mut self) {
        self.smoothing = false;
    }

    fn blit(&mut self, image: &RgbaImage, src: Rect, placement: &Placement) {
        let width = placement.size.x.round() as u32;
        let height = placement.size.y.round() as u32;
        if src.w == 0 || src.h == 0 || width == 0 || height == 0 {
            return;
        }

        let cut = imageops::crop_imm(image, src.x, src.y, src.w, src.h).to_image();
        let mut drawn = if (width, height) == (src.w, src.h) {
            cut
        } else {
            let filter = if self.smoothing {
                FilterType::Triangle
            } else {
                FilterType::Nearest
            };
            imageops::resize(&cut, width, height, filter)
        };

        if placement.flip_x {
            imageops::flip_horizontal_in_place(&mut drawn);
        }
        if placement.flip_y {
            imageops::flip_vertical_in_place(&mut drawn);
        }

        let origin = placement.dest_origin();
        imageops::overlay(
            &mut self.target,
            &drawn,
            origin.x.floor() as i64,
            origin.y.floor() as i64,
        );
    }
}
