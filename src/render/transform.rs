use nalgebra_glm as glm;

use crate::error::SheetError;
use crate::sheet::Rect;

/// How a frame is placed on a surface.
///
/// `anchor` is the pivot inside the drawn rectangle as a ratio of its size
/// (`(0, 0)` top-left, `(0.5, 0.5)` centre, `(1, 1)` bottom-right).
/// `position` is where that pivot lands on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: glm::Vec2,
    pub scale: f32,
    pub anchor: glm::Vec2,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: glm::vec2(0.0, 0.0),
            scale: 1.0,
            anchor: glm::vec2(0.0, 0.0),
            flip_x: false,
            flip_y: false,
        }
    }
}

impl Transform {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: glm::vec2(x, y),
            ..Default::default()
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_anchor(mut self, x: f32, y: f32) -> Self {
        self.anchor = glm::vec2(x, y);
        self
    }

    pub fn flipped(mut self, flip_x: bool, flip_y: bool) -> Self {
        self.flip_x = flip_x;
        self.flip_y = flip_y;
        self
    }

    /// Work out where a frame of size `frame` ends up.
    pub fn place(&self, frame: &Rect) -> Result<Placement, SheetError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(SheetError::new("invalid-transform").with_arg("scale", self.scale));
        }

        let mut anchor = self.anchor;
        if self.flip_x {
            anchor.x = 1.0 - anchor.x;
        }
        if self.flip_y {
            anchor.y = 1.0 - anchor.y;
        }

        Ok(Placement {
            pivot: glm::vec2(self.position.x.round(), self.position.y.round()),
            size: glm::vec2(self.scale * frame.w as f32, self.scale * frame.h as f32),
            anchor,
            flip_x: self.flip_x,
            flip_y: self.flip_y,
        })
    }
}

/// A resolved draw: the pixel-snapped pivot, the drawn size, and the anchor
/// after flipping.
///
/// A flipped axis is mirrored about the pivot, with its anchor ratio
/// reflected (`1 - ratio`) so the same point of the sprite stays on the
/// pivot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub pivot: glm::Vec2,
    pub size: glm::Vec2,
    pub anchor: glm::Vec2,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Placement {
    /// Top-left corner of the covered rectangle in surface coordinates.
    pub fn dest_origin(&self) -> glm::Vec2 {
        let x = if self.flip_x {
            self.pivot.x - (1.0 - self.anchor.x) * self.size.x
        } else {
            self.pivot.x - self.anchor.x * self.size.x
        };
        let y = if self.flip_y {
            self.pivot.y - (1.0 - self.anchor.y) * self.size.y
        } else {
            self.pivot.y - self.anchor.y * self.size.y
        };
        glm::vec2(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Rect = Rect {
        x: 0,
        y: 0,
        w: 16,
        h: 8,
    };

    #[test]
    fn scale_and_anchor_locate_the_rectangle() {
        let p = Transform::at(100.0, 50.0)
            .with_scale(2.0)
            .with_anchor(0.5, 1.0)
            .place(&FRAME)
            .unwrap();
        assert_eq!(p.size, glm::vec2(32.0, 16.0));
        assert_eq!(p.dest_origin(), glm::vec2(84.0, 34.0));
    }

    #[test]
    fn position_snaps_to_whole_pixels() {
        let p = Transform::at(10.4, 20.6).place(&FRAME).unwrap();
        assert_eq!(p.pivot, glm::vec2(10.0, 21.0));
    }

    #[test]
    fn horizontal_flip_reflects_only_that_anchor() {
        let p = Transform::at(0.0, 0.0)
            .with_anchor(0.25, 0.4)
            .flipped(true, false)
            .place(&FRAME)
            .unwrap();
        assert_eq!(p.anchor.x, 0.75);
        assert_eq!(p.anchor.y, 0.4);
    }

    #[test]
    fn flip_keeps_the_same_covered_rectangle() {
        let base = Transform::at(40.0, 40.0).with_scale(3.0).with_anchor(0.25, 0.75);
        let plain = base.place(&FRAME).unwrap().dest_origin();
        let both = base.flipped(true, true).place(&FRAME).unwrap().dest_origin();
        assert_eq!(plain, both);
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        for scale in [0.0, -1.0, f32::NAN] {
            let err = Transform::default().with_scale(scale).place(&FRAME).unwrap_err();
            assert_eq!(err.key, "invalid-transform");
        }
    }
}
