use image::RgbaImage;

use super::Placement;
use crate::sheet::Rect;

/// A 2D target that sprites are drawn onto.
pub trait Surface {
    /// Switch off interpolation when scaling, for crisp pixel art.
    /// Called once per surface, not per draw.
    fn disable_smoothing(&mut self);

    /// Copy `src` out of `image` into the rectangle described by `placement`.
    fn blit(&mut self, image: &RgbaImage, src: Rect, placement: &Placement);
}
