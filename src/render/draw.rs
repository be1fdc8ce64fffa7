use super::{Surface, Transform};
use crate::error::SheetError;
use crate::registry::ImageEntry;
use crate::resolver::resolve_frame;

/// Whether a draw call put anything on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn,
    /// The image (or its filtered copy) is still loading.
    NotReady,
}

/// Draw one frame of a loaded entry.
///
/// An entry that is not ready yet is skipped with [`DrawOutcome::NotReady`]
/// and no surface call. A frame index outside the sheet is an error.
pub fn draw_frame<S: Surface + ?Sized>(
    surface: &mut S,
    entry: &ImageEntry,
    frame: usize,
    transform: &Transform,
) -> Result<DrawOutcome, SheetError> {
    let (Some(pixels), Some(sheet)) = (entry.pixels(), entry.sheet()) else {
        return Ok(DrawOutcome::NotReady);
    };

    let rect = sheet
        .frame(frame)
        .ok_or_else(|| {
            SheetError::new("frame-out-of-range")
                .with_arg("name", entry.name())
                .with_arg("frame", frame)
                .with_arg("frames", sheet.frames.len())
        })?
        .rect;

    let placement = transform.place(&rect)?;
    surface.blit(pixels, rect, &placement);
    Ok(DrawOutcome::Drawn)
}

/// Draw the frame of `animation` that is showing `elapsed_secs` in.
pub fn draw_animation<S: Surface + ?Sized>(
    surface: &mut S,
    entry: &ImageEntry,
    animation: &str,
    elapsed_secs: f64,
    transform: &Transform,
) -> Result<DrawOutcome, SheetError> {
    if !entry.is_ready() {
        return Ok(DrawOutcome::NotReady);
    }
    let frame = resolve_frame(entry, animation, elapsed_secs)?;
    draw_frame(surface, entry, frame, transform)
}
