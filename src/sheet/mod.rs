//! Sprite sheet metadata: frames cut from the sheet and the tagged
//! animations that play them.

mod animation;
mod document;
mod frame;

pub use animation::{Animation, Direction};
pub use document::SpriteSheet;
pub use frame::{Frame, Rect};
