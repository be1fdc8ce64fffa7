pub mod canvas;
pub mod draw;
pub mod sprite;
pub mod surface;
pub mod transform;

pub use canvas::Canvas;
pub use draw::{DrawOutcome, draw_animation, draw_frame};
pub use sprite::{Pose, Sprite};
pub use surface::Surface;
pub use transform::{Placement, Transform};
