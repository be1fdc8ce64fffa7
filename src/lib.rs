//! Load Aseprite sprite sheets (PNG + JSON export) and draw their frames
//! and looping animations onto a 2D surface.
//!
//! [`SheetLoader`] owns the [`Registry`] of named images. Each load fetches
//! the pixels and the metadata concurrently; an entry is ready once both
//! have arrived. Filtered copies of loaded images are cached in the same
//! registry under a derived name.

pub mod error;
pub mod filter;
pub mod loader;
pub mod registry;
pub mod render;
pub mod resolver;
pub mod settings;
pub mod sheet;

pub const CONFY_APP_NAME: &str = "aseprite-sheets";

pub use error::{ErrorKind, SheetError};
pub use filter::{Effect, EffectChain, filtered_name};
pub use loader::{LoadOutcome, LoaderStats, Location, SheetLoader, SheetRequest};
pub use registry::{EntryStatus, ImageEntry, Provenance, Registry};
pub use render::{Canvas, DrawOutcome, Pose, Sprite, Surface, Transform};
pub use resolver::{frame_at, resolve_frame};
pub use sheet::{Animation, Frame, Rect, SpriteSheet};
