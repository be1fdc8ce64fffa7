//! Derived images: a loaded image run through an [`EffectChain`] and
//! registered under its own name.

mod cache;
mod effect;

pub use cache::filtered_name;
pub use effect::{Effect, EffectChain};
