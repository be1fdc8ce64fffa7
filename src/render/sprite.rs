use super::{DrawOutcome, Surface, Transform, draw_frame};
use crate::error::SheetError;
use crate::filter::EffectChain;
use crate::loader::SheetLoader;
use crate::resolver::resolve_frame;

/// Which frame of the sheet to show.
#[derive(Debug, Clone, PartialEq)]
pub enum Pose {
    Frame(usize),
    Animation { name: String, elapsed: f64 },
}

/// A draw request that names its image instead of holding it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pub image: String,
    pub pose: Pose,
    pub transform: Transform,
    pub effect: Option<EffectChain>,
}

impl Sprite {
    pub fn frame(image: impl Into<String>, frame: usize) -> Self {
        Self {
            image: image.into(),
            pose: Pose::Frame(frame),
            transform: Transform::default(),
            effect: None,
        }
    }

    pub fn animation(image: impl Into<String>, animation: impl Into<String>, elapsed: f64) -> Self {
        Self {
            image: image.into(),
            pose: Pose::Animation {
                name: animation.into(),
                elapsed,
            },
            transform: Transform::default(),
            effect: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_effect(mut self, effect: EffectChain) -> Self {
        self.effect = Some(effect);
        self
    }
}

impl SheetLoader {
    /// Draw a sprite by name.
    ///
    /// Completions that have already arrived are applied first, so a render
    /// loop that only calls `draw` still sees images become ready. Failures
    /// among them are logged and recorded on their entries; use
    /// [`pump`](SheetLoader::pump) to collect them.
    ///
    /// With an effect, the filtered copy is created on first use and drawn
    /// instead of the source once it is ready; until then this reports
    /// [`DrawOutcome::NotReady`]. An unregistered image name is an error.
    pub fn draw<S: Surface + ?Sized>(
        &mut self,
        surface: &mut S,
        sprite: &Sprite,
    ) -> Result<DrawOutcome, SheetError> {
        self.pump();

        let entry = self
            .registry
            .get(&sprite.image)
            .ok_or_else(|| SheetError::new("unknown-image").with_arg("name", &sprite.image))?;
        if !entry.is_ready() {
            return Ok(DrawOutcome::NotReady);
        }

        let frame = match &sprite.pose {
            Pose::Frame(frame) => *frame,
            Pose::Animation { name, elapsed } => resolve_frame(entry, name, *elapsed)?,
        };

        let target = match sprite.effect.as_ref().filter(|e| !e.is_empty()) {
            Some(effect) => self.apply_filter(&sprite.image, effect)?,
            None => sprite.image.clone(),
        };

        match self.registry.get(&target) {
            Some(entry) => draw_frame(surface, entry, frame, &sprite.transform),
            None => Ok(DrawOutcome::NotReady),
        }
    }
}
