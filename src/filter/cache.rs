use log::debug;

use super::EffectChain;
use crate::error::SheetError;
use crate::loader::SheetLoader;
use crate::registry::{ImageEntry, Provenance};

/// Registry key of `source` filtered through `effect`.
///
/// Built from the canonical effect text, so equivalent descriptors share
/// one entry.
pub fn filtered_name(source: &str, effect: &EffectChain) -> String {
    format!("{source}:filter={effect}")
}

impl SheetLoader {
    /// Make sure a filtered copy of `source` exists and return its name.
    ///
    /// A name already registered is returned as is. Otherwise the source
    /// must be registered and have its pixels; the copy is registered at
    /// once with the source's metadata (when present) and its pixels are
    /// rasterized in the background. Check readiness before drawing it.
    pub fn apply_filter(
        &mut self,
        source: &str,
        effect: &EffectChain,
    ) -> Result<String, SheetError> {
        let name = filtered_name(source, effect);
        if self.registry.has(&name) {
            return Ok(name);
        }

        let base = self
            .registry
            .get(source)
            .ok_or_else(|| SheetError::new("unknown-image").with_arg("name", source))?;
        let pixels = base
            .pixels()
            .cloned()
            .ok_or_else(|| SheetError::new("pixels-not-loaded").with_arg("name", source))?;
        let sheet = base.sheet().cloned();

        let ticket = self.issue_ticket();
        let mut entry = ImageEntry::new(
            name.clone(),
            Provenance::Filtered {
                source: source.to_string(),
                effect: effect.clone(),
            },
        )
        .with_ticket(ticket);
        if let Some(sheet) = sheet {
            entry.set_sheet(sheet);
        }
        self.registry.put(entry);

        debug!("Rasterizing {}", name);
        self.stats.rasterizations += 1;
        let chain = effect.clone();
        self.spawn_pixel_task(name.clone(), ticket, async move {
            tokio::task::spawn_blocking(move || chain.apply(&pixels))
                .await
                .map_err(|e| SheetError::new("rasterize").push_std(e))
        });

        Ok(name)
    }

    /// [`apply_filter`](Self::apply_filter) with a CSS filter string.
    pub fn apply_filter_str(
        &mut self,
        source: &str,
        descriptor: &str,
    ) -> Result<String, SheetError> {
        let effect: EffectChain = descriptor.parse()?;
        self.apply_filter(source, &effect)
    }
}
