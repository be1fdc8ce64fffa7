use std::collections::HashMap;
use std::sync::Arc;

use image::RgbaImage;

use crate::error::SheetError;
use crate::filter::EffectChain;
use crate::loader::Location;
use crate::sheet::SpriteSheet;

#[derive(Debug, Clone, PartialEq)]
pub enum EntryStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Where an entry's pixels come from.
#[derive(Debug, Clone)]
pub enum Provenance {
    Fetched { image: Location, metadata: Location },
    Filtered { source: String, effect: EffectChain },
}

/// One named image: its pixels, its metadata and how far loading got.
///
/// Raw and filtered images share this shape; only [`Provenance`] differs.
#[derive(Debug, Clone)]
pub struct ImageEntry {
    name: String,
    provenance: Provenance,
    ticket: u64,
    pixels: Option<Arc<RgbaImage>>,
    sheet: Option<Arc<SpriteSheet>>,
    failure: Option<SheetError>,
}

impl ImageEntry {
    pub fn new(name: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            name: name.into(),
            provenance,
            ticket: 0,
            pixels: None,
            sheet: None,
            failure: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Identifies the load that created this entry.
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub(crate) fn with_ticket(mut self, ticket: u64) -> Self {
        self.ticket = ticket;
        self
    }

    pub fn pixel_ready(&self) -> bool {
        self.pixels.is_some()
    }

    pub fn metadata_ready(&self) -> bool {
        self.sheet.is_some()
    }

    /// Both sub-resources have arrived.
    pub fn is_ready(&self) -> bool {
        self.pixel_ready() && self.metadata_ready()
    }

    pub fn pixels(&self) -> Option<&Arc<RgbaImage>> {
        self.pixels.as_ref()
    }

    pub fn sheet(&self) -> Option<&Arc<SpriteSheet>> {
        self.sheet.as_ref()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.pixels.as_ref().map(|p| p.dimensions())
    }

    pub fn failure(&self) -> Option<&SheetError> {
        self.failure.as_ref()
    }

    pub fn status(&self) -> EntryStatus {
        if let Some(err) = &self.failure {
            EntryStatus::Failed(err.to_string())
        } else if self.is_ready() {
            EntryStatus::Ready
        } else {
            EntryStatus::Loading
        }
    }

    pub fn status_text(&self) -> String {
        match self.status() {
            EntryStatus::Loading => format!(
                "Loading (pixels: {}, metadata: {})",
                if self.pixel_ready() { "done" } else { "pending" },
                if self.metadata_ready() { "done" } else { "pending" },
            ),
            EntryStatus::Ready => match self.dimensions() {
                Some((w, h)) => format!("Ready ({}x{})", w, h),
                None => "Ready".to_string(),
            },
            EntryStatus::Failed(err) => format!("Failed: {}", err),
        }
    }

    // Each setter only fills an empty slot; a ready flag is never cleared.

    pub(crate) fn set_pixels(&mut self, pixels: Arc<RgbaImage>) -> bool {
        if self.pixels.is_some() {
            return false;
        }
        self.pixels = Some(pixels);
        true
    }

    pub(crate) fn set_sheet(&mut self, sheet: Arc<SpriteSheet>) -> bool {
        if self.sheet.is_some() {
            return false;
        }
        self.sheet = Some(sheet);
        true
    }

    pub(crate) fn record_failure(&mut self, err: SheetError) {
        if self.failure.is_none() {
            self.failure = Some(err);
        }
    }
}

/// Name -> entry map; the single source of truth for what was requested.
///
/// Not synchronised: exactly one owner mutates it (see
/// [`SheetLoader`](crate::loader::SheetLoader)).
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<String, ImageEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ImageEntry> {
        self.entries.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut ImageEntry> {
        self.entries.get_mut(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Register an entry under its own name. An existing entry wins.
    pub fn put(&mut self, entry: ImageEntry) -> bool {
        if self.has(entry.name()) {
            return false;
        }
        self.entries.insert(entry.name().to_string(), entry);
        true
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ready_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_ready()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.values().filter(|e| e.failure.is_some()).count()
    }

    /// Forget every entry. Completions still in flight for a cleared name
    /// are dropped when they arrive.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut ImageEntry> {
        self.entries.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Location;
    use std::path::PathBuf;

    fn fetched(name: &str) -> ImageEntry {
        ImageEntry::new(
            name,
            Provenance::Fetched {
                image: Location::File(PathBuf::from(format!("{name}.png"))),
                metadata: Location::File(PathBuf::from(format!("{name}.json"))),
            },
        )
    }

    #[test]
    fn ready_requires_both_halves_in_either_order() {
        let mut a = fetched("a");
        assert_eq!(a.status(), EntryStatus::Loading);
        assert!(a.set_sheet(Arc::new(SpriteSheet::default())));
        assert!(!a.is_ready());
        assert!(a.set_pixels(Arc::new(RgbaImage::new(2, 2))));
        assert!(a.is_ready());

        let mut b = fetched("b");
        b.set_pixels(Arc::new(RgbaImage::new(2, 2)));
        assert!(!b.is_ready());
        b.set_sheet(Arc::new(SpriteSheet::default()));
        assert_eq!(b.status(), EntryStatus::Ready);
        assert_eq!(b.dimensions(), Some((2, 2)));
    }

    #[test]
    fn slots_fill_once() {
        let mut e = fetched("hero");
        let first = Arc::new(RgbaImage::new(4, 4));
        assert!(e.set_pixels(first.clone()));
        assert!(!e.set_pixels(Arc::new(RgbaImage::new(8, 8))));
        assert!(Arc::ptr_eq(e.pixels().unwrap(), &first));
    }

    #[test]
    fn failure_shows_in_status_but_not_ready() {
        let mut e = fetched("broken");
        e.record_failure(SheetError::new("pixel-load").with_arg("name", "broken"));
        assert!(!e.is_ready());
        assert!(matches!(e.status(), EntryStatus::Failed(_)));
        assert!(e.status_text().starts_with("Failed"));
    }

    #[test]
    fn put_keeps_first_entry() {
        let mut reg = Registry::new();
        assert!(reg.put(fetched("hero")));
        assert!(!reg.put(fetched("hero")));
        assert!(reg.put(fetched("bat")));
        assert_eq!(reg.names(), vec!["bat", "hero"]);
        assert!(reg.has("hero"));
        reg.clear();
        assert!(reg.is_empty());
    }
}
