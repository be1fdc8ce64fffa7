use log::{debug, warn};

use super::fetch::{load_metadata, load_pixels};
use super::{SheetLoader, SheetRequest};
use crate::error::SheetError;
use crate::registry::{ImageEntry, Provenance};

/// What a call to [`SheetLoader::load`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Entry registered and both fetches started.
    Issued,
    /// The name was already known; nothing changed.
    AlreadyRegistered,
}

impl SheetLoader {
    /// Register `request.name` and start fetching its image and metadata.
    ///
    /// A name that is already registered is left untouched, whatever the
    /// request says. Otherwise the request must resolve to both locations
    /// before anything is registered.
    pub fn load(&mut self, request: &SheetRequest) -> Result<LoadOutcome, SheetError> {
        if self.registry.has(&request.name) {
            warn!("Already loaded image {}", request.name);
            return Ok(LoadOutcome::AlreadyRegistered);
        }

        let source = request.resolve()?;
        let name = request.name.clone();
        let ticket = self.issue_ticket();

        self.registry.put(
            ImageEntry::new(
                name.clone(),
                Provenance::Fetched {
                    image: source.image.clone(),
                    metadata: source.metadata.clone(),
                },
            )
            .with_ticket(ticket),
        );

        debug!(
            "Loading image {} (pixels: {}, metadata: {})",
            name, source.image, source.metadata
        );

        let image = source.image;
        self.stats.pixel_fetches += 1;
        self.spawn_pixel_task(name.clone(), ticket, async move { load_pixels(&image).await });

        let metadata = source.metadata;
        self.stats.metadata_fetches += 1;
        self.spawn_metadata_task(name, ticket, async move { load_metadata(&metadata).await });

        Ok(LoadOutcome::Issued)
    }

    /// Issue [`load`](Self::load) for each request in turn without waiting
    /// for any of them. One bad request does not stop the others.
    pub fn load_many<'a, I>(&mut self, requests: I) -> Vec<Result<LoadOutcome, SheetError>>
    where
        I: IntoIterator<Item = &'a SheetRequest>,
    {
        requests.into_iter().map(|r| self.load(r)).collect()
    }
}
