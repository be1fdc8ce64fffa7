use std::future::Future;
use std::sync::Arc;

use image::RgbaImage;
use log::{debug, error, info};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::error::SheetError;
use crate::registry::{ImageEntry, Provenance, Registry};
use crate::sheet::SpriteSheet;

/// Completion message sent by a background task.
pub(crate) enum LoadResult {
    Pixels {
        name: String,
        ticket: u64,
        result: Result<RgbaImage, SheetError>,
    },
    Metadata {
        name: String,
        ticket: u64,
        result: Result<SpriteSheet, SheetError>,
    },
}

/// Counts of background work started, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderStats {
    pub pixel_fetches: usize,
    pub metadata_fetches: usize,
    pub rasterizations: usize,
}

/// Owns the [`Registry`] and drives every load that fills it.
///
/// Fetches and rasterizations run as tasks on the tokio runtime, but they
/// never touch the registry. They report back through a channel and the
/// owner applies the results with [`pump`](Self::pump) or
/// [`settle`](Self::settle), so the registry has a single mutator.
pub struct SheetLoader {
    pub(crate) registry: Registry,
    pub(crate) stats: LoaderStats,
    runtime: Handle,
    sender: UnboundedSender<LoadResult>,
    receiver: UnboundedReceiver<LoadResult>,
    pending: usize,
    next_ticket: u64,
}

impl SheetLoader {
    pub fn new(runtime: Handle) -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            registry: Registry::new(),
            stats: LoaderStats::default(),
            runtime,
            sender,
            receiver,
            pending: 0,
            next_ticket: 0,
        }
    }

    /// Build a loader on the runtime the caller is running in.
    pub fn current() -> Result<Self, SheetError> {
        let runtime = Handle::try_current()
            .map_err(|e| SheetError::new("runtime-unavailable").push_std(e))?;
        Ok(Self::new(runtime))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn get(&self, name: &str) -> Option<&ImageEntry> {
        self.registry.get(name)
    }

    pub fn is_ready(&self, name: &str) -> bool {
        self.registry.get(name).is_some_and(ImageEntry::is_ready)
    }

    /// Background tasks whose result has not been applied yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn stats(&self) -> LoaderStats {
        self.stats
    }

    /// Drop every entry. Results still in flight are discarded on arrival,
    /// even if the name has been loaded again since.
    pub fn reset(&mut self) {
        self.registry.clear();
    }

    /// A fresh ticket for a new entry. Completions carry the ticket of the
    /// entry they were started for.
    pub(crate) fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    /// Apply every completion that has already arrived, without waiting.
    ///
    /// Returns the load failures among them.
    pub fn pump(&mut self) -> Vec<SheetError> {
        let mut failures = Vec::new();
        while let Ok(result) = self.receiver.try_recv() {
            if let Some(err) = self.apply(result) {
                failures.push(err);
            }
        }
        failures
    }

    /// Wait until every started task has reported back and apply the results.
    pub async fn settle(&mut self) -> Vec<SheetError> {
        let mut failures = self.pump();
        while self.pending > 0 {
            let Some(result) = self.receiver.recv().await else {
                break;
            };
            if let Some(err) = self.apply(result) {
                failures.push(err);
            }
        }
        failures
    }

    pub(crate) fn spawn_pixel_task<F>(&mut self, name: String, ticket: u64, task: F)
    where
        F: Future<Output = Result<RgbaImage, SheetError>> + Send + 'static,
    {
        let sender = self.sender.clone();
        self.pending += 1;
        self.runtime.spawn(async move {
            let result = task.await;
            let _ = sender.send(LoadResult::Pixels {
                name,
                ticket,
                result,
            });
        });
    }

    pub(crate) fn spawn_metadata_task<F>(&mut self, name: String, ticket: u64, task: F)
    where
        F: Future<Output = Result<SpriteSheet, SheetError>> + Send + 'static,
    {
        let sender = self.sender.clone();
        self.pending += 1;
        self.runtime.spawn(async move {
            let result = task.await;
            let _ = sender.send(LoadResult::Metadata {
                name,
                ticket,
                result,
            });
        });
    }

    fn apply(&mut self, result: LoadResult) -> Option<SheetError> {
        self.pending = self.pending.saturating_sub(1);

        match result {
            LoadResult::Pixels {
                name,
                ticket,
                result,
            } => {
                let entry = self.current_entry(&name, ticket)?;
                match result {
                    Ok(pixels) => {
                        let (w, h) = pixels.dimensions();
                        entry.set_pixels(Arc::new(pixels));
                        debug!("Pixels loaded for {} ({}x{})", name, w, h);
                        if entry.is_ready() {
                            info!("Image {} ready", name);
                        }
                        None
                    }
                    Err(cause) => {
                        let err = SheetError::new("pixel-load")
                            .with_arg("name", &name)
                            .push_sheet(cause);
                        error!("Error loading image {}: {}", name, err);
                        entry.record_failure(err.clone());
                        Some(err)
                    }
                }
            }
            LoadResult::Metadata {
                name,
                ticket,
                result,
            } => {
                let entry = self.current_entry(&name, ticket)?;
                match result {
                    Ok(sheet) => {
                        let sheet = Arc::new(sheet);
                        debug!(
                            "Metadata loaded for {} ({} frames, {} animations)",
                            name,
                            sheet.frames.len(),
                            sheet.animations.len()
                        );
                        entry.set_sheet(sheet.clone());
                        if entry.is_ready() {
                            info!("Image {} ready", name);
                        }
                        self.share_sheet_with_filtered(&name, sheet);
                        None
                    }
                    Err(cause) => {
                        let err = SheetError::new("metadata-load")
                            .with_arg("name", &name)
                            .push_sheet(cause);
                        error!("Error loading image {}: {}", name, err);
                        entry.record_failure(err.clone());
                        Some(err)
                    }
                }
            }
        }
    }

    /// The entry a completion belongs to, unless it was forgotten or
    /// replaced after the work started.
    fn current_entry(&mut self, name: &str, ticket: u64) -> Option<&mut ImageEntry> {
        match self.registry.get_mut(name) {
            Some(entry) if entry.ticket() == ticket => Some(entry),
            _ => {
                debug!("Dropping stale result for image {}", name);
                None
            }
        }
    }

    /// Filtered images started before their source's metadata arrived get
    /// the same sheet once it does, transitively.
    fn share_sheet_with_filtered(&mut self, root: &str, sheet: Arc<SpriteSheet>) {
        let mut sources = vec![root.to_string()];
        while let Some(current) = sources.pop() {
            for entry in self.registry.entries_mut() {
                let derived_from_current = matches!(
                    entry.provenance(),
                    Provenance::Filtered { source, .. } if *source == current
                );
                if derived_from_current && entry.set_sheet(sheet.clone()) {
                    debug!("Metadata shared with filtered image {}", entry.name());
                    sources.push(entry.name().to_string());
                }
            }
        }
    }
}
