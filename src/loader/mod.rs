pub mod fetch;
pub mod sheet_loader;
pub mod source;
pub mod start_load;

pub use fetch::{decode_image, fetch_bytes, load_metadata, load_pixels};
pub use sheet_loader::{LoaderStats, SheetLoader};
pub use source::{Location, SheetRequest, SheetSource};
pub use start_load::LoadOutcome;
