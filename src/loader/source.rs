use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::SheetError;

/// Where one resource's bytes come from.
#[derive(Clone)]
pub enum Location {
    File(PathBuf),
    Url(String),
    /// Already in memory (embedded assets, tests).
    Bytes(Arc<[u8]>),
}

impl Location {
    /// `http://` and `https://` strings become URLs, anything else a path.
    pub fn parse(value: &str) -> Self {
        if is_url(value) {
            Self::Url(value.to_string())
        } else {
            Self::File(PathBuf::from(value))
        }
    }

    pub fn bytes(data: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes(data.into())
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<PathBuf> for Location {
    fn from(value: PathBuf) -> Self {
        Self::File(value)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
            Self::Bytes(data) => write!(f, "<{} bytes>", data.len()),
        }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Url(url) => f.debug_tuple("Url").field(url).finish(),
            Self::Bytes(data) => f.debug_tuple("Bytes").field(&data.len()).finish(),
        }
    }
}

fn is_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// The two resources behind one sprite sheet.
#[derive(Debug, Clone)]
pub struct SheetSource {
    pub image: Location,
    pub metadata: Location,
}

/// A load request as a caller describes it.
///
/// Either `base` (a directory or URL prefix holding `{name}.png` and
/// `{name}.json`) or both explicit locations must be given. Explicit
/// locations win when everything is set.
#[derive(Debug, Clone, Default)]
pub struct SheetRequest {
    pub name: String,
    pub base: Option<String>,
    pub image: Option<Location>,
    pub metadata: Option<Location>,
}

impl SheetRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_base(name: impl Into<String>, base: impl Into<String>) -> Self {
        Self::new(name).with_base(base)
    }

    pub fn from_locations(
        name: impl Into<String>,
        image: impl Into<Location>,
        metadata: impl Into<Location>,
    ) -> Self {
        Self::new(name).with_image(image).with_metadata(metadata)
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<Location>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_metadata(mut self, metadata: impl Into<Location>) -> Self {
        self.metadata = Some(metadata.into());
        self
    }

    /// Turn the request into concrete locations without doing any I/O.
    pub fn resolve(&self) -> Result<SheetSource, SheetError> {
        if let (Some(image), Some(metadata)) = (&self.image, &self.metadata) {
            return Ok(SheetSource {
                image: image.clone(),
                metadata: metadata.clone(),
            });
        }

        let base = match self.base.as_deref() {
            Some(base) if !base.is_empty() => base,
            _ => {
                return Err(SheetError::new("missing-source")
                    .with_arg("name", &self.name)
                    .with_arg("hint", "need a base or both image and metadata locations"));
            }
        };

        let image_file = format!("{}.png", self.name);
        let json_file = format!("{}.json", self.name);

        if is_url(base) {
            let prefix = if base.ends_with('/') {
                base.to_string()
            } else {
                format!("{base}/")
            };
            Ok(SheetSource {
                image: Location::Url(format!("{prefix}{image_file}")),
                metadata: Location::Url(format!("{prefix}{json_file}")),
            })
        } else {
            let dir = PathBuf::from(base);
            Ok(SheetSource {
                image: Location::File(dir.join(image_file)),
                metadata: Location::File(dir.join(json_file)),
            })
        }
    }
}
