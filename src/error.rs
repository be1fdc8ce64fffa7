use std::{collections::BTreeMap, fmt, io, sync::Arc};

/// Where an error sits in the loader's failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad request shape, detected before any I/O.
    Configuration,
    /// Asynchronous fetch/decode/parse failure of one sub-resource.
    LoadFailure,
    /// Caller broke a contract (unknown name, not ready, bad index).
    Precondition,
    /// Data that passed validation turned out inconsistent.
    Internal,
}

#[derive(Debug, Clone)]
pub struct SheetError {
    pub key: &'static str,
    pub args: BTreeMap<&'static str, String>,
    pub causes: Vec<SheetCause>,
}

#[derive(Debug, Clone)]
pub enum SheetCause {
    Sheet(Box<SheetError>),
    Std(Arc<dyn std::error::Error + Send + Sync>),
}

impl SheetError {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            args: BTreeMap::new(),
            causes: Vec::new(),
        }
    }

    pub fn with_arg(mut self, k: &'static str, v: impl ToString) -> Self {
        self.args.insert(k, v.to_string());
        self
    }

    pub fn push_sheet(mut self, cause: SheetError) -> Self {
        self.causes.push(SheetCause::Sheet(Box::new(cause)));
        self
    }

    pub fn push_std(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.causes.push(SheetCause::Std(Arc::new(cause)));
        self
    }

    pub fn arg(&self, k: &str) -> Option<&str> {
        self.args.get(k).map(String::as_str)
    }

    pub fn kind(&self) -> ErrorKind {
        match self.key {
            "missing-source" | "invalid-effect" | "runtime-unavailable" => {
                ErrorKind::Configuration
            }
            "unknown-image" | "unknown-animation" | "not-ready" | "frame-out-of-range"
            | "pixels-not-loaded" | "invalid-time" | "invalid-transform" => ErrorKind::Precondition,
            "frame-walk-exhausted" => ErrorKind::Internal,
            _ => ErrorKind::LoadFailure,
        }
    }
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.key)?;
        let mut first = true;
        for (k, v) in &self.args {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        write!(f, ")")?;
        for cause in &self.causes {
            match cause {
                SheetCause::Sheet(e) => write!(f, ": {e}")?,
                SheetCause::Std(e) => write!(f, ": {e}")?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for SheetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes.iter().find_map(|c| match c {
            SheetCause::Sheet(e) => Some(e.as_ref() as &dyn std::error::Error),
            SheetCause::Std(e) => Some(e.as_ref() as &(dyn std::error::Error + 'static)),
        })
    }
}

impl From<io::Error> for SheetError {
    fn from(err: io::Error) -> Self {
        SheetError::new("io-error").push_std(err)
    }
}

impl From<reqwest::Error> for SheetError {
    fn from(err: reqwest::Error) -> Self {
        SheetError::new("reqwest::Error").push_std(err)
    }
}

impl From<image::ImageError> for SheetError {
    fn from(err: image::ImageError) -> Self {
        SheetError::new("image-decode").push_std(err)
    }
}

impl From<serde_json::Error> for SheetError {
    fn from(err: serde_json::Error) -> Self {
        SheetError::new("metadata-parse").push_std(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_args_in_order_then_causes() {
        let err = SheetError::new("unknown-animation")
            .with_arg("name", "hero")
            .with_arg("animation", "run");
        assert_eq!(err.to_string(), "unknown-animation(animation=run, name=hero)");

        let wrapped = SheetError::new("pixel-load")
            .with_arg("name", "hero")
            .push_sheet(SheetError::new("http-status").with_arg("status", 404));
        assert_eq!(
            wrapped.to_string(),
            "pixel-load(name=hero): http-status(status=404)"
        );
    }

    #[test]
    fn keys_map_onto_taxonomy() {
        assert_eq!(SheetError::new("missing-source").kind(), ErrorKind::Configuration);
        assert_eq!(SheetError::new("not-ready").kind(), ErrorKind::Precondition);
        assert_eq!(SheetError::new("frame-walk-exhausted").kind(), ErrorKind::Internal);
        assert_eq!(SheetError::new("metadata-load").kind(), ErrorKind::LoadFailure);
    }

    #[test]
    fn source_exposes_first_cause() {
        use std::error::Error;
        let io = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: SheetError = io.into();
        assert_eq!(err.key, "io-error");
        assert!(err.source().is_some());
    }
}
