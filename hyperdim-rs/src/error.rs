//! Engine error kinds.
//!
//! Every failure is terminal for the operation in progress and propagates to
//! the caller; nothing is retried internally. Parameter validation always
//! happens before any accumulator mutation or file write.

use std::fmt;
use std::io;

/// Errors from model construction, training, dataset decoding, and persistence.
#[derive(Debug)]
pub enum ModelError {
    /// Caller-supplied parameter out of range (sample count, quantization,
    /// dimensions, thread count).
    InvalidArgument(String),
    /// Underlying I/O failure on a dataset or model source.
    Io(io::Error),
    /// Malformed bytes: tag mismatch, truncation, or a header that
    /// contradicts the body.
    Format(String),
    /// Model and dataset disagree on feature size or label range.
    Consistency(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidArgument(e) => write!(f, "invalid argument: {e}"),
            ModelError::Io(e) => write!(f, "i/o error: {e}"),
            ModelError::Format(e) => write!(f, "format error: {e}"),
            ModelError::Consistency(e) => write!(f, "consistency error: {e}"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ModelError {
    fn from(e: io::Error) -> Self {
        ModelError::Io(e)
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let e = ModelError::InvalidArgument("n_threads must be > 0".into());
        assert!(e.to_string().contains("invalid argument"));
        let e = ModelError::Format("bad tag".into());
        assert!(e.to_string().contains("format error"));
    }

    #[test]
    fn test_io_error_converts() {
        fn fails() -> Result<()> {
            Err(io::Error::new(io::ErrorKind::NotFound, "missing"))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(ModelError::Io(_))));
    }
}
