//! Error values surfaced by the engine.
//!
//! Failures are plain values, never control flow: recoverable conditions
//! return `Err` and leave state untouched, the two fatal invariant
//! violations surface as [`ErrorKind::Invariant`] after which the engine is
//! undefined and must be discarded.

use core::fmt;

/// What went wrong, independent of the diagnostic text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input vector length differs from the input layer width
    ShapeMismatch,
    /// Two organisms with different network templates were combined
    KindMismatch,
    /// Stream open/read/write or decode failure
    Persistence,
    /// Engine state no longer satisfies a structural invariant
    Invariant,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    detail: String,
}

impl Error {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn shape_mismatch(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::ShapeMismatch, detail)
    }

    pub fn kind_mismatch(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::KindMismatch, detail)
    }

    pub fn persistence(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Persistence, detail)
    }

    pub fn invariant(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::Invariant, detail)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::ShapeMismatch => write!(f, "shape mismatch: {}", self.detail),
            ErrorKind::KindMismatch => write!(f, "kind mismatch: {}", self.detail),
            ErrorKind::Persistence => write!(f, "persistence: {}", self.detail),
            ErrorKind::Invariant => write!(f, "invariant violated: {}", self.detail),
        }
    }
}

impl core::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::persistence(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::persistence(e.to_string())
    }
}

pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_kind_survives_construction() {
        let e = Error::shape_mismatch("got 3 inputs for 2 neurons");
        assert_eq!(e.kind(), ErrorKind::ShapeMismatch);
        assert!(e.to_string().contains("got 3 inputs"));
    }

    #[test]
    fn test_io_errors_map_to_persistence() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "nope");
        let e: Error = io.into();
        assert_eq!(e.kind(), ErrorKind::Persistence);
    }
}
