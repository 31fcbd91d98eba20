use thiserror::Error;

/// Primary error type for coppice operations.
///
/// Structured variants for the conditions callers are expected to match on,
/// free-text payloads for the ones they are not. Lookup paths that can
/// answer "absent" with a sentinel (`find`, `get`, `contains_key`) never
/// construct an error; only the checked accessors and the mutation engines
/// do.
#[derive(Error, Debug)]
pub enum CoppiceError {
    // === Tree Errors ===
    /// A checked access (`at`, `erase`, `remove`) named a key that is not
    /// in the tree.
    #[error("no entry found for key")]
    KeyNotFound,

    /// A node store with a capacity limit could not allocate another node.
    #[error("node store capacity exhausted ({capacity} slots)")]
    CapacityExhausted { capacity: usize },

    // === Arena Errors ===
    /// The arena free list is inconsistent with the slot table.
    #[error("arena free list is corrupt: {detail}")]
    ArenaCorrupt { detail: String },

    // === Logging Errors ===
    /// A logger configuration could not be parsed or applied.
    #[error("invalid logger configuration: {detail}")]
    LogConfig { detail: String },

    /// File I/O error (sink creation; tree operations never perform I/O).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Internal Errors ===
    /// Internal logic error (should never happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Coarse classification of [`CoppiceError`] variants.
///
/// Stable across payload changes, for callers that only branch on the
/// category of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The named key is not present.
    NotFound,
    /// A resource limit was hit.
    Resource,
    /// An internal data structure failed validation.
    Corrupt,
    /// Configuration input was rejected.
    Config,
    /// An underlying I/O operation failed.
    Io,
    /// A bug in this library.
    Internal,
}

impl CoppiceError {
    /// Map this error to its coarse [`ErrorKind`].
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::KeyNotFound => ErrorKind::NotFound,
            Self::CapacityExhausted { .. } => ErrorKind::Resource,
            Self::ArenaCorrupt { .. } => ErrorKind::Corrupt,
            Self::LogConfig { .. } => ErrorKind::Config,
            Self::Io(_) => ErrorKind::Io,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether this error reports resource exhaustion.
    ///
    /// A split or root growth that fails this way leaves every stored entry
    /// readable; the caller may release capacity and retry.
    pub const fn is_resource_exhaustion(&self) -> bool {
        matches!(self, Self::CapacityExhausted { .. })
    }

    /// Whether the condition is attributable to caller input (a missing
    /// key, a bad configuration) rather than to this library or its host.
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::KeyNotFound | Self::LogConfig { .. })
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a logger configuration error.
    pub fn log_config(detail: impl Into<String>) -> Self {
        Self::LogConfig {
            detail: detail.into(),
        }
    }

    /// Create an arena corruption error.
    pub fn arena_corrupt(detail: impl Into<String>) -> Self {
        Self::ArenaCorrupt {
            detail: detail.into(),
        }
    }
}

/// Result type alias using `CoppiceError`.
pub type Result<T> = std::result::Result<T, CoppiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_key_not_found() {
        assert_eq!(CoppiceError::KeyNotFound.to_string(), "no entry found for key");
    }

    #[test]
    fn error_display_capacity() {
        let err = CoppiceError::CapacityExhausted { capacity: 64 };
        assert_eq!(
            err.to_string(),
            "node store capacity exhausted (64 slots)"
        );
    }

    #[test]
    fn error_display_log_config() {
        let err = CoppiceError::log_config("unknown severity name 'loud'");
        assert_eq!(
            err.to_string(),
            "invalid logger configuration: unknown severity name 'loud'"
        );
    }

    #[test]
    fn kind_mapping() {
        assert_eq!(CoppiceError::KeyNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(
            CoppiceError::CapacityExhausted { capacity: 1 }.kind(),
            ErrorKind::Resource
        );
        assert_eq!(
            CoppiceError::arena_corrupt("cycle").kind(),
            ErrorKind::Corrupt
        );
        assert_eq!(CoppiceError::log_config("x").kind(), ErrorKind::Config);
        assert_eq!(CoppiceError::internal("x").kind(), ErrorKind::Internal);
    }

    #[test]
    fn resource_exhaustion_predicate() {
        assert!(CoppiceError::CapacityExhausted { capacity: 8 }.is_resource_exhaustion());
        assert!(!CoppiceError::KeyNotFound.is_resource_exhaustion());
        assert!(!CoppiceError::internal("x").is_resource_exhaustion());
    }

    #[test]
    fn user_error_predicate() {
        assert!(CoppiceError::KeyNotFound.is_user_error());
        assert!(CoppiceError::log_config("bad json").is_user_error());
        assert!(!CoppiceError::internal("bug").is_user_error());
        assert!(!CoppiceError::CapacityExhausted { capacity: 1 }.is_user_error());
    }

    #[test]
    fn convenience_constructors() {
        let err = CoppiceError::internal("frame stack empty");
        assert!(matches!(err, CoppiceError::Internal(msg) if msg == "frame stack empty"));

        let err = CoppiceError::arena_corrupt("free head out of range");
        assert!(
            matches!(err, CoppiceError::ArenaCorrupt { detail } if detail == "free head out of range")
        );
    }

    #[test]
    fn io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: CoppiceError = io_err.into();
        assert!(matches!(err, CoppiceError::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
