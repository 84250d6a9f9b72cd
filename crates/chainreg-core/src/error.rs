//! The ChainReg error taxonomy.
//!
//! Every facade method returns [`RegistryError`]: a coarse [`ErrorKind`] the
//! caller can branch on, the name of the facade function that first observed
//! the failure, and structured tags for logging. Adapter errors are wrapped
//! exactly once at the facade boundary — a [`crate::binding::BindingError`]
//! never escapes to callers raw.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, RegistryError>;

// ─── ErrorKind ────────────────────────────────────────────────────────────────

/// The coarse kind of a registry client failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Invalid or unsupported configuration: bad chain id, malformed address,
    /// version mismatch, unreadable address file. Not retryable without
    /// operator intervention.
    BadConfig,
    /// A caller-supplied argument failed validation before any network call.
    BadArgument,
    /// RPC or adapter failure during a call or transaction. Potentially
    /// retryable by the caller.
    CannotCallContract,
    /// The queried entity does not exist on-chain.
    NotFound,
    /// A write targeted an entity that already exists (e.g. duplicate stream
    /// allocation). Callers that want idempotency branch on this kind.
    AlreadyExists,
    /// An index-based read exceeded the collection's current length.
    OutOfBounds,
    /// The operation was cancelled before the chain confirmed it. A write may
    /// still have been broadcast.
    Cancelled,
    /// An invariant was violated inside this layer (e.g. a uint256 count that
    /// does not fit in i64).
    Internal,
}

impl ErrorKind {
    /// Screaming-snake rendering used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadConfig => "BAD_CONFIG",
            Self::BadArgument => "BAD_ARGUMENT",
            Self::CannotCallContract => "CANNOT_CALL_CONTRACT",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::OutOfBounds => "OUT_OF_BOUNDS",
            Self::Cancelled => "CANCELLED",
            Self::Internal => "INTERNAL",
        }
    }

    /// Returns `true` if a retry of the same operation could succeed without
    /// operator intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CannotCallContract | Self::Cancelled)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── RegistryError ────────────────────────────────────────────────────────────

/// A tagged registry client error.
#[derive(Debug)]
pub struct RegistryError {
    kind: ErrorKind,
    func: &'static str,
    message: String,
    tags: Vec<(&'static str, String)>,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl RegistryError {
    /// Create a new error observed by `func`.
    pub fn new(kind: ErrorKind, func: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            func,
            message: message.into(),
            tags: Vec::new(),
            source: None,
        }
    }

    /// Wrap an underlying error, recording `func` as the boundary where it
    /// was first observed.
    pub fn wrap(
        kind: ErrorKind,
        func: &'static str,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(kind, func, message)
        }
    }

    /// Attach a structured tag for diagnostics.
    pub fn tag(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.tags.push((key, value.to_string()));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn func(&self) -> &'static str {
        self.func
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn tags(&self) -> &[(&'static str, String)] {
        &self.tags
    }

    /// Shorthand for `self.kind().is_retryable()`.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}: {}", self.kind, self.func, self.message)?;
        if !self.tags.is_empty() {
            write!(f, " [")?;
            for (i, (k, v)) in self.tags.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{k}={v}")?;
            }
            write!(f, "]")?;
        }
        if let Some(src) = &self.source {
            write!(f, ": {src}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_func_and_tags() {
        let err = RegistryError::new(ErrorKind::NotFound, "GetStream", "stream not registered")
            .tag("streamId", "stream-1")
            .tag("address", "0xabc");
        let rendered = err.to_string();
        assert_eq!(
            rendered,
            "NOT_FOUND in GetStream: stream not registered [streamId=stream-1 address=0xabc]"
        );
    }

    #[test]
    fn wrap_preserves_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = RegistryError::wrap(ErrorKind::BadConfig, "resolve", "cannot read address file", io);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("no such file"));
    }

    #[test]
    fn retryable_kinds() {
        assert!(ErrorKind::CannotCallContract.is_retryable());
        assert!(!ErrorKind::BadConfig.is_retryable());
        assert!(!ErrorKind::AlreadyExists.is_retryable());
        assert!(!ErrorKind::Internal.is_retryable());
    }

    #[test]
    fn kind_serde_snake_case() {
        let json = serde_json::to_string(&ErrorKind::CannotCallContract).unwrap();
        assert_eq!(json, "\"cannot_call_contract\"");
    }
}
