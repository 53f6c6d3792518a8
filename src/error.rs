use std::path::PathBuf;
use thiserror::Error;

/// Status codes returned by the document store.
pub mod status {
    /// Malformed request: invalid id, bad query, bad throughput.
    pub const BAD_REQUEST: u16 = 400;
    /// Missing or rejected credential.
    pub const UNAUTHORIZED: u16 = 401;
    /// Resource does not exist.
    pub const NOT_FOUND: u16 = 404;
    /// Resource already exists.
    pub const CONFLICT: u16 = 409;
    /// Request rate too large.
    pub const TOO_MANY_REQUESTS: u16 = 429;
    /// Service-side failure.
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

/// All errors that can occur while talking to the store or running the workflow.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The store answered with a non-success status code.
    #[error("status {code} for {link}: {message}")]
    Status {
        code: u16,
        link: String,
        message: String,
    },

    /// Credential missing, placeholder, or not accepted by the store.
    #[error("authorization failed: {reason}")]
    Auth { reason: String },

    /// Endpoint could not be reached or is not supported.
    #[error("cannot reach endpoint {endpoint}: {reason}")]
    Network { endpoint: String, reason: String },

    /// I/O error with context.
    #[error("I/O error at {path}: {context} ({source})")]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
        context: String,
    },

    /// Console read/write failed.
    #[error("console I/O failed: {0}")]
    Console(#[source] std::io::Error),

    /// Persisted state could not be decoded.
    #[error("corruption in {file}: {message}")]
    Corruption { file: PathBuf, message: String },

    /// Checksum mismatch.
    #[error("checksum mismatch in {file}: expected {expected:08x}, got {got:08x}")]
    ChecksumMismatch {
        file: PathBuf,
        expected: u32,
        got: u32,
    },

    /// Invalid argument provided.
    #[error("invalid argument for field '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Query text could not be parsed.
    #[error("query syntax error at position {position}: {message}")]
    Query { position: usize, message: String },

    /// Data directory is held by another store handle.
    #[error("store at {path} is locked by another process")]
    StoreLocked { path: PathBuf },
}

impl Error {
    /// Create an I/O error with context.
    pub fn io_err(path: impl Into<PathBuf>, context: impl Into<String>) -> impl FnOnce(std::io::Error) -> Self {
        move |e: std::io::Error| Error::Io {
            source: e,
            path: path.into(),
            context: context.into(),
        }
    }

    /// Create a status error for a resource link.
    pub fn status(code: u16, link: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Status {
            code,
            link: link.into(),
            message: message.into(),
        }
    }

    /// Create a 404 error.
    pub fn not_found(link: impl Into<String>) -> Self {
        Self::status(status::NOT_FOUND, link, "resource not found")
    }

    /// Create a 409 error.
    pub fn conflict(link: impl Into<String>) -> Self {
        Self::status(status::CONFLICT, link, "resource already exists")
    }

    /// Create a 400 error.
    pub fn bad_request(link: impl Into<String>, message: impl Into<String>) -> Self {
        Self::status(status::BAD_REQUEST, link, message)
    }

    /// Create a corruption error.
    pub fn corruption(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Corruption {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_arg(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Numeric status code carried by this error, if it maps to one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Status { code, .. } => Some(*code),
            Error::Auth { .. } => Some(status::UNAUTHORIZED),
            Error::Query { .. } => Some(status::BAD_REQUEST),
            _ => None,
        }
    }

    /// Whether this is the one error the provisioning workflow recovers from.
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(status::NOT_FOUND)
    }
}

/// Result type alias for store and workflow operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::not_found("/dbs/a").status_code(), Some(404));
        assert_eq!(Error::conflict("/dbs/a").status_code(), Some(409));
        assert_eq!(Error::bad_request("/dbs/a", "x").status_code(), Some(400));
        assert_eq!(
            Error::Auth { reason: "no key".into() }.status_code(),
            Some(status::UNAUTHORIZED)
        );
        assert_eq!(Error::Serialization("x".into()).status_code(), None);
    }

    #[test]
    fn test_is_not_found_only_for_404() {
        assert!(Error::not_found("/dbs/a").is_not_found());
        assert!(!Error::status(429, "/dbs/a", "throttled").is_not_found());
        assert!(!Error::Auth { reason: "bad".into() }.is_not_found());
    }

    #[test]
    fn test_display_includes_link() {
        let err = Error::not_found("/dbs/FamilyDB");
        assert_eq!(err.to_string(), "status 404 for /dbs/FamilyDB: resource not found");
    }
}
