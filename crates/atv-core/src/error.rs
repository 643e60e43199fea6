//! Error taxonomy for resolution and verification.

use std::fmt;

/// Classification of engine failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The path or query does not exist under any handler in scope.
    PathNotFound,
    /// A resolved value has a different kind than required.
    FormatMismatch,
    /// A handler could not parse its designated member.
    InitializationFailure,
    /// The container's signature check failed or could not run.
    CryptographicFailure,
    /// A path names a leading segment with no registered child.
    DelegationError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Handler initialization errors.
///
/// Cloneable so a failed child can be cached in its parent's registry and
/// handed to every later caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InitError {
    #[error("Error while parsing form. Wrong format? ({member} not found.)")]
    MissingMember { format: String, member: String },

    #[error("Error while parsing {member}: {reason}")]
    Decode {
        format: String,
        member: String,
        reason: String,
    },

    #[error("Wrong format in {member}: expected {expected}, found {found}")]
    WrongFormat {
        member: String,
        expected: String,
        found: String,
    },

    #[error("No signing certificate in container for {format}")]
    MissingCertificate { format: String },

    #[error("Format {format} cannot be built from {input}")]
    UnsupportedInput { format: String, input: String },

    #[error("Unknown format: {format}")]
    UnknownFormat { format: String },

    #[error("No registered format accepts this container ({})", .attempts.join("; "))]
    Undetected { attempts: Vec<String> },
}

impl InitError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InitializationFailure
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// A failed render or verification, carrying the one line reported for it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct EngineError {
    pub kind: ErrorKind,
    pub message: String,
}

impl EngineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn path_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PathNotFound, message)
    }

    pub fn format_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FormatMismatch, message)
    }

    pub fn delegation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DelegationError, message)
    }

    pub fn crypto(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CryptographicFailure, message)
    }
}

impl From<InitError> for EngineError {
    fn from(err: InitError) -> Self {
        Self::new(ErrorKind::InitializationFailure, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_member_names_the_member() {
        let err = InitError::MissingMember {
            format: "theAuctionHouse2019".into(),
            member: "bid.xml".into(),
        };
        assert!(err.to_string().contains("bid.xml"));
        assert_eq!(err.kind(), ErrorKind::InitializationFailure);
    }

    #[test]
    fn undetected_lists_attempts() {
        let err = InitError::Undetected {
            attempts: vec!["simpleContract: a".into(), "theAuctionHouse2019: b".into()],
        };
        assert_eq!(
            err.to_string(),
            "No registered format accepts this container (simpleContract: a; theAuctionHouse2019: b)"
        );
    }

    #[test]
    fn init_error_converts_to_engine_error() {
        let err: EngineError = InitError::UnknownFormat {
            format: "x".into(),
        }
        .into();
        assert_eq!(err.kind, ErrorKind::InitializationFailure);
        assert_eq!(err.message, "Unknown format: x");
    }
}
