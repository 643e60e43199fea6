//! Error types for transaction archives.

/// Archive errors.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Reading or writing the archive failed.
    #[error("archive I/O error: {message}")]
    Io { message: String },

    /// Member path is absolute, empty or escapes the archive root.
    #[error("invalid member path: {path}")]
    InvalidPath { path: String },

    #[error("duplicate member: {name}")]
    DuplicateMember { name: String },

    /// A member exceeds the configured size limit.
    #[error("member {name} is {size} bytes (limit {limit})")]
    MemberTooLarge { name: String, size: u64, limit: u64 },

    #[error("archive has more than {limit} members")]
    TooManyMembers { limit: usize },

    #[error("archive exceeds {limit} bytes")]
    ArchiveTooLarge { limit: u64 },

    /// `META-INF/signatures.json` could not be parsed.
    #[error("malformed signature manifest: {reason}")]
    MalformedSignatures { reason: String },

    /// A signature names a member the archive does not contain.
    #[error("cannot sign missing member: {name}")]
    UnknownMember { name: String },

    /// The certificate does not carry the signing key's public key.
    #[error("certificate {subject} does not match the signing key")]
    KeyMismatch { subject: String },

    #[error(transparent)]
    Certificate(#[from] atv_core::CertificateError),
}

impl ArchiveError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

/// Result alias for archive operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;
