//! Safety limits applied when opening an archive.

/// Limits for [`TransactionContainer::open_with_limits`](crate::TransactionContainer::open_with_limits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveLimits {
    /// Maximum compressed archive size.
    pub max_archive_bytes: u64,
    /// Maximum uncompressed size of one member.
    pub max_member_bytes: u64,
    pub max_members: usize,
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_archive_bytes: 64 * 1024 * 1024, // 64 MB compressed
            max_member_bytes: 16 * 1024 * 1024,  // 16 MB
            max_members: 1_000,
        }
    }
}
