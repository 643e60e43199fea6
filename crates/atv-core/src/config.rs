//! Verifier configuration.
//!
//! Loaded from YAML, from the environment, or built in code.
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `ATV_REQUIRE_MATCHING_SIGNATURE` | Fail signature binding when no signature matches the certificate (`1`/`true`) |
//! | `ATV_MAX_PATH_DEPTH` | Maximum number of path segments accepted (default: 32) |
//! | `ATV_ROOT_FORMAT` | Root format identifier; detected when unset |

use std::fs;
use std::path::Path as FsPath;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default maximum path depth.
pub const DEFAULT_MAX_PATH_DEPTH: usize = 32;

/// Outcome of a signature binding when the subject carries no signature by
/// the resolved certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedSignaturePolicy {
    /// Nothing bound to that certificate, nothing to check: success.
    #[default]
    Pass,
    /// A missing binding is a verification failure.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifierConfig {
    #[serde(default)]
    pub unmatched_signature: UnmatchedSignaturePolicy,

    #[serde(default = "default_max_path_depth")]
    pub max_path_depth: usize,

    /// Root format identifier. `None` means detect.
    #[serde(default)]
    pub root_format: Option<String>,
}

fn default_max_path_depth() -> usize {
    DEFAULT_MAX_PATH_DEPTH
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            unmatched_signature: UnmatchedSignaturePolicy::default(),
            max_path_depth: DEFAULT_MAX_PATH_DEPTH,
            root_format: None,
        }
    }
}

impl VerifierConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Self {
        let require_matching = std::env::var("ATV_REQUIRE_MATCHING_SIGNATURE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            unmatched_signature: if require_matching {
                UnmatchedSignaturePolicy::Fail
            } else {
                UnmatchedSignaturePolicy::Pass
            },
            max_path_depth: std::env::var("ATV_MAX_PATH_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|depth| *depth > 0)
                .unwrap_or(DEFAULT_MAX_PATH_DEPTH),
            root_format: std::env::var("ATV_ROOT_FORMAT")
                .ok()
                .filter(|v| !v.is_empty()),
        }
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &FsPath) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read verifier config: {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).context("failed to parse verifier config YAML")?;
        if config.max_path_depth == 0 {
            anyhow::bail!("max_path_depth must be at least 1");
        }
        Ok(config)
    }

    pub fn with_unmatched_signature(mut self, policy: UnmatchedSignaturePolicy) -> Self {
        self.unmatched_signature = policy;
        self
    }

    pub fn with_root_format(mut self, format: impl Into<String>) -> Self {
        self.root_format = Some(format.into());
        self
    }

    pub fn with_max_path_depth(mut self, depth: usize) -> Self {
        self.max_path_depth = depth;
        self
    }
}
