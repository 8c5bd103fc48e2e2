//! Session configuration.
//!
//! Every field has a default, so hosts can deserialize a partial table:
//!
//! ```rust
//! use docsync_core::SyncConfig;
//!
//! let config = SyncConfig::default()
//!     .with_marker_id_prefix("mk")
//!     .with_max_edit_cost(64);
//! assert_eq!(config.marker_id_prefix, "mk");
//! assert_eq!(config.diff.max_edit_cost, 64);
//! ```

use serde::{Deserialize, Serialize};

/// Default prefix for generated marker ids.
pub const DEFAULT_MARKER_ID_PREFIX: &str = "m";

/// Default edit-distance budget of the character diff.
pub const DEFAULT_MAX_EDIT_COST: usize = 1024;

/// Tuning for the character diff ([`diff_text`](crate::diff::diff_text)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Largest edit distance the character diff searches for after trimming the common prefix
    /// and suffix. Beyond it the changed middle is replaced wholesale (one delete + one insert).
    pub max_edit_cost: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            max_edit_cost: DEFAULT_MAX_EDIT_COST,
        }
    }
}

/// Configuration of a [`SyncSession`](crate::SyncSession) or
/// [`LiveDocument`](crate::LiveDocument).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Prefix of ids produced for generated markers.
    pub marker_id_prefix: String,
    /// Diff tuning.
    pub diff: DiffOptions,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            marker_id_prefix: DEFAULT_MARKER_ID_PREFIX.to_string(),
            diff: DiffOptions::default(),
        }
    }
}

impl SyncConfig {
    /// Set the generated marker id prefix.
    pub fn with_marker_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.marker_id_prefix = prefix.into();
        self
    }

    /// Set the diff edit-distance budget.
    pub fn with_max_edit_cost(mut self, max_edit_cost: usize) -> Self {
        self.diff.max_edit_cost = max_edit_cost;
        self
    }
}
