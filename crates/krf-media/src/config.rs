//! Demuxer configuration.
//!
//! Every field defaults sensibly so an empty `{}` document is valid.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Options controlling how a KRF container is opened and read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemuxConfig {
    /// Maximum bytes scanned for a frame sync marker. `None` bounds the
    /// scan by the length of the media-data region.
    pub max_sync_scan: Option<u64>,
    /// Require each table's size field to equal `12 + 4 * count`.
    pub validate_table_sizes: bool,
    /// Check index ordering and keyframe subset rules at open.
    pub strict_index: bool,
    /// Refuse containers whose encrypt type is non-zero.
    pub reject_encrypted: bool,
}

impl Default for DemuxConfig {
    fn default() -> Self {
        Self {
            max_sync_scan: None,
            validate_table_sizes: true,
            strict_index: false,
            reject_encrypted: false,
        }
    }
}

impl DemuxConfig {
    /// Deserialize a `DemuxConfig` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Config(format!("config parse error: {e}")))
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.max_sync_scan == Some(0) {
            warnings.push("max_sync_scan is 0; every packet read will fail".into());
        }

        if !self.validate_table_sizes && self.strict_index {
            warnings.push(
                "strict_index is set but validate_table_sizes is off; table sizes are unchecked"
                    .into(),
            );
        }

        warnings
    }

    /// Sync scan bound for a media-data region of `region_len` bytes.
    pub(crate) fn sync_scan_limit(&self, region_len: u64) -> u64 {
        self.max_sync_scan.unwrap_or(region_len)
    }
}
