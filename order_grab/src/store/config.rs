//! Storage configuration loaded from environment variables.

use std::path::PathBuf;

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the flat JSON data files
    pub data_dir: PathBuf,
    /// Per-operation I/O timeout in seconds
    pub io_timeout_secs: u64,
}

impl StoreConfig {
    /// Load configuration from environment variables
    ///
    /// Reads `DATA_DIR` (default `./data`) and `STORE_IO_TIMEOUT_SECS`
    /// (default 5).
    pub fn from_env() -> Self {
        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let io_timeout_secs = std::env::var("STORE_IO_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Self {
            data_dir,
            io_timeout_secs,
        }
    }

    /// Configuration rooted at an explicit directory (used by tests)
    pub fn with_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            io_timeout_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_dir() {
        let config = StoreConfig::with_dir("/tmp/og_test");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/og_test"));
        assert_eq!(config.io_timeout_secs, 5);
    }
}
