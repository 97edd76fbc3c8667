//! Storage Config

use std::path::PathBuf;

use clap::Args;

const APP_DIR: &str = "storefront";
const FALLBACK_DIR: &str = ".storefront";

/// Guest cart persistence settings.
#[derive(Debug, Clone, Args)]
pub struct StorageConfig {
    /// Directory holding the guest cart slot
    #[arg(long, env = "STOREFRONT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Configured directory, or the platform data directory.
    #[must_use]
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir().map_or_else(|| PathBuf::from(FALLBACK_DIR), |dir| dir.join(APP_DIR))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directory_wins() {
        let config = StorageConfig {
            data_dir: Some(PathBuf::from("/tmp/cart")),
        };

        assert_eq!(config.resolved_data_dir(), PathBuf::from("/tmp/cart"));
    }
}
