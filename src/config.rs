//! Runtime configuration
//!
//! Built from command-line flags; every field has a default matching the
//! flag default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::ColumnLayout;

/// Rejected configuration value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid configuration: {0}")]
pub struct ConfigError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Staff data file (default "staff.bin" in the working directory)
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Records per page (default 15)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Name column budget before the ellipsis (default 47)
    #[serde(default = "default_name_width")]
    pub name_width: usize,

    /// Position column budget before the ellipsis (default 27)
    #[serde(default = "default_position_width")]
    pub position_width: usize,
}

pub const DEFAULT_DATA_FILE: &str = "staff.bin";
pub const DEFAULT_PAGE_SIZE: usize = 15;

fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}
fn default_name_width() -> usize {
    47
}
fn default_position_width() -> usize {
    27
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            page_size: default_page_size(),
            name_width: default_name_width(),
            position_width: default_position_width(),
        }
    }
}

impl RosterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_file.as_os_str().is_empty() {
            return Err(ConfigError("data_file must not be empty".to_string()));
        }
        if self.page_size == 0 {
            return Err(ConfigError("page_size must be > 0".to_string()));
        }
        if self.name_width == 0 || self.position_width == 0 {
            return Err(ConfigError("column widths must be > 0".to_string()));
        }
        Ok(())
    }

    pub fn layout(&self) -> ColumnLayout {
        ColumnLayout {
            name_width: self.name_width,
            position_width: self.position_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RosterConfig::default();
        assert_eq!(config.data_file, PathBuf::from("staff.bin"));
        assert_eq!(config.page_size, 15);
        assert_eq!(config.layout(), ColumnLayout::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: RosterConfig = serde_json::from_str(r#"{"page_size": 5}"#).unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.name_width, 47);
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = RosterConfig {
            page_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RosterConfig {
            position_width: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
