//! Runtime configuration
//!
//! Transfers can be tuned at runtime using environment variables or by using
//! functions in this module. Options set by calling functions in this module
//! override options set in environment variables.
//!
//! ```
//! use gdal_coverage::config::*;
//!
//! // Use 4Mb blocks for in-memory grids
//! set_config_option("COVERAGE_GRID_BLOCK_BYTES", "4194304");
//! assert_eq!(get_config_option("COVERAGE_GRID_BLOCK_BYTES", ""), "4194304");
//!
//! // Back to the default (or the environment)
//! clear_config_option("COVERAGE_GRID_BLOCK_BYTES");
//! ```
//!
//! Recognised options:
//!
//! * `COVERAGE_GRID_BLOCK_BYTES`: byte budget of one grid block, default `1048576`.
//! * `COVERAGE_OUTPUT_DRIVER`: short name of the driver used by `store`, default `GTiff`.

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::errors::{CoverageError, Result};

pub const GRID_BLOCK_BYTES: &str = "COVERAGE_GRID_BLOCK_BYTES";
pub const OUTPUT_DRIVER: &str = "COVERAGE_OUTPUT_DRIVER";

const DEFAULT_BLOCK_BYTES: usize = 1 << 20;
const DEFAULT_DRIVER: &str = "GTiff";

static CONFIG_OPTIONS: Lazy<Mutex<HashMap<String, String>>> = Lazy::new(Default::default);

/// Set a configuration option for the whole process.
pub fn set_config_option(key: &str, value: &str) {
    CONFIG_OPTIONS
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .insert(key.to_string(), value.to_string());
}

/// Get the value of a configuration option.
///
/// Looks at options set with [`set_config_option`] first, then at the environment.
/// If neither holds `key`, the value passed in the `default` parameter is returned.
pub fn get_config_option(key: &str, default: &str) -> String {
    let options = CONFIG_OPTIONS.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(value) = options.get(key) {
        return value.clone();
    }
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Clear a configuration option set with [`set_config_option`].
pub fn clear_config_option(key: &str) {
    CONFIG_OPTIONS
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .remove(key);
}

/// Options resolved once per load or store call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferOptions {
    /// Byte budget of one grid block, decides the lines per block.
    pub block_bytes: usize,
    /// Short name of the output driver.
    pub driver: String,
}

impl Default for TransferOptions {
    fn default() -> Self {
        TransferOptions {
            block_bytes: DEFAULT_BLOCK_BYTES,
            driver: DEFAULT_DRIVER.to_string(),
        }
    }
}

impl TransferOptions {
    pub fn from_config() -> Result<Self> {
        let raw = get_config_option(GRID_BLOCK_BYTES, "");
        let block_bytes = if raw.is_empty() {
            DEFAULT_BLOCK_BYTES
        } else {
            match raw.trim().parse::<usize>() {
                Ok(bytes) if bytes > 0 => bytes,
                _ => {
                    return Err(CoverageError::InvalidProperty {
                        property: GRID_BLOCK_BYTES.to_string(),
                        object: raw,
                    })
                }
            }
        };
        Ok(TransferOptions {
            block_bytes,
            driver: get_config_option(OUTPUT_DRIVER, DEFAULT_DRIVER),
        })
    }
}
