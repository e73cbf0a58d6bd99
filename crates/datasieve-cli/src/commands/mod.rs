//! CLI command implementations.

pub mod fields;
pub mod match_cmd;
pub mod scan;

use std::path::Path;

use datasieve::SieveConfig;

/// Load the configuration file if one was given, defaults otherwise.
pub(crate) fn load_config(path: Option<&Path>) -> datasieve::Result<SieveConfig> {
    match path {
        Some(p) => SieveConfig::from_json_file(p),
        None => Ok(SieveConfig::default()),
    }
}
