//! Run configuration loading
//!
//! The run is compiled into the firmware from `run.toml`. `build.rs` runs
//! the same parser and planner over it, so a parse failure here means the
//! image was built around that check.

use defmt::*;

use cablecar_core::config::{parse_config, ParseError, SamplerConfig};

/// Embedded run configuration
/// Edit run.toml and rebuild to change the run
const EMBEDDED_CONFIG: &str = include_str!("../run.toml");

/// Parse the embedded configuration
///
/// There is no fallback run: a configuration that does not parse is
/// reported and nothing moves.
pub fn load_config() -> Result<SamplerConfig, ParseError> {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Loaded run '{}' from run.toml", config.label.as_str());
            Ok(config)
        }
        Err(e) => {
            error!("Failed to parse run.toml: {}", e);
            Err(e)
        }
    }
}
