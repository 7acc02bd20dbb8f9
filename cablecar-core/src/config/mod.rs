//! Configuration types
//!
//! Run parameters, the platform wait ceiling, and the `run.toml` parser.

pub mod error;
pub mod toml;
pub mod types;

pub use error::ConfigurationError;
pub use toml::{parse_config, ParseError};
pub use types::*;
