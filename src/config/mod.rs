//! Configuration loading and validation
//!
//! Configuration is a TOML file naming the credential directory, the OAuth2
//! scope, the submission endpoint, and the work-queue database path.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, IndexingConfig, OutputConfig};
pub use validation::validate;
