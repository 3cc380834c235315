//! TOML configuration of the plane concatenator
//!
//! Every key is optional; missing keys keep their defaults.
//!
//! ```toml
//! connect_angular_threshold = 0.1
//! connect_distance_threshold = 0.05
//! ransac_refinement_max_iteration = 200
//! min_size = 50
//! random_seed = 7
//! ```

use crate::{ensure_exists, IoResult};
use log::debug;
use planemerge_algorithms::ConcatenatorConfig;
use std::path::Path;

/// Parse and validate a configuration from TOML text
pub fn config_from_str(text: &str) -> IoResult<ConcatenatorConfig> {
    let config: ConcatenatorConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> IoResult<ConcatenatorConfig> {
    let path = path.as_ref();
    ensure_exists(path)?;

    let text = std::fs::read_to_string(path)?;
    let config = config_from_str(&text)?;
    debug!("Loaded configuration from {}: {:?}", path.display(), config);
    Ok(config)
}
