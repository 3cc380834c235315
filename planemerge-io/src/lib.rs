//! I/O operations for planemerge
//!
//! Frames of segmented patches are read from JSON, merge results are
//! written back as JSON, and concatenator settings are loaded from TOML.

pub mod config;
pub mod error;
pub mod frame;

pub use config::{config_from_str, load_config};
pub use error::*;
pub use frame::{frame_from_str, output_to_string, read_frame, write_frame, write_output};

use std::path::Path;

/// Fail with [`IoError::FileNotFound`] unless `path` exists
pub(crate) fn ensure_exists(path: &Path) -> IoResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(IoError::FileNotFound {
            path: path.display().to_string(),
        })
    }
}

/// Fail with [`IoError::InvalidFormat`] unless `path` has one of `extensions`
pub(crate) fn ensure_extension(path: &Path, extensions: &[&str]) -> IoResult<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) => Ok(()),
        other => Err(IoError::InvalidFormat {
            format: format!(
                "{:?} (expected one of {:?}) for {}",
                other,
                extensions,
                path.display()
            ),
        }),
    }
}
