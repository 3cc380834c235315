//! JSON frames and merge results
//!
//! A frame file holds the full cloud and, per patch, its point indices,
//! plane coefficients and boundary polygon:
//!
//! ```json
//! {
//!   "cloud": { "points": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] },
//!   "indices": [[0, 1, 2]],
//!   "coefficients": [[0.0, 0.0, 1.0, 0.0]],
//!   "polygons": [{ "vertices": [] }]
//! }
//! ```

use crate::{ensure_exists, ensure_extension, IoError, IoResult};
use log::debug;
use planemerge_algorithms::{Frame, MergeOutput};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

const JSON_EXTENSIONS: &[&str] = &["json"];

/// Parse a frame from JSON text
pub fn frame_from_str(json: &str) -> IoResult<Frame> {
    Ok(serde_json::from_str(json)?)
}

/// Read a frame from a `.json` file
pub fn read_frame<P: AsRef<Path>>(path: P) -> IoResult<Frame> {
    let path = path.as_ref();
    ensure_exists(path)?;
    ensure_extension(path, JSON_EXTENSIONS)?;

    let reader = BufReader::new(File::open(path)?);
    let frame: Frame = serde_json::from_reader(reader)?;
    debug!(
        "Read frame from {}: {} points, {} patches",
        path.display(),
        frame.cloud.len(),
        frame.patch_count()
    );
    Ok(frame)
}

/// Write a frame as pretty-printed JSON
pub fn write_frame<P: AsRef<Path>>(frame: &Frame, path: P) -> IoResult<()> {
    write_json(frame, path.as_ref())
}

/// Serialize a merge result as pretty-printed JSON text
pub fn output_to_string(output: &MergeOutput) -> IoResult<String> {
    Ok(serde_json::to_string_pretty(output)?)
}

/// Write a merge result as pretty-printed JSON
pub fn write_output<P: AsRef<Path>>(output: &MergeOutput, path: P) -> IoResult<()> {
    let path = path.as_ref();
    write_json(output, path)?;
    debug!("Wrote {} merged planes to {}", output.len(), path.display());
    Ok(())
}

fn write_json<T: serde::Serialize>(value: &T, path: &Path) -> IoResult<()> {
    ensure_extension(path, JSON_EXTENSIONS)?;

    let file = File::create(path).map_err(|e| IoError::WriteError {
        message: format!("Cannot create {}: {}", path.display(), e),
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
