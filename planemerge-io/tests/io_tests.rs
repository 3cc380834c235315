//! File-level tests for planemerge-io
//!
//! These write frames and configurations to disk, run them through the
//! concatenator and check the JSON that comes out.

use planemerge_algorithms::{Frame, MergeOutput, PlaneConcatenator};
use planemerge_core::{Point3f, PointIndices, Polygon};
use planemerge_io::*;
use std::fs;
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("planemerge_{}_{}", std::process::id(), name))
}

/// Two flat 6 x 6 tiles that touch along x = 0.5
fn touching_tiles() -> Frame {
    let mut frame = Frame::default();
    for x0 in [0.0_f32, 0.55] {
        let first = frame.cloud.len();
        for i in 0..6 {
            for j in 0..6 {
                frame
                    .cloud
                    .push(Point3f::new(x0 + i as f32 * 0.1, j as f32 * 0.1, 1.0));
            }
        }
        frame.indices.push((first..frame.cloud.len()).collect());
        frame.coefficients.push(vec![0.0, 0.0, 1.0, -1.0]);
        frame.polygons.push(Polygon::default());
    }
    frame
}

#[test]
fn test_frame_file_to_merged_output_file() {
    let frame_file = temp_path("pipeline_frame.json");
    let config_file = temp_path("pipeline_config.toml");
    let output_file = temp_path("pipeline_output.json");

    write_frame(&touching_tiles(), &frame_file).unwrap();
    fs::write(&config_file, "connect_distance_threshold = 0.06\nrandom_seed = 3\n").unwrap();

    let frame = read_frame(&frame_file).unwrap();
    assert_eq!(frame, touching_tiles());

    let config = load_config(&config_file).unwrap();
    let concatenator = PlaneConcatenator::new(config).unwrap();
    let output = concatenator.concatenate(&frame).unwrap();
    write_output(&output, &output_file).unwrap();

    let text = fs::read_to_string(&output_file).unwrap();
    let written: MergeOutput = serde_json::from_str(&text).unwrap();
    assert_eq!(written.groups, vec![vec![0, 1]]);
    assert_eq!(written.indices, vec![(0..72).collect::<PointIndices>()]);
    assert_eq!(written.coefficients.len(), 1);
    assert!(written.polygons[0].is_valid());

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["coefficients"][0].as_array().unwrap().len(), 4);
    assert_eq!(json["indices"][0].as_array().unwrap().len(), 72);

    for file in [frame_file, config_file, output_file] {
        let _ = fs::remove_file(file);
    }
}

#[test]
fn test_output_to_string_matches_written_file() {
    let output_file = temp_path("string_output.json");
    let concatenator = PlaneConcatenator::new(Default::default()).unwrap();
    let output = concatenator.concatenate(&Frame::default()).unwrap();

    write_output(&output, &output_file).unwrap();
    let text = output_to_string(&output).unwrap();
    assert_eq!(fs::read_to_string(&output_file).unwrap().trim_end(), text);

    let _ = fs::remove_file(output_file);
}

#[test]
fn test_malformed_frame_file_is_reported() {
    let frame_file = temp_path("malformed_frame.json");
    fs::write(&frame_file, r#"{ "cloud": { "points": [[0.0, 0.0]] } }"#).unwrap();

    assert!(matches!(read_frame(&frame_file), Err(IoError::Json(_))));

    let _ = fs::remove_file(frame_file);
}

#[test]
fn test_write_output_rejects_unknown_extension() {
    let output = MergeOutput::default();
    let result = write_output(&output, temp_path("output.yaml"));
    assert!(matches!(result, Err(IoError::InvalidFormat { .. })));
}
