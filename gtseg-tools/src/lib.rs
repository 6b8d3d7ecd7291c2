#![warn(clippy::all)]

//! Shared steps of the `gtseg-label` and `gtseg-evaluate` command line tools

use std::path::Path;

use anyhow::{bail, Result};
use gtseg_algorithms::{filters::remove_non_finite, voxel_grid::voxelgrid_filter};
use gtseg_core::{nalgebra::Vector3, LabelMap, ModelLibrary};
use gtseg_io::read_class_list_from_path;
use log::debug;

/// Removes non-finite points from a raw scene cloud and downsamples it with a voxel grid of edge length
/// `leaf_size`. A `leaf_size` of zero or less skips the downsampling
pub fn prepare_scene(raw_positions: &[Vector3<f64>], leaf_size: f64) -> Vec<Vector3<f64>> {
    let (finite, _) = remove_non_finite(raw_positions);
    let prepared = voxelgrid_filter(&finite, leaf_size, leaf_size, leaf_size);
    debug!(
        "Scene preparation: {} raw points, {} finite, {} after downsampling",
        raw_positions.len(),
        finite.len(),
        prepared.len()
    );
    prepared
}

/// Builds the `LabelMap` for a run. With a class list file the ids come from that file, otherwise the models
/// are numbered in library order starting at 1
pub fn load_label_map(class_list: Option<&Path>, models: &ModelLibrary) -> Result<LabelMap> {
    match class_list {
        Some(path) => read_class_list_from_path(path),
        None => {
            if models.is_empty() {
                bail!("No models loaded, can't derive class ids");
            }
            LabelMap::from_names(models.names())
        }
    }
}
