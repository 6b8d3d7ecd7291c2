#![warn(clippy::all)]

//! Core data structures for point cloud ground truth labeling and segmentation evaluation
//!
//! A scene is described by its point cloud, a [ModelLibrary](crate::ModelLibrary) of object models and a list of
//! [PoseInstance](crate::PoseInstance)s placing those models in the scene. Class ids for the models come from a
//! [LabelMap](crate::LabelMap). The algorithms in `gtseg-algorithms` turn these into a [LabeledCloud](crate::LabeledCloud)
//! and evaluate [Segment](crate::Segment)s against it.

pub extern crate nalgebra;

mod cloud;
pub use self::cloud::*;

mod labels;
pub use self::labels::*;

mod model;
pub use self::model::*;

mod pose;
pub use self::pose::*;

/// Bounding boxes and rigid transformations
pub mod math;
/// Tunable parameters of the labeling and evaluation algorithms
pub mod params;
