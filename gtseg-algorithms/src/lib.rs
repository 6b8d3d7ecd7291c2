#![warn(clippy::all)]
//! Algorithms for ground truth labeling of point clouds and for evaluating segmentations against that ground truth.
//!
//! The central pieces are [label_propagation](crate::label_propagation), which turns object poses into per-point
//! labels of a scene, and [segment_evaluation](crate::segment_evaluation), which scores and labels candidate
//! segments using those labels. The remaining modules prepare scene clouds for both.

// Bounding box of a set of positions.
pub mod bounds;
// Removal of points with non-finite coordinates.
pub mod filters;
// Propagation of object class ids from posed models onto scene points.
pub mod label_propagation;
// Segment purity score and per-segment majority labels.
pub mod segment_evaluation;
// kd-tree backed nearest neighbour and radius queries.
pub mod spatial_index;
// Rigid transformation of model points into scene coordinates.
pub mod transform;
// Voxel grid downsampling.
pub mod voxel_grid;
// Majority vote counting with first-come tie breaking.
pub mod vote_tally;
