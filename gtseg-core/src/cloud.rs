use std::collections::BTreeMap;
use std::iter::FromIterator;

use anyhow::{bail, Result};
use nalgebra::Vector3;

/// Identifier of an object class. `BACKGROUND` (0) marks points that belong to no known object
pub type ClassId = u32;

/// Label of points that could not be associated with any ground truth object
pub const BACKGROUND: ClassId = 0;

/// A scene point cloud in which every point carries a ground truth class label. Point order is the order of
/// the scene cloud it was produced from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledCloud {
    positions: Vec<Vector3<f64>>,
    labels: Vec<ClassId>,
}

impl LabeledCloud {
    /// Creates a `LabeledCloud` from matching position and label sequences. Returns an error if the two
    /// sequences differ in length
    pub fn new(positions: Vec<Vector3<f64>>, labels: Vec<ClassId>) -> Result<Self> {
        if positions.len() != labels.len() {
            bail!(
                "LabeledCloud needs one label per position, got {} positions and {} labels",
                positions.len(),
                labels.len()
            );
        }
        Ok(Self { positions, labels })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    pub fn labels(&self) -> &[ClassId] {
        &self.labels
    }

    /// Returns the label of the point at `index`
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds
    pub fn label_at(&self, index: usize) -> ClassId {
        self.labels[index]
    }

    /// Iterates over all `(position, label)` pairs in point order
    pub fn iter(&self) -> impl Iterator<Item = (&Vector3<f64>, ClassId)> + '_ {
        self.positions.iter().zip(self.labels.iter().copied())
    }

    /// Number of points that carry a label other than `BACKGROUND`
    pub fn labeled_count(&self) -> usize {
        self.labels.iter().filter(|label| **label != BACKGROUND).count()
    }

    /// Groups all non-background points by their label. Each class that occurs in this cloud becomes one
    /// segment, in ascending order of the class id
    ///
    /// ```
    /// # use gtseg_core::nalgebra::Vector3;
    /// # use gtseg_core::LabeledCloud;
    /// let cloud = LabeledCloud::new(
    ///     vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0), Vector3::new(2.0, 0.0, 0.0)],
    ///     vec![2, 0, 2],
    /// ).unwrap();
    /// let segments = cloud.class_segments();
    /// assert_eq!(segments.len(), 1);
    /// assert_eq!(segments[&2].len(), 2);
    /// ```
    pub fn class_segments(&self) -> BTreeMap<ClassId, Segment> {
        let mut segments: BTreeMap<ClassId, Segment> = BTreeMap::new();
        for (position, label) in self.iter() {
            if label == BACKGROUND {
                continue;
            }
            segments.entry(label).or_default().push(*position);
        }
        segments
    }
}

/// A candidate cluster of scene points, produced by some external segmentation. Segments are unordered
/// sets of positions; a segment may be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segment {
    points: Vec<Vector3<f64>>,
}

impl Segment {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    pub fn push(&mut self, point: Vector3<f64>) {
        self.points.push(point);
    }
}

impl From<Vec<Vector3<f64>>> for Segment {
    fn from(points: Vec<Vector3<f64>>) -> Self {
        Self { points }
    }
}

impl FromIterator<Vector3<f64>> for Segment {
    fn from_iter<I: IntoIterator<Item = Vector3<f64>>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}
