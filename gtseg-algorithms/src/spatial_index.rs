use gtseg_core::nalgebra::Vector3;
use kd_tree::{KdPoint, KdTree};

/// A position together with its index in the point cloud the index was built from
#[derive(Debug, Clone, Copy, PartialEq)]
struct IndexedPosition {
    position: [f64; 3],
    index: usize,
}

impl KdPoint for IndexedPosition {
    type Scalar = f64;
    type Dim = typenum::U3;
    fn at(&self, k: usize) -> f64 {
        self.position[k]
    }
}

const INITIAL_RADIUS_SEARCH_K: usize = 16;

/// Result of a query against a `SpatialIndex`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index of the point within the cloud the `SpatialIndex` was built from
    pub index: usize,
    pub squared_distance: f64,
}

/// kd-tree over the positions of a point cloud, answering nearest neighbour and radius queries. The
/// index is immutable after construction and can be shared between threads for querying.
///
/// # Examples
///
/// ```
/// # use gtseg_core::nalgebra::Vector3;
/// # use gtseg_algorithms::spatial_index::SpatialIndex;
/// let positions = vec![
///     Vector3::new(0.0, 0.0, 0.0),
///     Vector3::new(1.0, 0.0, 0.0),
///     Vector3::new(5.0, 0.0, 0.0),
/// ];
/// let index = SpatialIndex::build(&positions);
/// let nearest = index.nearest(&Vector3::new(0.9, 0.0, 0.0)).unwrap();
/// assert_eq!(nearest.index, 1);
/// let mut within = index.within_radius(&Vector3::new(0.5, 0.0, 0.0), 0.6);
/// within.sort_by_key(|neighbor| neighbor.index);
/// assert_eq!(within.iter().map(|n| n.index).collect::<Vec<_>>(), vec![0, 1]);
/// ```
pub struct SpatialIndex {
    // kd-tree is not built for empty clouds
    tree: Option<KdTree<IndexedPosition>>,
    len: usize,
}

impl SpatialIndex {
    /// Builds a `SpatialIndex` over the given positions. Indices reported by queries refer to `positions`
    pub fn build(positions: &[Vector3<f64>]) -> Self {
        if positions.is_empty() {
            return Self { tree: None, len: 0 };
        }
        let items = positions
            .iter()
            .enumerate()
            .map(|(index, position)| IndexedPosition {
                position: [position.x, position.y, position.z],
                index,
            })
            .collect::<Vec<_>>();
        Self {
            tree: Some(KdTree::build_by_ordered_float(items)),
            len: positions.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the indexed point closest to `query`, or `None` if the index is empty or `query` is not finite
    pub fn nearest(&self, query: &Vector3<f64>) -> Option<Neighbor> {
        if !is_finite(query) {
            return None;
        }
        let tree = self.tree.as_ref()?;
        let query: [f64; 3] = [query.x, query.y, query.z];
        tree.nearest(&query).map(|found| Neighbor {
            index: found.item.index,
            squared_distance: found.squared_distance,
        })
    }

    /// Returns all indexed points whose distance to `query` is at most `radius`, in no particular order
    pub fn within_radius(&self, query: &Vector3<f64>, radius: f64) -> Vec<Neighbor> {
        let tree = match &self.tree {
            Some(tree) => tree,
            None => return vec![],
        };
        if !is_finite(query) || !radius.is_finite() || radius < 0.0 {
            return vec![];
        }
        let squared_radius = radius * radius;
        let query: [f64; 3] = [query.x, query.y, query.z];
        // Grow k until the k-th nearest neighbour lies outside the radius, at which point all points within
        // the radius are among the k nearest
        let mut k = INITIAL_RADIUS_SEARCH_K.min(self.len);
        loop {
            let found = tree.nearests(&query, k);
            let farthest = found
                .iter()
                .map(|neighbor| neighbor.squared_distance)
                .fold(0.0, f64::max);
            if farthest > squared_radius || k >= self.len {
                return found
                    .into_iter()
                    .filter(|neighbor| neighbor.squared_distance <= squared_radius)
                    .map(|neighbor| Neighbor {
                        index: neighbor.item.index,
                        squared_distance: neighbor.squared_distance,
                    })
                    .collect();
            }
            k = (k * 2).min(self.len);
        }
    }
}

fn is_finite(position: &Vector3<f64>) -> bool {
    position.x.is_finite() && position.y.is_finite() && position.z.is_finite()
}
