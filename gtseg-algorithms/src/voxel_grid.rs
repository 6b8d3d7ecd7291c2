use std::collections::BTreeMap;

use gtseg_core::nalgebra::Vector3;

use crate::bounds::calculate_bounds;

/// Integer cell coordinates of a voxel, relative to the minimum corner of the cloud bounds
type VoxelPos = (i64, i64, i64);

struct Voxel {
    points: Vec<usize>,
}

impl Voxel {
    fn centroid(&self, positions: &[Vector3<f64>]) -> Vector3<f64> {
        let sum = self
            .points
            .iter()
            .fold(Vector3::zeros(), |sum, index| sum + positions[*index]);
        sum / self.points.len() as f64
    }
}

/// finds the voxel of point p
fn find_leaf(p: &Vector3<f64>, origin: &Vector3<f64>, leafsize: &Vector3<f64>) -> VoxelPos {
    let offset = (p - origin).component_div(leafsize);
    (
        offset.x.floor() as i64,
        offset.y.floor() as i64,
        offset.z.floor() as i64,
    )
}

/// Downsamples `positions` by applying a voxelgrid-filter.
/// Space is divided into cells of size `leafsize_x * leafsize_y * leafsize_z`, starting at the minimum corner
/// of the bounding box of `positions`. Every occupied cell is replaced by the centroid of its points. The result
/// is ordered by cell coordinates. Non-finite positions are dropped. If any leaf size is not a positive number,
/// `positions` is returned unchanged.
///
/// # Examples
/// ```
/// # use gtseg_algorithms::voxel_grid::voxelgrid_filter;
/// # use gtseg_core::nalgebra::Vector3;
/// let mut points = vec![];
/// // generate some points
/// for i in 0..100{
///     for j in 0..100{
///         points.push(Vector3::new(0.0, f64::from(i), f64::from(j)));
///     }
/// }
/// let filtered = voxelgrid_filter(&points, 1.5, 1.5, 1.5);
/// // filtered now has fewer points than the input
/// assert!(filtered.len() < points.len() / 2);
/// ```
pub fn voxelgrid_filter(
    positions: &[Vector3<f64>],
    leafsize_x: f64,
    leafsize_y: f64,
    leafsize_z: f64,
) -> Vec<Vector3<f64>> {
    let leafsize = Vector3::new(leafsize_x, leafsize_y, leafsize_z);
    // `!(x > 0)` also catches NaN leaf sizes
    if leafsize.iter().any(|size| !(*size > 0.0)) {
        return positions.to_vec();
    }

    // get the bounding box of the pointcloud
    let aabb = match calculate_bounds(positions) {
        Some(aabb) => aabb,
        None => return vec![],
    };
    let origin = aabb.min().coords;

    // create the VoxelGrid
    let mut voxels: BTreeMap<VoxelPos, Voxel> = BTreeMap::new();
    for (i, p) in positions.iter().enumerate() {
        if !p.iter().all(|v| v.is_finite()) {
            continue;
        }
        let pos = find_leaf(p, &origin, &leafsize);
        voxels
            .entry(pos)
            .or_insert_with(|| Voxel { points: vec![] })
            .points
            .push(i);
    }

    voxels
        .values()
        .map(|voxel| voxel.centroid(positions))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_voxel_centroids() {
        let positions = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.5, 0.5, 0.5),
            Vector3::new(2.1, 0.0, 0.0),
            Vector3::new(2.3, 0.2, 0.0),
            Vector3::new(f64::NAN, 0.0, 0.0),
        ];
        let filtered = voxelgrid_filter(&positions, 1.0, 1.0, 1.0);
        assert_eq!(filtered.len(), 2);
        assert_approx_eq!(filtered[0].x, 0.25);
        assert_approx_eq!(filtered[0].y, 0.25);
        assert_approx_eq!(filtered[0].z, 0.25);
        assert_approx_eq!(filtered[1].x, 2.2);
        assert_approx_eq!(filtered[1].y, 0.1);
        assert_approx_eq!(filtered[1].z, 0.0);
    }

    #[test]
    fn test_non_positive_leafsize_disables_filter() {
        let positions = vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.001, 0.0, 0.0)];
        assert_eq!(voxelgrid_filter(&positions, 0.0, 1.0, 1.0), positions);
        assert_eq!(voxelgrid_filter(&positions, -1.0, -1.0, -1.0), positions);
        assert_eq!(voxelgrid_filter(&positions, f64::NAN, 1.0, 1.0), positions);
    }

    #[test]
    fn test_empty_input() {
        assert!(voxelgrid_filter(&[], 0.1, 0.1, 0.1).is_empty());
    }

    #[test]
    fn test_at_most_one_point_per_voxel() {
        let positions = (0..1000)
            .map(|i| {
                let i = i as f64;
                Vector3::new((i * 0.013) % 1.0, (i * 0.029) % 1.0, (i * 0.007) % 1.0)
            })
            .collect::<Vec<_>>();
        let leaf = 0.25;
        let filtered = voxelgrid_filter(&positions, leaf, leaf, leaf);
        assert!(filtered.len() <= 4 * 4 * 5);
        assert!(!filtered.is_empty());
    }
}
