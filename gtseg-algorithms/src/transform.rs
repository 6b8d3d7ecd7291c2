use gtseg_core::{nalgebra::Vector3, ModelEntry, PoseInstance};
use rayon::prelude::*;

/// Rigid transformation of a point set
/// Maps every point `p` of `points` to `R * p + t` using the rotation and translation of `pose` and returns
/// the transformed points in the same order. `points` itself is not modified.
///
/// # Examples
///
/// ```
/// # use gtseg_core::{nalgebra::Vector3, PoseInstance};
/// # use gtseg_algorithms::transform::transform_points;
/// let pose = PoseInstance::from_translation("drill", Vector3::new(0.0, 0.0, 1.0));
/// let transformed = transform_points(&[Vector3::new(1.0, 2.0, 3.0)], &pose);
/// assert_eq!(transformed, vec![Vector3::new(1.0, 2.0, 4.0)]);
/// ```
pub fn transform_points(points: &[Vector3<f64>], pose: &PoseInstance) -> Vec<Vector3<f64>> {
    points.iter().map(|point| pose.apply(point)).collect()
}

/// Same as [transform_points] but transforms the points in parallel
pub fn transform_points_par(points: &[Vector3<f64>], pose: &PoseInstance) -> Vec<Vector3<f64>> {
    points.par_iter().map(|point| pose.apply(point)).collect()
}

/// Places the surface points of `model` into scene coordinates according to `pose`
pub fn transform_model(model: &ModelEntry, pose: &PoseInstance) -> Vec<Vector3<f64>> {
    transform_points(&model.surface_points, pose)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use gtseg_core::nalgebra::Rotation3;

    fn sample_points() -> Vec<Vector3<f64>> {
        (0..50)
            .map(|i| {
                let i = i as f64;
                Vector3::new(i * 0.1, (i * 0.37).sin(), -i * 0.05)
            })
            .collect()
    }

    #[test]
    fn test_identity_leaves_points_unchanged() {
        let points = sample_points();
        let transformed = transform_points(&points, &PoseInstance::identity("drill"));
        assert_eq!(points.len(), transformed.len());
        for (original, moved) in points.iter().zip(transformed.iter()) {
            assert_approx_eq!(original.x, moved.x);
            assert_approx_eq!(original.y, moved.y);
            assert_approx_eq!(original.z, moved.z);
        }
    }

    #[test]
    fn test_rigid_transform_preserves_distances() {
        let points = sample_points();
        let rotation = Rotation3::from_euler_angles(0.4, -0.8, 1.9).into_inner();
        let pose = PoseInstance::new("drill", rotation, Vector3::new(3.0, -1.0, 0.5)).unwrap();
        let transformed = transform_points(&points, &pose);

        for i in 1..points.len() {
            let before = (points[i] - points[i - 1]).norm();
            let after = (transformed[i] - transformed[i - 1]).norm();
            assert_approx_eq!(before, after, 1e-9);
        }
        assert_eq!(transformed, transform_points_par(&points, &pose));
    }

    #[test]
    fn test_non_finite_points_stay_non_finite() {
        let points = vec![Vector3::new(f64::NAN, 0.0, 0.0)];
        let pose = PoseInstance::from_translation("drill", Vector3::new(1.0, 1.0, 1.0));
        let transformed = transform_points(&points, &pose);
        assert!(transformed[0].x.is_nan());
    }

    #[test]
    fn test_transform_model() {
        let model = ModelEntry::new("drill", vec![Vector3::new(1.0, 0.0, 0.0)]);
        let pose = PoseInstance::from_translation("drill", Vector3::new(0.0, 2.0, 0.0));
        assert_eq!(
            transform_model(&model, &pose),
            vec![Vector3::new(1.0, 2.0, 0.0)]
        );
    }
}
