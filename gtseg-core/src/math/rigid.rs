use anyhow::{bail, Result};
use nalgebra::{Matrix3, Quaternion, UnitQuaternion, Vector3};

/// Maximum deviation of `R^T * R` from the identity (per entry) that is still accepted as a rotation
pub const ORTHONORMALITY_TOLERANCE: f64 = 1e-3;

/// Returns `Ok(())` if `rotation` is orthonormal with a positive determinant, within [`ORTHONORMALITY_TOLERANCE`]
pub fn check_rotation(rotation: &Matrix3<f64>) -> Result<()> {
    if rotation.iter().any(|v| !v.is_finite()) {
        bail!("Rotation matrix contains non-finite entries: {}", rotation);
    }
    let deviation = rotation.transpose() * rotation - Matrix3::identity();
    if deviation.amax() > ORTHONORMALITY_TOLERANCE {
        bail!("Rotation matrix is not orthonormal: {}", rotation);
    }
    if rotation.determinant() <= 0.0 {
        bail!("Rotation matrix is a reflection: {}", rotation);
    }
    Ok(())
}

/// Converts the quaternion `(w, x, y, z)` into a rotation matrix. The quaternion is normalized first, a
/// zero-length quaternion is an error
pub fn rotation_from_quaternion(w: f64, x: f64, y: f64, z: f64) -> Result<Matrix3<f64>> {
    let quaternion = Quaternion::new(w, x, y, z);
    let norm = quaternion.norm();
    if !norm.is_finite() || norm < f64::EPSILON {
        bail!("Quaternion ({}, {}, {}, {}) can't be normalized", w, x, y, z);
    }
    let unit = UnitQuaternion::from_quaternion(quaternion);
    Ok(unit.to_rotation_matrix().into_inner())
}

/// Applies `rotation * point + translation`
#[inline]
pub fn transform_position(
    rotation: &Matrix3<f64>,
    translation: &Vector3<f64>,
    point: &Vector3<f64>,
) -> Vector3<f64> {
    rotation * point + translation
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use nalgebra::Rotation3;

    #[test]
    fn test_check_rotation() {
        let rotation = Rotation3::from_euler_angles(0.3, -1.2, 2.0).into_inner();
        assert!(check_rotation(&rotation).is_ok());
        assert!(check_rotation(&Matrix3::identity()).is_ok());

        let scaled = rotation * 2.0;
        assert!(check_rotation(&scaled).is_err());

        let mirror = Matrix3::new(-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);
        assert!(check_rotation(&mirror).is_err());

        let mut broken = Matrix3::identity();
        broken[(1, 1)] = f64::NAN;
        assert!(check_rotation(&broken).is_err());
    }

    #[test]
    fn test_rotation_from_quaternion() {
        // 90 degrees around z
        let half = std::f64::consts::FRAC_PI_4;
        let rotation = rotation_from_quaternion(half.cos(), 0.0, 0.0, half.sin()).unwrap();
        let rotated = rotation * Vector3::new(1.0, 0.0, 0.0);
        assert_approx_eq!(rotated.x, 0.0);
        assert_approx_eq!(rotated.y, 1.0);
        assert_approx_eq!(rotated.z, 0.0);

        // non-unit quaternions are normalized
        let scaled = rotation_from_quaternion(2.0, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(scaled, Matrix3::identity());

        assert!(rotation_from_quaternion(0.0, 0.0, 0.0, 0.0).is_err());
    }
}
