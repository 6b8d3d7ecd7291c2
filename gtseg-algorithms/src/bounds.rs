use gtseg_core::{
    math::AABB,
    nalgebra::{Point3, Vector3},
};

/// Calculate the bounding box of the given `positions`. Returns `None` if there are no positions. Non-finite
/// coordinates are ignored, so a cloud consisting only of non-finite positions also yields `None`
pub fn calculate_bounds(positions: &[Vector3<f64>]) -> Option<AABB<f64>> {
    let mut finite_positions = positions
        .iter()
        .filter(|pos| pos.x.is_finite() && pos.y.is_finite() && pos.z.is_finite());
    let first = Point3::from(*finite_positions.next()?);
    let bounds = finite_positions.fold(
        AABB::from_min_max_unchecked(first, first),
        |bounds, pos| AABB::extend_with_point(&bounds, &Point3::from(*pos)),
    );
    Some(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_bounds() {
        assert!(calculate_bounds(&[]).is_none());
        assert!(calculate_bounds(&[Vector3::new(f64::NAN, 0.0, 0.0)]).is_none());

        let positions = vec![
            Vector3::new(1.0, 5.0, -2.0),
            Vector3::new(-3.0, 2.0, 0.0),
            Vector3::new(f64::INFINITY, 0.0, 0.0),
            Vector3::new(0.0, 8.0, 4.0),
        ];
        let bounds = calculate_bounds(&positions).unwrap();
        assert_eq!(*bounds.min(), Point3::new(-3.0, 2.0, -2.0));
        assert_eq!(*bounds.max(), Point3::new(1.0, 8.0, 4.0));
    }
}
