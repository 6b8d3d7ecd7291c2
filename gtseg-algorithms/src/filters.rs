use gtseg_core::nalgebra::Vector3;

/// Removes all positions with at least one non-finite coordinate. Returns the remaining positions together
/// with their indices in `positions`
///
/// # Examples
///
/// ```
/// # use gtseg_core::nalgebra::Vector3;
/// # use gtseg_algorithms::filters::remove_non_finite;
/// let positions = vec![
///     Vector3::new(0.0, 0.0, 0.0),
///     Vector3::new(f64::NAN, 1.0, 1.0),
///     Vector3::new(2.0, 2.0, 2.0),
/// ];
/// let (kept, indices) = remove_non_finite(&positions);
/// assert_eq!(kept.len(), 2);
/// assert_eq!(indices, vec![0, 2]);
/// ```
pub fn remove_non_finite(positions: &[Vector3<f64>]) -> (Vec<Vector3<f64>>, Vec<usize>) {
    positions
        .iter()
        .enumerate()
        .filter(|(_, pos)| pos.iter().all(|v| v.is_finite()))
        .map(|(index, pos)| (*pos, index))
        .unzip()
}
