use anyhow::{anyhow, bail, Result};
use gtseg_core::{
    math::AABB,
    nalgebra::{Point3, Vector3},
    params::PropagationParams,
    ClassId, LabelMap, LabeledCloud, ModelEntry, ModelLibrary, PoseInstance, BACKGROUND,
};
use log::debug;
use rayon::prelude::*;

use crate::bounds::calculate_bounds;
use crate::spatial_index::SpatialIndex;
use crate::transform::transform_model;

/// Best label candidate found so far for a single scene point
#[derive(Debug, Clone, Copy, PartialEq)]
struct Assignment {
    class_id: ClassId,
    squared_distance: f64,
}

impl Assignment {
    /// `candidate` replaces `current` only if it is strictly closer
    fn improves(candidate: &Assignment, current: &Option<Assignment>) -> bool {
        match current {
            None => true,
            Some(current) => candidate.squared_distance < current.squared_distance,
        }
    }
}

/// A pose instance together with the model and class id it refers to
struct ResolvedInstance<'a> {
    pose: &'a PoseInstance,
    model: &'a ModelEntry,
    class_id: ClassId,
}

/// Looks up model and class id of every pose instance. Fails on the first instance whose model is unknown to
/// `models` or `label_map`, as this means the pose data and the class dictionary don't belong together
fn resolve_instances<'a>(
    poses: &'a [PoseInstance],
    models: &'a ModelLibrary,
    label_map: &LabelMap,
) -> Result<Vec<ResolvedInstance<'a>>> {
    poses
        .iter()
        .enumerate()
        .map(|(instance, pose)| {
            let class_id = match label_map.class_id(&pose.model_name) {
                Some(class_id) if class_id != BACKGROUND => class_id,
                Some(class_id) => bail!(
                    "Pose instance {} refers to model '{}' whose class id {} is reserved for background",
                    instance,
                    pose.model_name,
                    class_id
                ),
                None => bail!(
                    "Pose instance {} refers to model '{}' which has no class id",
                    instance,
                    pose.model_name
                ),
            };
            let model = models.get(&pose.model_name).ok_or_else(|| {
                anyhow!(
                    "Pose instance {} refers to model '{}' which is not in the model library",
                    instance,
                    pose.model_name
                )
            })?;
            Ok(ResolvedInstance {
                pose,
                model,
                class_id,
            })
        })
        .collect()
}

/// Offers the class id of `instance` to all scene points within `match_radius` of one of its transformed model
/// points. Transformed points outside of `scene_bounds` can't reach any scene point and are skipped
fn assign_instance(
    instance: &ResolvedInstance,
    index: &SpatialIndex,
    scene_bounds: &AABB<f64>,
    match_radius: f64,
    assignments: &mut [Option<Assignment>],
) {
    let transformed = transform_model(instance.model, instance.pose);
    let mut queried = 0;
    for point in transformed.iter() {
        if !scene_bounds.contains(&Point3::from(*point)) {
            continue;
        }
        queried += 1;
        for neighbor in index.within_radius(point, match_radius) {
            let candidate = Assignment {
                class_id: instance.class_id,
                squared_distance: neighbor.squared_distance,
            };
            let current = &mut assignments[neighbor.index];
            if Assignment::improves(&candidate, current) {
                *current = Some(candidate);
            }
        }
    }
    debug!(
        "Instance of '{}' (class {}): {} of {} model points near the scene",
        instance.pose.model_name,
        instance.class_id,
        queried,
        transformed.len()
    );
}

fn to_labeled_cloud(
    scene: &[Vector3<f64>],
    assignments: Vec<Option<Assignment>>,
) -> Result<LabeledCloud> {
    let labels = assignments
        .into_iter()
        .map(|assignment| assignment.map_or(BACKGROUND, |a| a.class_id))
        .collect();
    LabeledCloud::new(scene.to_vec(), labels)
}

/// Propagates ground truth labels with the default [PropagationParams]. See [propagate_labels_with_params]
pub fn propagate_labels(
    scene: &[Vector3<f64>],
    models: &ModelLibrary,
    poses: &[PoseInstance],
    label_map: &LabelMap,
) -> Result<LabeledCloud> {
    propagate_labels_with_params(scene, models, poses, label_map, &PropagationParams::default())
}

/// Ground truth label propagation
/// Places the model of every pose instance in the scene and labels all scene points within
/// `params.match_radius` of a transformed model point with the class id of that model. If several model points
/// (of the same or of different instances) reach a scene point, the strictly closest one wins; on exactly equal
/// distances the first one in pose order wins. Scene points not reached by any model stay `BACKGROUND`.
///
/// The result has the same points in the same order as `scene`.
///
/// # Errors
///
/// If a pose instance refers to a model that is missing from `models` or has no class id in `label_map`. No
/// labels are computed in this case.
///
/// # Examples
///
/// ```
/// # use gtseg_core::{nalgebra::Vector3, LabelMap, ModelEntry, ModelLibrary, PoseInstance};
/// # use gtseg_algorithms::label_propagation::propagate_labels;
/// let scene = vec![Vector3::new(1.0, 0.0, 0.0), Vector3::new(5.0, 0.0, 0.0)];
/// let models = vec![ModelEntry::new("drill", vec![Vector3::new(0.0, 0.0, 0.0)])]
///     .into_iter()
///     .collect::<ModelLibrary>();
/// let poses = vec![PoseInstance::from_translation("drill", Vector3::new(1.0, 0.0, 0.0))];
/// let label_map = LabelMap::from_names(vec!["drill"]).unwrap();
///
/// let labeled = propagate_labels(&scene, &models, &poses, &label_map).unwrap();
/// assert_eq!(labeled.labels(), &[1, 0]);
///
/// let unknown = vec![PoseInstance::identity("mallet")];
/// assert!(propagate_labels(&scene, &models, &unknown, &label_map).is_err());
/// ```
pub fn propagate_labels_with_params(
    scene: &[Vector3<f64>],
    models: &ModelLibrary,
    poses: &[PoseInstance],
    label_map: &LabelMap,
    params: &PropagationParams,
) -> Result<LabeledCloud> {
    let instances = resolve_instances(poses, models, label_map)?;
    let mut assignments: Vec<Option<Assignment>> = vec![None; scene.len()];

    if let Some(bounds) = calculate_bounds(scene) {
        let index = SpatialIndex::build(scene);
        let reachable = bounds.padded(params.match_radius);
        for instance in &instances {
            assign_instance(
                instance,
                &index,
                &reachable,
                params.match_radius,
                &mut assignments,
            );
        }
    }

    to_labeled_cloud(scene, assignments)
}

/// Same as [propagate_labels_with_params], but processes the pose instances in parallel. The candidates of all
/// instances are merged in pose order, so the result is identical to the serial version
pub fn propagate_labels_par(
    scene: &[Vector3<f64>],
    models: &ModelLibrary,
    poses: &[PoseInstance],
    label_map: &LabelMap,
    params: &PropagationParams,
) -> Result<LabeledCloud> {
    let instances = resolve_instances(poses, models, label_map)?;
    let mut assignments: Vec<Option<Assignment>> = vec![None; scene.len()];

    if let Some(bounds) = calculate_bounds(scene) {
        let index = SpatialIndex::build(scene);
        let reachable = bounds.padded(params.match_radius);
        let per_instance = instances
            .par_iter()
            .map(|instance| {
                let mut local: Vec<Option<Assignment>> = vec![None; scene.len()];
                assign_instance(instance, &index, &reachable, params.match_radius, &mut local);
                local
            })
            .collect::<Vec<_>>();

        for local in per_instance {
            for (current, candidate) in assignments.iter_mut().zip(local.into_iter()) {
                if let Some(candidate) = candidate {
                    if Assignment::improves(&candidate, current) {
                        *current = Some(candidate);
                    }
                }
            }
        }
    }

    to_labeled_cloud(scene, assignments)
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_background_class_id_from_json_is_an_error() {
        let scene = vec![Vector3::zeros()];
        let models = vec![ModelEntry::new("drill", vec![Vector3::zeros()])]
            .into_iter()
            .collect::<ModelLibrary>();
        let poses = vec![PoseInstance::identity("drill")];

        assert!(serde_json::from_str::<LabelMap>(r#"{"drill": 0}"#).is_err());
        let label_map: LabelMap = serde_json::from_str(r#"{"drill": 4}"#).unwrap();
        let labeled = propagate_labels(&scene, &models, &poses, &label_map).unwrap();
        assert_eq!(labeled.labels(), &[4]);
    }
}
