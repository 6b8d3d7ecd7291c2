use criterion::{criterion_group, criterion_main, Criterion};
use gtseg_algorithms::{
    label_propagation::{propagate_labels_par, propagate_labels_with_params},
    segment_evaluation::{evaluate_segment_purity, evaluate_segment_purity_par},
};
use gtseg_core::{
    nalgebra::Vector3,
    params::{EvaluationParams, PropagationParams},
    LabelMap, ModelEntry, ModelLibrary, PoseInstance, Segment,
};
use rand::{distributions::Uniform, thread_rng, Rng};

const NUM_POINTS_SMALL: usize = 1000;
const NUM_POINTS_MEDIUM: usize = 10000;
const NUM_POINTS_BIG: usize = 100000;

const NUM_MODEL_POINTS: usize = 2000;
const SEGMENT_SIZE: usize = 100;

fn random_positions(num_points: usize, extent: f64) -> Vec<Vector3<f64>> {
    let mut rng = thread_rng();
    let range = Uniform::new(-extent, extent);
    (0..num_points)
        .map(|_| Vector3::new(rng.sample(range), rng.sample(range), rng.sample(range)))
        .collect()
}

fn dummy_models() -> (ModelLibrary, LabelMap) {
    let names = vec!["drill", "mallet", "sander"];
    let models = names
        .iter()
        .map(|name| ModelEntry::new(*name, random_positions(NUM_MODEL_POINTS, 0.05)))
        .collect::<ModelLibrary>();
    let label_map = LabelMap::from_names(names).unwrap();
    (models, label_map)
}

fn dummy_poses() -> Vec<PoseInstance> {
    vec![
        PoseInstance::from_translation("drill", Vector3::new(-0.1, 0.0, 0.0)),
        PoseInstance::from_translation("mallet", Vector3::new(0.0, 0.1, 0.0)),
        PoseInstance::from_translation("sander", Vector3::new(0.1, 0.0, 0.05)),
        PoseInstance::from_translation("drill", Vector3::new(0.0, -0.1, -0.05)),
    ]
}

fn bench(c: &mut Criterion) {
    let (models, label_map) = dummy_models();
    let poses = dummy_poses();
    let propagation_params = PropagationParams::default();
    let evaluation_params = EvaluationParams::default();

    for (testname, num_points) in vec![
        ("small", NUM_POINTS_SMALL),
        ("medium", NUM_POINTS_MEDIUM),
        ("big", NUM_POINTS_BIG),
    ] {
        let scene = random_positions(num_points, 0.2);
        let segments = scene
            .chunks(SEGMENT_SIZE)
            .map(|chunk| Segment::from(chunk.to_vec()))
            .collect::<Vec<_>>();

        c.bench_function(&format!("propagate_labels_serial_{}", testname), |b| {
            b.iter(|| {
                propagate_labels_with_params(
                    &scene,
                    &models,
                    &poses,
                    &label_map,
                    &propagation_params,
                )
                .unwrap()
            })
        });
        c.bench_function(&format!("propagate_labels_par_{}", testname), |b| {
            b.iter(|| {
                propagate_labels_par(&scene, &models, &poses, &label_map, &propagation_params)
                    .unwrap()
            })
        });

        let ground_truth = propagate_labels_par(
            &scene,
            &models,
            &poses,
            &label_map,
            &propagation_params,
        )
        .unwrap();
        c.bench_function(&format!("segment_purity_serial_{}", testname), |b| {
            b.iter(|| evaluate_segment_purity(&ground_truth, &segments, &evaluation_params))
        });
        c.bench_function(&format!("segment_purity_par_{}", testname), |b| {
            b.iter(|| evaluate_segment_purity_par(&ground_truth, &segments, &evaluation_params))
        });
    }
}

criterion_group! {
    name = evaluation;
    config = Criterion::default().sample_size(20);
    targets = bench
}
criterion_main!(evaluation);
