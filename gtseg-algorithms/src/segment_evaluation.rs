use gtseg_core::{params::EvaluationParams, ClassId, LabeledCloud, Segment, BACKGROUND};
use log::debug;
use rayon::prelude::*;

use crate::spatial_index::SpatialIndex;
use crate::vote_tally::VoteTally;

/// Outcome of a segment purity evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentPurity {
    /// Number of segments whose majority label covers more than the purity threshold of their points
    pub pure_segments: usize,
    /// Number of non-empty segments that were evaluated
    pub scored_segments: usize,
}

impl SegmentPurity {
    /// Fraction of evaluated segments that are pure. If no segment was evaluated (no segments, only empty
    /// segments or an empty ground truth cloud) the score is `0.0`. Use `scored_segments` to tell this case
    /// apart from a segmentation without any pure segment
    pub fn score(&self) -> f64 {
        if self.scored_segments == 0 {
            return 0.0;
        }
        self.pure_segments as f64 / self.scored_segments as f64
    }
}

/// Every point of `segment` votes for the label of its nearest ground truth point if that point is within the
/// match distance, and for `BACKGROUND` otherwise
fn tally_segment(
    index: &SpatialIndex,
    ground_truth: &LabeledCloud,
    segment: &Segment,
    squared_match_distance: f64,
) -> VoteTally {
    let mut tally = VoteTally::new();
    for point in segment.points() {
        let label = match index.nearest(point) {
            Some(neighbor) if neighbor.squared_distance <= squared_match_distance => {
                ground_truth.label_at(neighbor.index)
            }
            _ => BACKGROUND,
        };
        tally.vote(label);
    }
    tally
}

fn is_pure(tally: &VoteTally, segment: &Segment, purity_threshold: f64) -> bool {
    tally.max_count() as f64 / segment.len() as f64 > purity_threshold
}

/// Evaluates how well the given `segments` agree with the `ground_truth` labeling. Empty segments are skipped.
/// A non-empty segment is pure if strictly more than `params.purity_threshold` of its points vote for the same
/// label (see [label_segments_with_params] for how points vote). If `ground_truth` is empty, no segment is
/// evaluated.
///
/// # Examples
///
/// ```
/// # use gtseg_core::{nalgebra::Vector3, params::EvaluationParams, LabeledCloud, Segment};
/// # use gtseg_algorithms::segment_evaluation::evaluate_segment_purity;
/// let positions = (0..10).map(|i| Vector3::new(i as f64, 0.0, 0.0)).collect::<Vec<_>>();
/// let ground_truth = LabeledCloud::new(positions.clone(), vec![3; 10]).unwrap();
/// let segments = vec![Segment::from(positions), Segment::new()];
/// let purity = evaluate_segment_purity(&ground_truth, &segments, &EvaluationParams::default());
/// assert_eq!(purity.pure_segments, 1);
/// assert_eq!(purity.scored_segments, 1);
/// assert_eq!(purity.score(), 1.0);
/// ```
pub fn evaluate_segment_purity(
    ground_truth: &LabeledCloud,
    segments: &[Segment],
    params: &EvaluationParams,
) -> SegmentPurity {
    if ground_truth.is_empty() {
        return SegmentPurity::default();
    }
    let index = SpatialIndex::build(ground_truth.positions());
    let squared_match_distance = params.squared_match_distance();

    let mut purity = SegmentPurity::default();
    for segment in segments.iter().filter(|segment| !segment.is_empty()) {
        let tally = tally_segment(&index, ground_truth, segment, squared_match_distance);
        if is_pure(&tally, segment, params.purity_threshold) {
            purity.pure_segments += 1;
        }
        purity.scored_segments += 1;
    }
    debug!(
        "{} of {} segments are pure",
        purity.pure_segments, purity.scored_segments
    );
    purity
}

/// Same as [evaluate_segment_purity], but evaluates the segments in parallel
pub fn evaluate_segment_purity_par(
    ground_truth: &LabeledCloud,
    segments: &[Segment],
    params: &EvaluationParams,
) -> SegmentPurity {
    if ground_truth.is_empty() {
        return SegmentPurity::default();
    }
    let index = SpatialIndex::build(ground_truth.positions());
    let squared_match_distance = params.squared_match_distance();

    let verdicts = segments
        .par_iter()
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let tally = tally_segment(&index, ground_truth, segment, squared_match_distance);
            is_pure(&tally, segment, params.purity_threshold)
        })
        .collect::<Vec<_>>();
    SegmentPurity {
        pure_segments: verdicts.iter().filter(|pure| **pure).count(),
        scored_segments: verdicts.len(),
    }
}

/// Fraction of non-empty `segments` that are pure with respect to `ground_truth`, using the default
/// [EvaluationParams]. Returns `0.0` if `ground_truth` is empty or there is no non-empty segment
pub fn score_segment_purity(ground_truth: &LabeledCloud, segments: &[Segment]) -> f64 {
    score_segment_purity_with_params(ground_truth, segments, &EvaluationParams::default())
}

pub fn score_segment_purity_with_params(
    ground_truth: &LabeledCloud,
    segments: &[Segment],
    params: &EvaluationParams,
) -> f64 {
    evaluate_segment_purity(ground_truth, segments, params).score()
}

pub fn score_segment_purity_par(
    ground_truth: &LabeledCloud,
    segments: &[Segment],
    params: &EvaluationParams,
) -> f64 {
    evaluate_segment_purity_par(ground_truth, segments, params).score()
}

/// Dominant ground truth label of every segment, using the default [EvaluationParams]. See [label_segments_with_params]
pub fn label_segments(ground_truth: &LabeledCloud, segments: &[Segment]) -> Vec<ClassId> {
    label_segments_with_params(ground_truth, segments, &EvaluationParams::default())
}

/// Returns the dominant ground truth label of every segment, in segment order. Every point of a segment votes
/// for the label of its nearest point in `ground_truth` if that point is at most `params.match_distance` away,
/// and for `BACKGROUND` otherwise. The label with the most votes wins; on equal vote counts the label that
/// reached the count first wins. Empty segments, and all segments if `ground_truth` is empty, get `BACKGROUND`.
///
/// # Examples
///
/// ```
/// # use gtseg_core::{nalgebra::Vector3, params::EvaluationParams, LabeledCloud, Segment, BACKGROUND};
/// # use gtseg_algorithms::segment_evaluation::label_segments_with_params;
/// let ground_truth = LabeledCloud::new(
///     vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)],
///     vec![4, 9],
/// ).unwrap();
/// let segments = vec![
///     Segment::from(vec![Vector3::new(1.0, 0.0, 0.0)]),
///     Segment::new(),
///     Segment::from(vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(5.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0)]),
/// ];
/// let labels = label_segments_with_params(&ground_truth, &segments, &EvaluationParams::default());
/// assert_eq!(labels, vec![9, BACKGROUND, 4]);
/// ```
pub fn label_segments_with_params(
    ground_truth: &LabeledCloud,
    segments: &[Segment],
    params: &EvaluationParams,
) -> Vec<ClassId> {
    if ground_truth.is_empty() {
        return vec![BACKGROUND; segments.len()];
    }
    let index = SpatialIndex::build(ground_truth.positions());
    let squared_match_distance = params.squared_match_distance();
    segments
        .iter()
        .map(|segment| {
            tally_segment(&index, ground_truth, segment, squared_match_distance)
                .winner_or_background()
        })
        .collect()
}

/// Same as [label_segments_with_params], but labels the segments in parallel
pub fn label_segments_par(
    ground_truth: &LabeledCloud,
    segments: &[Segment],
    params: &EvaluationParams,
) -> Vec<ClassId> {
    if ground_truth.is_empty() {
        return vec![BACKGROUND; segments.len()];
    }
    let index = SpatialIndex::build(ground_truth.positions());
    let squared_match_distance = params.squared_match_distance();
    segments
        .par_iter()
        .map(|segment| {
            tally_segment(&index, ground_truth, segment, squared_match_distance)
                .winner_or_background()
        })
        .collect()
}
