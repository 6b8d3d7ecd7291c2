/// Default radius within which a scene point picks up the label of a transformed model point
pub const DEFAULT_MATCH_RADIUS: f64 = 0.01;
/// Default distance within which a segment point counts as matching its nearest ground truth point
pub const DEFAULT_MATCH_DISTANCE: f64 = 0.001;
/// Default fraction of majority votes a segment needs (strictly more than) to count as pure
pub const DEFAULT_PURITY_THRESHOLD: f64 = 0.9;

/// Parameters of the ground truth label propagation
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropagationParams {
    /// Search radius around every transformed model point. Scene points within this radius (inclusive)
    /// are candidates for the model's label
    pub match_radius: f64,
}

impl Default for PropagationParams {
    fn default() -> Self {
        Self {
            match_radius: DEFAULT_MATCH_RADIUS,
        }
    }
}

/// Parameters of the segment purity evaluation and segment labeling
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationParams {
    pub match_distance: f64,
    pub purity_threshold: f64,
}

impl EvaluationParams {
    /// Squared `match_distance`, which is what nearest neighbour distances are compared against
    pub fn squared_match_distance(&self) -> f64 {
        self.match_distance * self.match_distance
    }
}

impl Default for EvaluationParams {
    fn default() -> Self {
        Self {
            match_distance: DEFAULT_MATCH_DISTANCE,
            purity_threshold: DEFAULT_PURITY_THRESHOLD,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_params_serde() {
        let params = EvaluationParams {
            match_distance: 0.002,
            purity_threshold: 0.75,
        };
        let json = serde_json::to_string(&params).unwrap();
        let parsed: EvaluationParams = serde_json::from_str(&json).unwrap();
        assert_eq!(params, parsed);
    }
}
