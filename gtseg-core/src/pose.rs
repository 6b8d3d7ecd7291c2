use anyhow::Result;
use nalgebra::{Matrix3, Vector3};

use crate::math::{check_rotation, transform_position};

/// One ground truth placement of an object model within a scene. A scene can hold several instances of
/// the same model, instances are told apart by their position in the pose list
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseInstance {
    pub model_name: String,
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
}

impl PoseInstance {
    /// Creates a new `PoseInstance`. Returns an error if `rotation` is not a proper rotation matrix
    pub fn new<S: Into<String>>(
        model_name: S,
        rotation: Matrix3<f64>,
        translation: Vector3<f64>,
    ) -> Result<Self> {
        check_rotation(&rotation)?;
        Ok(Self {
            model_name: model_name.into(),
            rotation,
            translation,
        })
    }

    /// A pose that leaves model coordinates unchanged
    pub fn identity<S: Into<String>>(model_name: S) -> Self {
        Self::from_translation(model_name, Vector3::zeros())
    }

    /// A pose that only shifts the model by `translation`
    pub fn from_translation<S: Into<String>>(model_name: S, translation: Vector3<f64>) -> Self {
        Self {
            model_name: model_name.into(),
            rotation: Matrix3::identity(),
            translation,
        }
    }

    /// Maps `point` from model coordinates into scene coordinates
    pub fn apply(&self, point: &Vector3<f64>) -> Vector3<f64> {
        transform_position(&self.rotation, &self.translation, point)
    }
}
