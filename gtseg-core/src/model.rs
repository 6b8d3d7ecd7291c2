use std::iter::FromIterator;

use nalgebra::Vector3;

/// Surface sample points of a single object model, in model coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEntry {
    pub name: String,
    pub surface_points: Vec<Vector3<f64>>,
}

impl ModelEntry {
    pub fn new<S: Into<String>>(name: S, surface_points: Vec<Vector3<f64>>) -> Self {
        Self {
            name: name.into(),
            surface_points,
        }
    }
}

/// All object models known to a run. Loaded once and only read afterwards
#[derive(Debug, Clone, Default)]
pub struct ModelLibrary {
    models: Vec<ModelEntry>,
}

impl ModelLibrary {
    pub fn new(models: Vec<ModelEntry>) -> Self {
        Self { models }
    }

    /// Returns the first model with the given `name`
    pub fn get(&self, name: &str) -> Option<&ModelEntry> {
        self.models.iter().find(|model| model.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of all models in library order
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.models.iter().map(|model| model.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModelEntry> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl FromIterator<ModelEntry> for ModelLibrary {
    fn from_iter<I: IntoIterator<Item = ModelEntry>>(iter: I) -> Self {
        Self {
            models: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ModelLibrary {
    type Item = &'a ModelEntry;
    type IntoIter = std::slice::Iter<'a, ModelEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}
