use std::collections::HashMap;
use std::convert::TryFrom;

use anyhow::{bail, Result};

use crate::cloud::{ClassId, BACKGROUND};

/// Maps model names to the class ids used as ground truth labels. Class ids are strictly positive,
/// `BACKGROUND` can never be assigned to a model
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "HashMap<String, ClassId>",
        into = "HashMap<String, ClassId>"
    )
)]
pub struct LabelMap {
    classes: HashMap<String, ClassId>,
}

impl LabelMap {
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a `LabelMap` from an ordered enumeration of class names. The first name gets class id 1, the
    /// second class id 2 and so on. Returns an error if a name occurs twice
    ///
    /// ```
    /// # use gtseg_core::LabelMap;
    /// let label_map = LabelMap::from_names(vec!["drill", "mallet"]).unwrap();
    /// assert_eq!(label_map.class_id("drill"), Some(1));
    /// assert_eq!(label_map.class_id("mallet"), Some(2));
    /// assert_eq!(label_map.class_id("sander"), None);
    /// ```
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut label_map = Self::new();
        for (index, name) in names.into_iter().enumerate() {
            label_map.insert(name, index as ClassId + 1)?;
        }
        Ok(label_map)
    }

    /// Assigns `class_id` to the model `name`. Returns an error if `class_id` is `BACKGROUND` or if `name`
    /// already has a class id
    pub fn insert<S: Into<String>>(&mut self, name: S, class_id: ClassId) -> Result<()> {
        let name = name.into();
        if class_id == BACKGROUND {
            bail!(
                "Class id {} is reserved for background and can't be assigned to model '{}'",
                BACKGROUND,
                name
            );
        }
        if let Some(existing) = self.classes.get(&name) {
            bail!(
                "Model '{}' already has class id {}, can't assign {}",
                name,
                existing,
                class_id
            );
        }
        self.classes.insert(name, class_id);
        Ok(())
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.classes.get(name).copied()
    }

    /// Returns the model name for `class_id`, if any
    pub fn name_of(&self, class_id: ClassId) -> Option<&str> {
        self.classes
            .iter()
            .find(|(_, id)| **id == class_id)
            .map(|(name, _)| name.as_str())
    }

    /// Returns true if `class_id` is `BACKGROUND` or assigned to some model
    pub fn is_valid_label(&self, class_id: ClassId) -> bool {
        class_id == BACKGROUND || self.classes.values().any(|id| *id == class_id)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TryFrom<HashMap<String, ClassId>> for LabelMap {
    type Error = anyhow::Error;

    fn try_from(classes: HashMap<String, ClassId>) -> Result<Self> {
        let mut label_map = Self::new();
        for (name, class_id) in classes {
            label_map.insert(name, class_id)?;
        }
        Ok(label_map)
    }
}

impl From<LabelMap> for HashMap<String, ClassId> {
    fn from(label_map: LabelMap) -> Self {
        label_map.classes
    }
}
