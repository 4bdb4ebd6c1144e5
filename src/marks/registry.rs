use std::collections::HashMap;

use crate::data_structures::{color::Color, scene_graph::VisualId};

/// A tracked object's visual as owned by the reconciler.
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    pub visual: VisualId,
    /// Category at creation time. A different incoming category recreates the mark.
    pub category: String,
    pub color: Color,
}

/// Live marks keyed by object id (string form). One entry per visible
/// tracked object.
#[derive(Clone, Debug, Default)]
pub struct MarkRegistry {
    marks: HashMap<String, Mark>,
}

impl MarkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Mark> {
        self.marks.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.marks.contains_key(id)
    }

    pub(crate) fn insert(&mut self, id: String, mark: Mark) -> Option<Mark> {
        self.marks.insert(id, mark)
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Mark> {
        self.marks.remove(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.marks.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Mark)> {
        self.marks.iter()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}
