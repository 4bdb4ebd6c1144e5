//! Per-category library of mark templates.

use std::collections::HashMap;

use crate::data_structures::{color::Color, template::Template};

/// Category whose template is used for everything the cache does not know.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Maps category names to the template new marks of that category are cloned
/// from. The [`UNKNOWN_CATEGORY`] entry always exists.
#[derive(Clone, Debug)]
pub struct GeometryCache {
    unknown: Template,
    templates: HashMap<String, Template>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self {
            unknown: Template::default_box(UNKNOWN_CATEGORY, Color::GREEN, 1.0),
            templates: HashMap::new(),
        }
    }

    /// Adds or replaces the template of `category`. Returns the previous one.
    pub fn insert(&mut self, category: impl Into<String>, template: Template) -> Option<Template> {
        let category = category.into();
        log::debug!("caching template for category {category}");
        if category == UNKNOWN_CATEGORY {
            return Some(std::mem::replace(&mut self.unknown, template));
        }
        self.templates.insert(category, template)
    }

    pub fn get(&self, category: &str) -> Option<&Template> {
        if category == UNKNOWN_CATEGORY {
            return Some(&self.unknown);
        }
        self.templates.get(category)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.get(category).is_some()
    }

    /// The template for `category`, or the unknown template. Never fails.
    pub fn template_for(&self, category: &str) -> &Template {
        self.templates.get(category).unwrap_or(&self.unknown)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        std::iter::once(UNKNOWN_CATEGORY).chain(self.templates.keys().map(String::as_str))
    }

    /// Number of cached categories, the unknown fallback included.
    pub fn len(&self) -> usize {
        self.templates.len() + 1
    }
}

impl Default for GeometryCache {
    fn default() -> Self {
        Self::new()
    }
}
