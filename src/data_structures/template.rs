//! Prototype visuals that marks are cloned from.

use crate::data_structures::{color::Color, instance::Instance};

/// A node of a loaded model. Mirrors the node hierarchy of the source asset
/// with each node's local transform.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateNode {
    pub name: String,
    pub mesh: Option<String>,
    pub local: Instance,
    pub children: Vec<TemplateNode>,
}

impl TemplateNode {
    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TemplateNode::count).sum::<usize>()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TemplateKind {
    /// Unit box used for categories without a model. `depth` is the nominal
    /// height configured for the category.
    Box { color: Color, depth: f32 },
    /// Flat circular marker.
    Disc { radius: f32, color: Color },
    /// Loaded 3D model.
    Model(Vec<TemplateNode>),
    /// Empty container, e.g. the polyline group of a trail.
    Group,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    pub name: String,
    pub kind: TemplateKind,
    /// Offset applied between the mark's transform and the template geometry.
    pub root: Instance,
}

impl Template {
    pub fn default_box(name: impl Into<String>, color: Color, depth: f32) -> Self {
        Self {
            name: name.into(),
            kind: TemplateKind::Box { color, depth },
            root: Instance::default(),
        }
    }

    pub fn disc(name: impl Into<String>, radius: f32, color: Color) -> Self {
        Self {
            name: name.into(),
            kind: TemplateKind::Disc { radius, color },
            root: Instance::default(),
        }
    }

    pub fn model(name: impl Into<String>, nodes: Vec<TemplateNode>, root: Instance) -> Self {
        Self {
            name: name.into(),
            kind: TemplateKind::Model(nodes),
            root,
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TemplateKind::Group,
            root: Instance::default(),
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self.kind {
            TemplateKind::Box { color, .. } | TemplateKind::Disc { color, .. } => Some(color),
            TemplateKind::Model(_) | TemplateKind::Group => None,
        }
    }
}
