//! Scene adapter seam and the retained scene graph behind it.
//!
//! The reconciler never talks to a renderer directly. It goes through
//! [`SceneAdapter`], which a host implements on top of whatever draws the
//! scene. [`SceneGraph`] is the in-memory implementation: it retains every
//! visual with its template, transform, trail segments and annotation, and
//! can compose the world transforms of model nodes for a renderer to consume.

use std::{collections::HashMap, fmt};

use crate::data_structures::{
    annotation::Annotation,
    color::Color,
    instance::Instance,
    template::{Template, TemplateKind, TemplateNode},
};

/// Handle of a visual added to a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualId(pub u32);

impl fmt::Display for VisualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "visual#{}", self.0)
    }
}

/// One straight piece of a trail polyline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: cgmath::Vector3<f32>,
    pub to: cgmath::Vector3<f32>,
    pub color: Color,
}

/// Operations the reconciler performs on a scene.
pub trait SceneAdapter {
    /// Produces an independent copy of a cached template for a new visual.
    fn clone_template(&self, template: &Template) -> Template {
        template.clone()
    }

    /// Adds a top-level visual. `label` is the category the visual stands for,
    /// which may differ from the template name when a fallback was used.
    fn add_visual(&mut self, template: Template, label: &str) -> VisualId;

    /// Removes a visual. Returns `false` if it was not part of the scene.
    fn remove_visual(&mut self, id: VisualId) -> bool;

    fn set_transform(&mut self, id: VisualId, instance: Instance);

    fn transform(&self, id: VisualId) -> Option<Instance>;

    /// Appends a line segment to a visual (used by trail groups).
    fn add_segment(
        &mut self,
        id: VisualId,
        from: cgmath::Vector3<f32>,
        to: cgmath::Vector3<f32>,
        color: Color,
    );

    fn set_visible(&mut self, id: VisualId, visible: bool);

    fn annotation_mut(&mut self, id: VisualId) -> Option<&mut Annotation>;
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub template: Template,
    pub label: String,
    pub local: Instance,
    pub visible: bool,
    pub segments: Vec<Segment>,
    pub annotation: Annotation,
}

impl SceneNode {
    fn new(template: Template, label: &str) -> Self {
        Self {
            template,
            label: label.to_string(),
            local: Instance::default(),
            visible: true,
            segments: Vec::new(),
            annotation: Annotation::default(),
        }
    }

    /// World transforms of every drawable part of this visual, keyed by the
    /// part name. Model nodes are composed parent first.
    pub fn world_transforms(&self) -> Vec<(String, Instance)> {
        let base = &self.local * &self.template.root;
        match &self.template.kind {
            TemplateKind::Model(nodes) => {
                let mut out = Vec::new();
                for node in nodes {
                    collect_world_transforms(node, &base, &mut out);
                }
                out
            }
            TemplateKind::Group => Vec::new(),
            TemplateKind::Box { .. } | TemplateKind::Disc { .. } => {
                vec![(self.template.name.clone(), base)]
            }
        }
    }
}

fn collect_world_transforms(
    node: &TemplateNode,
    parent: &Instance,
    out: &mut Vec<(String, Instance)>,
) {
    let world = parent * &node.local;
    if node.mesh.is_some() {
        out.push((node.name.clone(), world));
    }
    for child in &node.children {
        collect_world_transforms(child, &world, out);
    }
}

/// Retained scene: every visual that is currently part of the overlay.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: HashMap<VisualId, SceneNode>,
    next_id: u32,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: VisualId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: VisualId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Visual ids in creation order.
    pub fn ids(&self) -> Vec<VisualId> {
        let mut ids: Vec<VisualId> = self.nodes.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VisualId, &SceneNode)> {
        self.nodes.iter()
    }
}

impl SceneAdapter for SceneGraph {
    fn add_visual(&mut self, template: Template, label: &str) -> VisualId {
        let id = VisualId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, SceneNode::new(template, label));
        id
    }

    fn remove_visual(&mut self, id: VisualId) -> bool {
        self.nodes.remove(&id).is_some()
    }

    fn set_transform(&mut self, id: VisualId, instance: Instance) {
        match self.nodes.get_mut(&id) {
            Some(node) => node.local = instance,
            None => log::warn!("You tried to transform {id}, which is not part of the scene."),
        }
    }

    fn transform(&self, id: VisualId) -> Option<Instance> {
        self.nodes.get(&id).map(|node| node.local)
    }

    fn add_segment(
        &mut self,
        id: VisualId,
        from: cgmath::Vector3<f32>,
        to: cgmath::Vector3<f32>,
        color: Color,
    ) {
        match self.nodes.get_mut(&id) {
            Some(node) => node.segments.push(Segment { from, to, color }),
            None => log::warn!("You tried to extend {id}, which is not part of the scene."),
        }
    }

    fn set_visible(&mut self, id: VisualId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.visible = visible;
        }
    }

    fn annotation_mut(&mut self, id: VisualId) -> Option<&mut Annotation> {
        self.nodes.get_mut(&id).map(|node| &mut node.annotation)
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Vector3;

    use super::*;

    #[test]
    fn model_parts_compose_with_the_mark_transform() {
        let wheel = TemplateNode {
            name: "wheel".into(),
            mesh: Some("wheel".into()),
            local: Instance::from(Vector3::new(1.0, 0.0, 0.0)),
            children: vec![],
        };
        let body = TemplateNode {
            name: "body".into(),
            mesh: None,
            local: Instance::from(Vector3::new(0.0, 0.0, 1.0)),
            children: vec![wheel],
        };
        let mut scene = SceneGraph::new();
        let id = scene.add_visual(Template::model("car", vec![body], Instance::default()), "car");
        scene.set_transform(id, Instance::from(Vector3::new(5.0, 5.0, 0.0)));

        let parts = scene.get(id).unwrap().world_transforms();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].0, "wheel");
        assert_eq!(parts[0].1.position, Vector3::new(6.0, 5.0, 1.0));
    }

    #[test]
    fn removed_visuals_are_gone() {
        let mut scene = SceneGraph::new();
        let id = scene.add_visual(Template::group("trail_1"), "person");
        assert!(scene.remove_visual(id));
        assert!(!scene.remove_visual(id));
        assert!(scene.is_empty());
    }
}
