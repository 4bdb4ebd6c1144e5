use std::collections::HashMap;

use crate::data_structures::{
    color::Color,
    scene_graph::{SceneAdapter, VisualId},
    template::Template,
};

/// Position history polylines, one group visual per tracked object.
#[derive(Clone, Debug, Default)]
pub struct Trails {
    groups: HashMap<String, VisualId>,
}

impl Trails {
    pub fn get(&self, id: &str) -> Option<VisualId> {
        self.groups.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub(crate) fn create<A: SceneAdapter + ?Sized>(
        &mut self,
        scene: &mut A,
        id: &str,
        category: &str,
    ) -> VisualId {
        if let Some(previous) = self.groups.remove(id) {
            scene.remove_visual(previous);
        }
        let visual = scene.add_visual(Template::group(format!("trail_{id}")), category);
        self.groups.insert(id.to_string(), visual);
        visual
    }

    pub(crate) fn remove<A: SceneAdapter + ?Sized>(&mut self, scene: &mut A, id: &str) {
        if let Some(visual) = self.groups.remove(id) {
            scene.remove_visual(visual);
        }
    }

    /// Appends one segment. Objects without a trail group are skipped.
    pub(crate) fn extend<A: SceneAdapter + ?Sized>(
        &self,
        scene: &mut A,
        id: &str,
        from: cgmath::Vector3<f32>,
        to: cgmath::Vector3<f32>,
        color: Color,
    ) {
        if let Some(visual) = self.groups.get(id) {
            scene.add_segment(*visual, from, to, color);
        }
    }

    pub(crate) fn clear<A: SceneAdapter + ?Sized>(&mut self, scene: &mut A) {
        for (_, visual) in self.groups.drain() {
            scene.remove_visual(visual);
        }
    }
}
