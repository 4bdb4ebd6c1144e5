#![allow(dead_code)]

use flow_marks::{
    cgmath::Vector3,
    data_structures::{
        color::Color,
        geometry_cache::GeometryCache,
        scene_graph::{SceneGraph, SceneNode},
        template::Template,
    },
    marks::{MarkOptions, ReconcileReport, Reconciler, TrackedObject},
};

pub(crate) const PERSON_COLOR: Color = Color::rgb(0x20, 0x40, 0xff);
pub(crate) const VEHICLE_COLOR: Color = Color::rgb(0xff, 0x40, 0x20);

/// Cache with `person` and `vehicle` boxes next to the unknown fallback.
pub(crate) fn cache() -> GeometryCache {
    let mut cache = GeometryCache::new();
    cache.insert("person", Template::default_box("person", PERSON_COLOR, 1.8));
    cache.insert("vehicle", Template::default_box("vehicle", VEHICLE_COLOR, 1.5));
    cache
}

pub(crate) fn object(id: &str, category: &str, translation: &[f32]) -> TrackedObject {
    TrackedObject::new(id, category, translation)
}

/// Scene, cache and reconciler of one overlay under test.
pub(crate) struct Overlay {
    pub scene: SceneGraph,
    pub cache: GeometryCache,
    pub reconciler: Reconciler,
}

impl Overlay {
    pub fn new(options: MarkOptions) -> Self {
        Self {
            scene: SceneGraph::new(),
            cache: cache(),
            reconciler: Reconciler::with_options(options),
        }
    }

    pub fn apply(&mut self, objects: &[TrackedObject]) -> ReconcileReport {
        self.reconciler
            .reconcile(&mut self.scene, &self.cache, objects)
            .expect("snapshot should reconcile")
    }

    pub fn node(&self, id: &str) -> &SceneNode {
        let mark = self
            .reconciler
            .mark(id)
            .unwrap_or_else(|| panic!("no mark for {id}"));
        self.scene
            .get(mark.visual)
            .unwrap_or_else(|| panic!("mark {id} is not in the scene"))
    }

    pub fn template_name(&self, id: &str) -> &str {
        &self.node(id).template.name
    }

    pub fn position(&self, id: &str) -> Vector3<f32> {
        self.node(id).local.position
    }

    pub fn scale(&self, id: &str) -> Vector3<f32> {
        self.node(id).local.scale
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new(MarkOptions::default())
    }
}

pub(crate) fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
    (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5 && (a.z - b.z).abs() < 1e-5
}
