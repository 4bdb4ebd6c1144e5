//! Snapshot reconciliation of tracked objects against live marks.
//!
//! Each tracking update is a full snapshot: every id that is missing from it
//! is gone. [`Reconciler::reconcile`] removes those marks, recreates marks
//! whose category changed, creates marks for new ids and moves everything
//! else. All scene changes go through the [`SceneAdapter`] in that order.

use std::collections::HashSet;

use crate::{
    context::Context,
    data_structures::{
        annotation::flatten_persistent_data,
        color::Color,
        geometry_cache::GeometryCache,
        instance::Instance,
        scene_graph::SceneAdapter,
        template::Template,
    },
    marks::{
        MarkError,
        registry::{Mark, MarkRegistry},
        sizing::{RenderMode, SizingPolicy, meters_to_pixels},
        tracked::TrackedObject,
        trail::Trails,
    },
};

const APRILTAG_CATEGORY: &str = "apriltag";

#[derive(Clone, Debug, PartialEq)]
pub struct MarkOptions {
    pub show_trails: bool,
    pub show_telemetry: bool,
    pub render_mode: RenderMode,
    /// Pixels per meter, used by flat markers.
    pub scene_scale: f32,
    /// Canvas height in pixels, used to flip the y axis of flat markers.
    pub scene_y_max: f32,
    pub sizing: SizingPolicy,
}

impl Default for MarkOptions {
    fn default() -> Self {
        Self::from(&Context::default())
    }
}

impl From<&Context> for MarkOptions {
    fn from(ctx: &Context) -> Self {
        Self {
            show_trails: ctx.show_trails,
            show_telemetry: ctx.show_telemetry,
            render_mode: ctx.render_mode,
            scene_scale: ctx.scene_scale,
            scene_y_max: ctx.scene_y_max,
            sizing: ctx.sizing.clone(),
        }
    }
}

/// What a reconcile pass did, by object id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub expired: Vec<String>,
    /// Marks destroyed and recreated because their category changed.
    pub recategorized: Vec<String>,
    pub created: Vec<String>,
    pub updated: Vec<String>,
}

/// Owns the live marks of one overlay and keeps them in sync with snapshots.
#[derive(Debug, Default)]
pub struct Reconciler {
    registry: MarkRegistry,
    trails: Trails,
    options: MarkOptions,
}

impl Reconciler {
    pub fn new(ctx: &Context) -> Self {
        Self::with_options(MarkOptions::from(ctx))
    }

    pub fn with_options(options: MarkOptions) -> Self {
        Self {
            registry: MarkRegistry::new(),
            trails: Trails::default(),
            options,
        }
    }

    pub fn registry(&self) -> &MarkRegistry {
        &self.registry
    }

    pub fn trails(&self) -> &Trails {
        &self.trails
    }

    pub fn options(&self) -> &MarkOptions {
        &self.options
    }

    pub fn mark(&self, id: &str) -> Option<&Mark> {
        self.registry.get(id)
    }

    /// Applies one snapshot.
    ///
    /// Fails fast on the first object without a usable translation; objects
    /// before it keep their new state and the error is returned to the caller.
    pub fn reconcile<A: SceneAdapter + ?Sized>(
        &mut self,
        scene: &mut A,
        cache: &GeometryCache,
        objects: &[TrackedObject],
    ) -> Result<ReconcileReport, MarkError> {
        let incoming: HashSet<String> = objects.iter().map(|o| o.id.key()).collect();
        let mut expired: Vec<String> = self
            .registry
            .ids()
            .filter(|id| !incoming.contains(*id))
            .cloned()
            .collect();
        expired.sort();

        for id in &expired {
            self.destroy(scene, id);
        }

        let mut report = ReconcileReport {
            expired,
            ..Default::default()
        };

        for object in objects {
            let id = object.id.key();
            let category = object.category();
            let position = match self.options.render_mode {
                RenderMode::Asset3d => object.position()?,
                RenderMode::FlatMarker => meters_to_pixels(
                    object.position()?,
                    self.options.scene_scale,
                    self.options.scene_y_max,
                ),
            };

            let existing = match self.registry.get(&id).cloned() {
                Some(mark) if mark.category != category => {
                    log::debug!(
                        "mark {id} changed category from {} to {category}, recreating",
                        mark.category
                    );
                    self.destroy(scene, &id);
                    report.recategorized.push(id.clone());
                    None
                }
                other => other,
            };

            let (mark, created) = match existing {
                Some(mark) => (mark, false),
                None => (self.create(scene, cache, object, &id), true),
            };

            let previous = scene.transform(mark.visual).unwrap_or_default();
            let next = self.place(previous, object, position);
            scene.set_transform(mark.visual, next);

            if self.options.show_trails && !created {
                self.trails
                    .extend(scene, &id, previous.position, next.position, mark.color);
            }

            self.refresh_annotation(scene, &mark, object);

            if created {
                report.created.push(id);
            } else {
                report.updated.push(id);
            }
        }

        log::trace!(
            "reconciled {} objects: {} created, {} updated, {} expired",
            objects.len(),
            report.created.len(),
            report.updated.len(),
            report.expired.len()
        );
        Ok(report)
    }

    fn create<A: SceneAdapter + ?Sized>(
        &mut self,
        scene: &mut A,
        cache: &GeometryCache,
        object: &TrackedObject,
        id: &str,
    ) -> Mark {
        let category = object.category();
        let color = Color::from_id(id);
        let template = match self.options.render_mode {
            RenderMode::Asset3d => scene.clone_template(cache.template_for(category)),
            RenderMode::FlatMarker => Template::disc(
                category,
                self.options
                    .sizing
                    .radius(category, self.options.scene_scale),
                color,
            ),
        };
        if !cache.contains(category) && self.options.render_mode == RenderMode::Asset3d {
            log::debug!("no template for category {category}, mark {id} uses the fallback");
        }

        let visual = scene.add_visual(template, category);
        if let Some(annotation) = scene.annotation_mut(visual) {
            annotation.title = id.to_string();
            annotation.hidden = !self.options.show_telemetry;
            if category == APRILTAG_CATEGORY {
                annotation.label = object.tag_id.as_ref().map(|tag| match tag {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
            }
        }

        let mark = Mark {
            visual,
            category: category.to_string(),
            color,
        };
        self.registry.insert(id.to_string(), mark.clone());

        if self.options.show_trails {
            self.trails.create(scene, id, category);
        }
        mark
    }

    fn destroy<A: SceneAdapter + ?Sized>(&mut self, scene: &mut A, id: &str) {
        if let Some(mark) = self.registry.remove(id) {
            if !scene.remove_visual(mark.visual) {
                log::warn!("mark {id} was already missing from the scene");
            }
        }
        self.trails.remove(scene, id);
    }

    /// Position always comes from the object. Rotation is kept from the
    /// previous frame unless the object carries one (3D assets only). Scale
    /// is recomputed.
    fn place(
        &self,
        previous: Instance,
        object: &TrackedObject,
        position: cgmath::Vector3<f32>,
    ) -> Instance {
        let mut instance = previous;
        instance.position = position;
        if self.options.render_mode.follows_rotation() {
            if let Some([x, y, z, w]) = object.rotation {
                instance.rotation = cgmath::Quaternion::new(w, x, y, z);
            }
        }
        let placement = self.options.render_mode.placement(object);
        instance.translate_local_z(placement.z_offset);
        instance.scale = placement.scale;
        instance
    }

    fn refresh_annotation<A: SceneAdapter + ?Sized>(
        &self,
        scene: &mut A,
        mark: &Mark,
        object: &TrackedObject,
    ) {
        let Some(data) = &object.persistent_data else {
            return;
        };
        if let Some(annotation) = scene.annotation_mut(mark.visual) {
            for (key, value) in flatten_persistent_data(data) {
                annotation.upsert(&key, value);
            }
            annotation.hidden = !self.options.show_telemetry;
        }
    }

    /// Hides every mark without destroying it.
    pub fn hide_marks<A: SceneAdapter + ?Sized>(&self, scene: &mut A) {
        self.set_marks_visible(scene, false);
    }

    pub fn show_marks<A: SceneAdapter + ?Sized>(&self, scene: &mut A) {
        self.set_marks_visible(scene, true);
    }

    fn set_marks_visible<A: SceneAdapter + ?Sized>(&self, scene: &mut A, visible: bool) {
        for (_, mark) in self.registry.iter() {
            scene.set_visible(mark.visual, visible);
        }
    }

    /// Turning trails off removes every trail; turning them on starts a new
    /// trail for each live mark.
    pub fn set_show_trails<A: SceneAdapter + ?Sized>(&mut self, scene: &mut A, show: bool) {
        if self.options.show_trails == show {
            return;
        }
        self.options.show_trails = show;
        if show {
            for (id, mark) in self.registry.iter() {
                self.trails.create(scene, id, &mark.category);
            }
        } else {
            self.trails.clear(scene);
        }
    }

    pub fn set_show_telemetry<A: SceneAdapter + ?Sized>(&mut self, scene: &mut A, show: bool) {
        self.options.show_telemetry = show;
        for (_, mark) in self.registry.iter() {
            if let Some(annotation) = scene.annotation_mut(mark.visual) {
                annotation.hidden = !show;
            }
        }
    }

    /// Destroys every mark and trail.
    pub fn clear<A: SceneAdapter + ?Sized>(&mut self, scene: &mut A) {
        let ids: Vec<String> = self.registry.ids().cloned().collect();
        for id in ids {
            self.destroy(scene, &id);
        }
        self.trails.clear(scene);
    }
}
