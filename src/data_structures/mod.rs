//! Overlay data structures.
//!
//! - `instance` holds the position/rotation/scale transform of a visual
//! - `color` parses and derives mark colors
//! - `template` describes the prototype visuals marks are cloned from
//! - `geometry_cache` maps categories to templates, with an unknown fallback
//! - `annotation` is the per-mark tooltip table
//! - `scene_graph` contains the scene adapter seam and the retained scene

pub mod annotation;
pub mod color;
pub mod geometry_cache;
pub mod instance;
pub mod scene_graph;
pub mod template;
