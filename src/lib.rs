//! flow-marks
//!
//! Live tracked-object markers for retained 3D and flat scenes, on native and
//! WASM. A tracker publishes full snapshots of the objects it sees; this
//! crate keeps one visual ("mark") per object in a scene, creating, moving
//! and removing marks as snapshots arrive. Marks are cloned from per-category
//! templates loaded from an asset library.
//!
//! High-level modules
//! - `context`: overlay configuration
//! - `data_structures`: transforms, templates, the geometry cache and the scene graph
//! - `flow`: the event-driven driver that feeds snapshots to the reconciler
//! - `marks`: tracked objects, the reconciler and its sizing policies
//! - `resources`: asset library access and model template loading
//!

pub mod context;
pub mod data_structures;
pub mod flow;
pub mod marks;
pub mod resources;

pub use cgmath;
pub use context::Context;
pub use data_structures::scene_graph::{SceneAdapter, SceneGraph, VisualId};
pub use flow::{FlowEvent, TrackingFlow, init_logging};
pub use marks::{MarkError, Reconciler, TrackedObject, UpdateMessage};
