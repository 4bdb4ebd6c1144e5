//! Live tracked-object marks.
//!
//! - `tracked` holds the inbound snapshot types
//! - `reconciler` keeps the live marks in sync with each snapshot
//! - `registry` is the id to mark table owned by the reconciler
//! - `sizing` contains render modes, placement and marker sizing policy
//! - `trail` manages optional position-history polylines

pub mod reconciler;
pub mod registry;
pub mod sizing;
pub mod tracked;
pub mod trail;

pub use reconciler::{MarkOptions, ReconcileReport, Reconciler};
pub use registry::{Mark, MarkRegistry};
pub use sizing::{RenderMode, SizingPolicy};
pub use tracked::{ObjectId, TrackedObject, UpdateMessage};

/// Errors of a single reconcile pass. They abort that pass only.
#[derive(Debug, thiserror::Error)]
pub enum MarkError {
    #[error("tracked object {id} has no translation")]
    MissingTranslation { id: String },
    #[error("tracked object {id} has a translation with {len} components, expected 2 or 3")]
    InvalidTranslation { id: String, len: usize },
    #[error("could not decode tracking update: {0}")]
    Decode(#[from] serde_json::Error),
}
