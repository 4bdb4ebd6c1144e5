//! Overlay configuration.
//!
//! A [`Context`] is created once per overlay and read by the reconciler, the
//! asset loader and the tracking flow. Every field has a default, so a host
//! only sets what differs, either in code or from a JSON document.

use instant::Duration;
use serde::Deserialize;

use crate::marks::sizing::{RenderMode, SizingPolicy};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Context {
    /// Draw a position-history polyline behind every mark.
    pub show_trails: bool,
    /// Show the annotation rows built from `persistent_data`.
    pub show_telemetry: bool,
    pub render_mode: RenderMode,
    /// Pixels per meter (flat markers only).
    pub scene_scale: f32,
    /// Canvas height in pixels (flat markers only).
    pub scene_y_max: f32,
    /// Base URL of the REST API serving the asset list.
    pub rest_url: String,
    pub auth_token: Option<String>,
    pub request_timeout_ms: u64,
    pub sizing: SizingPolicy,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            show_trails: false,
            show_telemetry: false,
            render_mode: RenderMode::default(),
            scene_scale: 1.0,
            scene_y_max: 0.0,
            rest_url: "/api/v1/".to_string(),
            auth_token: None,
            request_timeout_ms: 5000,
            sizing: SizingPolicy::default(),
        }
    }
}

impl Context {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let ctx: Context = serde_json::from_str(json)?;
        if ctx.render_mode == RenderMode::FlatMarker && ctx.scene_scale <= 0.0 {
            anyhow::bail!(
                "flat markers need a positive scene_scale, got {}",
                ctx.scene_scale
            );
        }
        Ok(ctx)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let ctx = Context::from_json(
            r#"{"show_trails": true, "render_mode": "flat_marker", "scene_scale": 50, "sizing": {"multipliers": {"forklift": 2.0}}}"#,
        )
        .unwrap();
        assert!(ctx.show_trails);
        assert_eq!(ctx.render_mode, RenderMode::FlatMarker);
        assert_eq!(ctx.request_timeout_ms, 5000);
        assert_eq!(ctx.sizing.multiplier("forklift"), 2.0);
        // a partial sizing table replaces the multipliers but keeps the default
        assert_eq!(ctx.sizing.multiplier("person"), 0.5);
    }

    #[test]
    fn flat_markers_need_a_scale() {
        assert!(Context::from_json(r#"{"render_mode": "flat_marker", "scene_scale": 0}"#).is_err());
    }
}
