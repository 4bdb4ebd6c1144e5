//! Mark sizing and placement policies.

use std::collections::HashMap;

use serde::Deserialize;

use crate::marks::tracked::TrackedObject;

/// How marks are drawn. 3D assets take their scale from the object and are
/// lifted by half their height so that models modelled around their center
/// stand on the ground plane. Flat markers are pixel-sized discs that only
/// move: object scale, size and rotation do not apply to them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Asset3d,
    FlatMarker,
}

/// Marker radius multipliers per category, applied to the scene scale
/// (pixels per meter) when marks are drawn as flat primitives.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SizingPolicy {
    pub multipliers: HashMap<String, f32>,
    pub default_multiplier: f32,
}

impl Default for SizingPolicy {
    fn default() -> Self {
        let multipliers = [("person", 0.3), ("vehicle", 1.5), ("apriltag", 0.15)]
            .into_iter()
            .map(|(category, multiplier)| (category.to_string(), multiplier))
            .collect();
        Self {
            multipliers,
            default_multiplier: 0.5,
        }
    }
}

impl SizingPolicy {
    pub fn with(mut self, category: &str, multiplier: f32) -> Self {
        self.multipliers.insert(category.to_string(), multiplier);
        self
    }

    pub fn multiplier(&self, category: &str) -> f32 {
        self.multipliers
            .get(category)
            .copied()
            .unwrap_or(self.default_multiplier)
    }

    /// Marker radius in whole pixels.
    pub fn radius(&self, category: &str, scene_scale: f32) -> f32 {
        (scene_scale * self.multiplier(category)).trunc()
    }
}

/// Scale and bottom-anchor offset of one object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub scale: cgmath::Vector3<f32>,
    pub z_offset: f32,
}

impl Placement {
    pub const UNIT: Placement = Placement {
        scale: cgmath::Vector3 {
            x: 1.0,
            y: 1.0,
            z: 1.0,
        },
        z_offset: 0.0,
    };
}

impl RenderMode {
    /// `asset_scale` wins over `size`; with neither the mark keeps unit scale.
    /// Flat markers always keep unit scale.
    pub fn placement(&self, object: &TrackedObject) -> Placement {
        if *self == RenderMode::FlatMarker {
            return Placement::UNIT;
        }
        if let Some(uniform) = object.asset_scale {
            return Placement {
                scale: cgmath::Vector3::new(uniform, uniform, uniform),
                z_offset: 0.0,
            };
        }
        match object.size {
            Some([x, y, z]) => Placement {
                scale: cgmath::Vector3::new(x, y, z),
                z_offset: z / 2.0,
            },
            None => Placement::UNIT,
        }
    }

    /// Whether the object's rotation is applied to its mark.
    pub fn follows_rotation(&self) -> bool {
        *self == RenderMode::Asset3d
    }
}

/// Converts a scene position in meters to flat canvas pixels. The y axis is
/// flipped so that it grows downwards from `scene_y_max`; z stays in meters.
pub fn meters_to_pixels(
    meters: cgmath::Vector3<f32>,
    scale: f32,
    scene_y_max: f32,
) -> cgmath::Vector3<f32> {
    cgmath::Vector3::new(
        (meters.x * scale).round(),
        (scene_y_max - meters.y * scale).round(),
        meters.z,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_multipliers() {
        let policy = SizingPolicy::default();
        assert_eq!(policy.radius("person", 100.0), 30.0);
        assert_eq!(policy.radius("vehicle", 100.0), 150.0);
        assert_eq!(policy.radius("apriltag", 100.0), 15.0);
        assert_eq!(policy.radius("forklift", 100.0), 50.0);
        // whole pixels, truncated
        assert_eq!(policy.radius("person", 25.0), 7.0);
    }

    #[test]
    fn policy_is_open_for_new_categories() {
        let policy = SizingPolicy::default().with("bicycle", 0.8);
        assert_eq!(policy.radius("bicycle", 10.0), 8.0);
    }

    #[test]
    fn size_only_applies_to_3d_assets() {
        let object = TrackedObject::new("1", "vehicle", &[0.0, 0.0, 0.0]).with_size([2.0, 4.0, 1.5]);
        let asset = RenderMode::Asset3d.placement(&object);
        assert_eq!(asset.z_offset, 0.75);
        assert_eq!(asset.scale, cgmath::Vector3::new(2.0, 4.0, 1.5));
        assert_eq!(RenderMode::FlatMarker.placement(&object), Placement::UNIT);
        assert_eq!(
            RenderMode::FlatMarker.placement(&object.with_asset_scale(3.0)),
            Placement::UNIT
        );
    }

    #[test]
    fn meters_to_pixels_flips_y() {
        let pixels = meters_to_pixels(cgmath::Vector3::new(1.24, 2.0, 0.5), 10.0, 100.0);
        assert_eq!(pixels, cgmath::Vector3::new(12.0, 80.0, 0.5));
    }
}
