//! Inbound tracking messages.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{data_structures::geometry_cache::UNKNOWN_CATEGORY, marks::MarkError};

/// Object identifier as sent by the tracker: a string or a number. Ids are
/// always compared in their string form.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ObjectId {
    Text(String),
    Number(serde_json::Number),
}

impl ObjectId {
    /// String form used for matching. Integers print as digits and integral
    /// floats drop the fraction, so `5`, `5.0` and `"5"` match. Floats are
    /// always written out in full: `1e21` becomes `"1000000000000000000000"`,
    /// not the exponent form a JavaScript publisher would produce, so such
    /// ids only match when every publisher sends them as numbers.
    pub fn key(&self) -> String {
        match self {
            ObjectId::Text(text) => text.clone(),
            ObjectId::Number(number) => match number.as_f64() {
                // 5.0 and 5 name the same object
                Some(value) if !number.is_i64() && !number.is_u64() && value.fract() == 0.0 => {
                    format!("{value:.0}")
                }
                _ => number.to_string(),
            },
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        ObjectId::Text(id.to_string())
    }
}

impl From<u64> for ObjectId {
    fn from(id: u64) -> Self {
        ObjectId::Number(id.into())
    }
}

/// One tracked object of a snapshot. Fields the overlay does not use are
/// ignored.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TrackedObject {
    pub id: ObjectId,
    #[serde(default)]
    pub category: Option<String>,
    /// Older publishers name the category `type`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub translation: Option<Vec<f32>>,
    /// Unit quaternion as `[x, y, z, w]`.
    #[serde(default)]
    pub rotation: Option<[f32; 4]>,
    #[serde(default)]
    pub asset_scale: Option<f32>,
    #[serde(default)]
    pub size: Option<[f32; 3]>,
    #[serde(default)]
    pub persistent_data: Option<Map<String, Value>>,
    #[serde(default)]
    pub tag_id: Option<Value>,
}

impl TrackedObject {
    pub fn new(id: impl Into<ObjectId>, category: &str, translation: &[f32]) -> Self {
        Self {
            id: id.into(),
            category: Some(category.to_string()),
            kind: None,
            translation: Some(translation.to_vec()),
            rotation: None,
            asset_scale: None,
            size: None,
            persistent_data: None,
            tag_id: None,
        }
    }

    pub fn with_rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_asset_scale(mut self, asset_scale: f32) -> Self {
        self.asset_scale = Some(asset_scale);
        self
    }

    pub fn with_size(mut self, size: [f32; 3]) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_persistent_data(mut self, data: Map<String, Value>) -> Self {
        self.persistent_data = Some(data);
        self
    }

    pub fn category(&self) -> &str {
        self.category
            .as_deref()
            .or(self.kind.as_deref())
            .unwrap_or(UNKNOWN_CATEGORY)
    }

    /// The translation as three components; a 2D translation lies at z = 0.
    pub fn position(&self) -> Result<cgmath::Vector3<f32>, MarkError> {
        let translation = self
            .translation
            .as_deref()
            .ok_or_else(|| MarkError::MissingTranslation { id: self.id.key() })?;
        match *translation {
            [x, y] => Ok(cgmath::Vector3::new(x, y, 0.0)),
            [x, y, z] => Ok(cgmath::Vector3::new(x, y, z)),
            _ => Err(MarkError::InvalidTranslation {
                id: self.id.key(),
                len: translation.len(),
            }),
        }
    }
}

/// A full snapshot of the currently tracked objects.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct UpdateMessage {
    #[serde(default)]
    pub objects: Vec<TrackedObject>,
}

impl UpdateMessage {
    pub fn from_slice(payload: &[u8]) -> Result<Self, MarkError> {
        Ok(serde_json::from_slice(payload)?)
    }
}
