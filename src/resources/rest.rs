//! REST access to the scene server's asset library.

use instant::Duration;
use serde::{Deserialize, Deserializer};

use crate::resources::{AssetError, fetch::resolve_url};

/// One entry of the asset library. Assets with a `model_3d` URL are loaded
/// as models; the others get a default box in `mark_color`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Asset {
    pub name: String,
    pub model_3d: Option<String>,
    pub mark_color: Option<String>,
    pub z_size: Option<f32>,
    /// Model corrections, rotations in degrees.
    #[serde(deserialize_with = "zero_if_null")]
    pub rotation_x: f32,
    #[serde(deserialize_with = "zero_if_null")]
    pub rotation_y: f32,
    #[serde(deserialize_with = "zero_if_null")]
    pub rotation_z: f32,
    #[serde(deserialize_with = "zero_if_null")]
    pub translation_x: f32,
    #[serde(deserialize_with = "zero_if_null")]
    pub translation_y: f32,
    #[serde(deserialize_with = "zero_if_null")]
    pub translation_z: f32,
}

impl Asset {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// The model URL, ignoring empty strings the server sends for "no model".
    pub fn model_url(&self) -> Option<&str> {
        self.model_3d.as_deref().filter(|url| !url.trim().is_empty())
    }
}

fn zero_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    Ok(Option::<f32>::deserialize(deserializer)?.unwrap_or(0.0))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AssetPage {
    results: Vec<Asset>,
}

/// Thin client for the scene server's REST API.
#[derive(Clone, Debug)]
pub struct RestClient {
    base: reqwest::Url,
    token: Option<String>,
    client: reqwest::Client,
}

impl RestClient {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        #[allow(unused_variables)] timeout: Duration,
    ) -> Result<Self, AssetError> {
        // `join` drops the last path segment unless the base ends with a slash
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base = resolve_url(&normalized).map_err(|e| AssetError::Url(format!("{e:#}")))?;

        #[cfg(not(target_arch = "wasm32"))]
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        #[cfg(target_arch = "wasm32")]
        let client = reqwest::Client::new();

        Ok(Self {
            base,
            token,
            client,
        })
    }

    pub fn base(&self) -> &reqwest::Url {
        &self.base
    }

    async fn get(&self, endpoint: &str) -> Result<Vec<u8>, AssetError> {
        let url = self
            .base
            .join(endpoint)
            .map_err(|e| AssetError::Url(e.to_string()))?;
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Token {token}"));
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn get_assets(&self) -> Result<Vec<Asset>, AssetError> {
        let body = self.get("assets").await?;
        let page: AssetPage = serde_json::from_slice(&body)?;
        log::debug!("asset library lists {} assets", page.results.len());
        Ok(page.results)
    }
}
