//! Geometry cache population from the asset library.
//!
//! The asset list comes from the REST API. Assets with a model URL are
//! downloaded and parsed concurrently; the others get a default box in their
//! configured color. A failing asset is logged and its category stays on the
//! unknown fallback; it never aborts the rest of the batch.

use futures::{StreamExt, channel::mpsc::UnboundedSender, stream::FuturesUnordered};
use instant::Instant;

use crate::{
    context::Context,
    data_structures::{
        color::Color,
        geometry_cache::{GeometryCache, UNKNOWN_CATEGORY},
        template::Template,
    },
    flow::FlowEvent,
    resources::{
        progress::LoadProgress,
        rest::{Asset, RestClient},
    },
};

pub mod fetch;
pub mod model;
pub mod progress;
pub mod rest;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("invalid url: {0}")]
    Url(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("GET {endpoint} answered {status}")]
    Status { endpoint: String, status: u16 },
    #[error("malformed asset list: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("could not load model for {name}: {source}")]
    Model {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Outcome of one asset batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Categories that now have a model template.
    pub models: Vec<String>,
    /// Categories that got a default box.
    pub defaults: Vec<String>,
    /// Categories whose model failed and stay on the fallback.
    pub failed: Vec<String>,
    /// The initial batch is complete and tracking may start.
    pub subscribe: bool,
}

/// The default box of an asset without a model.
pub fn default_template(asset: &Asset) -> Template {
    let color = match asset.mark_color.as_deref() {
        Some(raw) => raw.parse::<Color>().unwrap_or_else(|e| {
            log::warn!("{e} for asset {}, using green", asset.name);
            Color::GREEN
        }),
        None => Color::GREEN,
    };
    Template::default_box(asset.name.clone(), color, asset.z_size.unwrap_or(1.0))
}

/// Downloads and parses the model of `asset`, reporting download progress.
pub async fn load_model_template(
    asset: &Asset,
    url: &str,
    progress: Option<UnboundedSender<LoadProgress>>,
) -> Result<Template, AssetError> {
    let name = asset.name.clone();
    let mut on_progress = |loaded: u64, total: Option<u64>| {
        if let Some(progress) = &progress {
            // the receiver may be gone, progress is best effort
            let _ = progress.unbounded_send(LoadProgress {
                asset: name.clone(),
                loaded,
                total,
            });
        }
    };
    let model_error = |source: anyhow::Error| AssetError::Model {
        name: asset.name.clone(),
        source: source.into(),
    };
    let bytes = fetch::load_binary(url, &mut on_progress)
        .await
        .map_err(model_error)?;
    model::model_template(asset, &bytes).map_err(model_error)
}

/// Builds every asset's template. Model downloads run concurrently and are
/// reported in completion order.
fn templates(
    assets: &[Asset],
    progress: Option<UnboundedSender<LoadProgress>>,
) -> FuturesUnordered<impl Future<Output = (String, bool, Result<Template, AssetError>)> + '_> {
    assets
        .iter()
        .map(|asset| {
            let progress = progress.clone();
            async move {
                match asset.model_url() {
                    Some(url) => (
                        asset.name.clone(),
                        true,
                        load_model_template(asset, url, progress).await,
                    ),
                    None => (asset.name.clone(), false, Ok(default_template(asset))),
                }
            }
        })
        .collect()
}

fn record(
    summary: &mut LoadSummary,
    name: &str,
    is_model: bool,
    result: &Result<Template, AssetError>,
) {
    match (result, is_model) {
        (Ok(_), true) => summary.models.push(name.to_string()),
        (Ok(_), false) => summary.defaults.push(name.to_string()),
        (Err(e), _) => {
            log::error!("Error loading asset {name}: {e}");
            summary.failed.push(name.to_string());
        }
    }
}

/// Inserts the templates of `assets` into `cache`.
pub async fn populate(
    cache: &mut GeometryCache,
    assets: &[Asset],
    reload: bool,
    progress: Option<UnboundedSender<LoadProgress>>,
) -> LoadSummary {
    let started = Instant::now();
    let mut summary = LoadSummary::default();
    let mut pending = templates(assets, progress);
    while let Some((name, is_model, result)) = pending.next().await {
        record(&mut summary, &name, is_model, &result);
        if let Ok(template) = result {
            cache.insert(name, template);
        }
    }
    summary.subscribe = !reload;
    log::info!(
        "loaded {} models and {} default assets in {:?}, {} failed",
        summary.models.len(),
        summary.defaults.len(),
        started.elapsed(),
        summary.failed.len()
    );
    summary
}

pub struct AssetLoader {
    client: RestClient,
}

impl AssetLoader {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }

    pub fn from_context(ctx: &Context) -> Result<Self, AssetError> {
        let client = RestClient::new(
            &ctx.rest_url,
            ctx.auth_token.clone(),
            ctx.request_timeout(),
        )?;
        Ok(Self::new(client))
    }

    async fn fetch_assets(&self) -> Result<Vec<Asset>, AssetError> {
        self.client.get_assets().await.inspect_err(|e| {
            log::error!("Failed to load assets: {e}");
        })
    }

    /// Fills `cache` directly. Used when no tracking runs concurrently.
    pub async fn load_assets(
        &self,
        cache: &mut GeometryCache,
        reload: bool,
        progress: Option<UnboundedSender<LoadProgress>>,
    ) -> Result<LoadSummary, AssetError> {
        cache.insert(UNKNOWN_CATEGORY, Template::default_box(UNKNOWN_CATEGORY, Color::GREEN, 1.0));
        let assets = self.fetch_assets().await?;
        Ok(populate(cache, &assets, reload, progress).await)
    }

    /// Fetches the asset list and streams it into a running tracking flow,
    /// see [`stream`].
    pub async fn stream_assets(
        &self,
        events: UnboundedSender<FlowEvent>,
        reload: bool,
        progress: Option<UnboundedSender<LoadProgress>>,
    ) -> Result<LoadSummary, AssetError> {
        let assets = self.fetch_assets().await?;
        Ok(stream(&assets, events, reload, progress).await)
    }
}

/// Sends each template to a running tracking flow as soon as it is ready,
/// then `Subscribe` once the initial batch is complete. Tracking updates
/// handled meanwhile use the fallback for categories still loading.
///
/// `subscribe` in the summary is only set when the flow received it.
pub async fn stream(
    assets: &[Asset],
    events: UnboundedSender<FlowEvent>,
    reload: bool,
    progress: Option<UnboundedSender<LoadProgress>>,
) -> LoadSummary {
    let mut summary = LoadSummary::default();
    let mut pending = templates(assets, progress);
    while let Some((name, is_model, result)) = pending.next().await {
        record(&mut summary, &name, is_model, &result);
        if let Ok(template) = result {
            if events
                .unbounded_send(FlowEvent::AssetLoaded { name, template })
                .is_err()
            {
                log::warn!("tracking flow stopped before all assets were loaded");
                return summary;
            }
        }
    }
    if !reload {
        if events.unbounded_send(FlowEvent::Subscribe).is_err() {
            log::warn!("tracking flow stopped before it could subscribe");
        } else {
            summary.subscribe = true;
        }
    }
    summary
}
