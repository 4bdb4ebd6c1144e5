//! Event-driven tracking flow.
//!
//! A [`TrackingFlow`] owns one overlay: the scene, the geometry cache and the
//! reconciler. Everything that happens to the overlay arrives as a
//! [`FlowEvent`] (tracking payloads from the pub/sub transport, templates
//! from the asset loader, toggles from the UI) and is handled one at a time,
//! so two reconcile passes never overlap.
//!
//! # Lifecycle
//!
//! 1. The flow starts unsubscribed. Tracking payloads are queued, not dropped.
//! 2. The asset loader streams `AssetLoaded` events into the cache.
//! 3. `Subscribe` replays the queue in arrival order; from then on every
//!    payload is reconciled as soon as it is handled.
//! 4. `Shutdown` (or a closed channel) ends [`TrackingFlow::run`].

use std::{collections::VecDeque, ops::ControlFlow};

use futures::{StreamExt, channel::mpsc::UnboundedReceiver};

use crate::{
    context::Context,
    data_structures::{
        geometry_cache::GeometryCache, scene_graph::SceneAdapter, template::Template,
    },
    marks::{MarkError, ReconcileReport, Reconciler, UpdateMessage},
    resources::AssetLoader,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub enum FlowEvent {
    /// Raw JSON payload as received from the transport.
    Message(Vec<u8>),
    /// An already decoded snapshot.
    Update(UpdateMessage),
    AssetLoaded { name: String, template: Template },
    Subscribe,
    HideMarks,
    ShowMarks,
    SetShowTrails(bool),
    SetShowTelemetry(bool),
    /// Removes every mark, e.g. before switching scenes.
    Clear,
    Shutdown,
}

impl std::fmt::Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowEvent::Message(payload) => write!(f, "Message({} bytes)", payload.len()),
            FlowEvent::Update(update) => write!(f, "Update({} objects)", update.objects.len()),
            FlowEvent::AssetLoaded { name, .. } => write!(f, "AssetLoaded({name})"),
            FlowEvent::Subscribe => f.write_str("Subscribe"),
            FlowEvent::HideMarks => f.write_str("HideMarks"),
            FlowEvent::ShowMarks => f.write_str("ShowMarks"),
            FlowEvent::SetShowTrails(show) => write!(f, "SetShowTrails({show})"),
            FlowEvent::SetShowTelemetry(show) => write!(f, "SetShowTelemetry({show})"),
            FlowEvent::Clear => f.write_str("Clear"),
            FlowEvent::Shutdown => f.write_str("Shutdown"),
        }
    }
}

enum Inbound {
    Raw(Vec<u8>),
    Decoded(UpdateMessage),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlowStats {
    /// Snapshots reconciled without error.
    pub processed: u64,
    /// Snapshots that failed to decode or reconcile.
    pub failed: u64,
}

pub struct TrackingFlow<A: SceneAdapter> {
    scene: A,
    cache: GeometryCache,
    reconciler: Reconciler,
    subscribed: bool,
    backlog: VecDeque<Inbound>,
    stats: FlowStats,
}

impl<A: SceneAdapter> TrackingFlow<A> {
    pub fn new(ctx: &Context, scene: A) -> Self {
        Self {
            scene,
            cache: GeometryCache::new(),
            reconciler: Reconciler::new(ctx),
            subscribed: false,
            backlog: VecDeque::new(),
            stats: FlowStats::default(),
        }
    }

    pub fn with_cache(mut self, cache: GeometryCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn scene(&self) -> &A {
        &self.scene
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn stats(&self) -> FlowStats {
        self.stats
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Number of payloads waiting for the subscription.
    pub fn backlog(&self) -> usize {
        self.backlog.len()
    }

    /// Reconciles one snapshot right away.
    pub fn apply(&mut self, update: &UpdateMessage) -> Result<ReconcileReport, MarkError> {
        self.reconciler
            .reconcile(&mut self.scene, &self.cache, &update.objects)
    }

    fn process(&mut self, inbound: Inbound) {
        let result = match inbound {
            Inbound::Raw(payload) => {
                UpdateMessage::from_slice(&payload).and_then(|update| self.apply(&update))
            }
            Inbound::Decoded(update) => self.apply(&update),
        };
        match result {
            Ok(_) => self.stats.processed += 1,
            Err(e) => {
                log::error!("Dropping tracking update: {e}");
                self.stats.failed += 1;
            }
        }
    }

    fn receive(&mut self, inbound: Inbound) {
        if self.subscribed {
            self.process(inbound);
        } else {
            self.backlog.push_back(inbound);
        }
    }

    /// Handles one event. Returns `Break` once the flow should stop.
    pub fn handle(&mut self, event: FlowEvent) -> ControlFlow<()> {
        log::trace!("handling {event:?}");
        match event {
            FlowEvent::Message(payload) => self.receive(Inbound::Raw(payload)),
            FlowEvent::Update(update) => self.receive(Inbound::Decoded(update)),
            FlowEvent::AssetLoaded { name, template } => {
                self.cache.insert(name, template);
            }
            FlowEvent::Subscribe => {
                if !self.subscribed {
                    log::info!(
                        "subscribed to tracking, replaying {} queued updates",
                        self.backlog.len()
                    );
                    self.subscribed = true;
                    while let Some(inbound) = self.backlog.pop_front() {
                        self.process(inbound);
                    }
                }
            }
            FlowEvent::HideMarks => self.reconciler.hide_marks(&mut self.scene),
            FlowEvent::ShowMarks => self.reconciler.show_marks(&mut self.scene),
            FlowEvent::SetShowTrails(show) => {
                self.reconciler.set_show_trails(&mut self.scene, show)
            }
            FlowEvent::SetShowTelemetry(show) => {
                self.reconciler.set_show_telemetry(&mut self.scene, show)
            }
            FlowEvent::Clear => self.reconciler.clear(&mut self.scene),
            FlowEvent::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Handles events until `Shutdown` or until every sender is dropped.
    pub async fn run(mut self, mut events: UnboundedReceiver<FlowEvent>) -> Self {
        while let Some(event) = events.next().await {
            if self.handle(event).is_break() {
                break;
            }
        }
        log::info!(
            "tracking flow stopped after {} updates ({} failed)",
            self.stats.processed,
            self.stats.failed
        );
        self
    }
}

/// Starts loading the asset library in the background, feeding `events`.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_asset_loading(
    loader: AssetLoader,
    events: futures::channel::mpsc::UnboundedSender<FlowEvent>,
    reload: bool,
) {
    tokio::spawn(async move {
        if let Err(e) = loader.stream_assets(events, reload, None).await {
            log::error!("Error fetching assets: {e}");
        }
    });
}

#[cfg(target_arch = "wasm32")]
pub fn spawn_asset_loading(
    loader: AssetLoader,
    events: futures::channel::mpsc::UnboundedSender<FlowEvent>,
    reload: bool,
) {
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = loader.stream_assets(events, reload, None).await {
            log::error!("Error fetching assets: {e}");
        }
    });
}

/// Installs the platform logger: `env_logger` natively, the browser console
/// on the web.
pub fn init_logging() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }
}
