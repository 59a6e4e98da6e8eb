//! Shared application state injected into every handler.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::api::middleware::rate_limit::ClientIpKeyExtractor;
use crate::application::dispatcher::VerificationDispatcher;
use crate::application::redirect_budget::RedirectBudget;
use crate::application::services::{LinkService, RedirectGate, StatsService};
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::{ClickRepository, LinkRegistry, QrStore};
use crate::infrastructure::memory::{MemoryClickRepository, MemoryLinkRegistry, MemoryQrStore};

/// Storage adapters behind the domain ports.
#[derive(Clone)]
pub struct Backends {
    pub registry: Arc<dyn LinkRegistry>,
    pub clicks: Arc<dyn ClickRepository>,
    pub qr_store: Arc<dyn QrStore>,
}

impl Backends {
    /// Process-local adapters; nothing survives a restart.
    pub fn in_memory() -> Self {
        Self {
            registry: Arc::new(MemoryLinkRegistry::new()),
            clicks: Arc::new(MemoryClickRepository::new()),
            qr_store: Arc::new(MemoryQrStore::new()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub redirect_gate: Arc<RedirectGate>,
    pub stats_service: Arc<StatsService>,
    pub registry: Arc<dyn LinkRegistry>,
    pub dispatcher: Arc<VerificationDispatcher>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    pub qr_content_type: &'static str,
    pub client_ip: ClientIpKeyExtractor,
}

impl AppState {
    /// Wires the services over `backends`.
    ///
    /// The budget and dispatcher are shared with the background workers, so
    /// the caller owns them.
    pub fn new(
        backends: &Backends,
        budget: Arc<RedirectBudget>,
        dispatcher: Arc<VerificationDispatcher>,
        click_sender: mpsc::Sender<ClickEvent>,
        base_url: &str,
    ) -> Self {
        let link_service = Arc::new(LinkService::new(
            backends.registry.clone(),
            backends.qr_store.clone(),
            budget.clone(),
            dispatcher.clone(),
            base_url,
        ));
        let redirect_gate = Arc::new(RedirectGate::new(backends.registry.clone(), budget));
        let stats_service = Arc::new(StatsService::new(
            backends.clicks.clone(),
            backends.registry.clone(),
        ));

        Self {
            link_service,
            redirect_gate,
            stats_service,
            registry: backends.registry.clone(),
            dispatcher,
            click_sender,
            qr_content_type: "image/svg+xml",
            client_ip: ClientIpKeyExtractor::default(),
        }
    }

    pub fn with_qr_content_type(mut self, content_type: &'static str) -> Self {
        self.qr_content_type = content_type;
        self
    }

    /// Reads click IPs from proxy headers, matching the API limiter.
    pub fn with_behind_proxy(mut self, behind_proxy: bool) -> Self {
        self.client_ip = ClientIpKeyExtractor::new(behind_proxy);
        self
    }
}
