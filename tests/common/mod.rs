#![allow(dead_code)]

use axum::{Router, extract::ConnectInfo};
use axum_test::TestServer;
use serde_json::{Value, json};
use shortgate::api::middleware::rate_limit::RateLimit;
use shortgate::application::dispatcher::VerificationDispatcher;
use shortgate::application::redirect_budget::RedirectBudget;
use shortgate::domain::click_event::ClickEvent;
use shortgate::domain::entities::Reachability;
use shortgate::domain::repositories::LinkRegistry;
use shortgate::routes::app_router;
use shortgate::state::{AppState, Backends};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower::Layer;

pub const BASE_URL: &str = "http://sho.rt";

/// Inserts a fixed peer address so handlers and the IP limiter can read
/// `ConnectInfo` without a real socket.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// Full router over in-memory storage.
///
/// No verification consumers are subscribed; tests drive verdicts through
/// `backends.registry` or subscribe their own handlers on `dispatcher`.
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub backends: Backends,
    pub budget: Arc<RedirectBudget>,
    pub dispatcher: Arc<VerificationDispatcher>,
    pub click_rx: mpsc::Receiver<ClickEvent>,
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_refill(Duration::from_secs(60))
}

pub fn spawn_app_with_refill(refill: Duration) -> TestApp {
    build_app(refill, false)
}

/// Same as [`spawn_app`], but client IPs come from proxy headers.
pub fn spawn_app_behind_proxy() -> TestApp {
    build_app(Duration::from_secs(60), true)
}

fn build_app(refill: Duration, behind_proxy: bool) -> TestApp {
    let backends = Backends::in_memory();
    let budget = Arc::new(RedirectBudget::new(refill));
    let dispatcher = Arc::new(VerificationDispatcher::new(100));
    let (tx, rx) = mpsc::channel(100);

    let state = AppState::new(&backends, budget.clone(), dispatcher.clone(), tx, BASE_URL)
        .with_behind_proxy(behind_proxy);

    let limit = RateLimit {
        burst: 10_000,
        behind_proxy,
        ..RateLimit::default()
    };
    let app = app_router(state.clone(), limit).unwrap();
    let router = Router::new()
        .fallback_service(app)
        .layer(MockConnectInfoLayer);

    TestApp {
        server: TestServer::new(router).unwrap(),
        state,
        backends,
        budget,
        dispatcher,
        click_rx: rx,
    }
}

impl TestApp {
    /// Creates a link through the API and returns its hash.
    pub async fn create_link(&self, body: Value) -> String {
        let response = self.server.post("/api/link").json(&body).await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["hash"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub async fn create_simple_link(&self, limit: i64) -> String {
        self.create_link(json!({ "url": "https://example.com/target", "limit": limit }))
            .await
    }

    pub async fn mark(&self, hash: &str, verdict: Reachability) {
        assert!(
            self.backends
                .registry
                .set_reachability(hash, verdict)
                .await
                .unwrap()
        );
    }
}
