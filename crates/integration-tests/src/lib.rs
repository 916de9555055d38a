//! Integration test harness for Snorty.
//!
//! Spins up two in-process servers per test: a mock of the hosted backend
//! (recording every request it receives, answering from a canned queue) and
//! the real storefront router pointed at it. Tests then drive the storefront
//! over real HTTP and assert on both sides.

use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::Response;
use secrecy::SecretString;
use serde_json::{Value, json};
use uuid::Uuid;

use snorty_storefront::config::{BackendConfig, GeocoderConfig, StorefrontConfig};
use snorty_storefront::routes;
use snorty_storefront::state::AppState;

/// One request the mock backend received.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub range: Option<String>,
}

impl CapturedRequest {
    /// Whether the query string carried exactly this key/value pair.
    #[must_use]
    pub fn has_param(&self, key: &str, value: &str) -> bool {
        self.query.iter().any(|(k, v)| k == key && v == value)
    }

    /// Whether the query string carried the key at all.
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.query.iter().any(|(k, _)| k == key)
    }
}

/// A queued mock response.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub content_range: Option<String>,
    pub body: Value,
}

impl Default for CannedResponse {
    fn default() -> Self {
        Self {
            status: 200,
            content_range: Some("*/0".to_owned()),
            body: json!([]),
        }
    }
}

struct MockInner {
    hits: AtomicU32,
    captured: Mutex<Vec<CapturedRequest>>,
    responses: Mutex<VecDeque<CannedResponse>>,
}

/// In-process stand-in for the hosted backend.
pub struct MockBackend {
    pub url: String,
    inner: Arc<MockInner>,
}

impl MockBackend {
    /// Bind an ephemeral port and start answering.
    pub async fn spawn() -> Self {
        let inner = Arc::new(MockInner {
            hits: AtomicU32::new(0),
            captured: Mutex::new(Vec::new()),
            responses: Mutex::new(VecDeque::new()),
        });

        let app = Router::new()
            .fallback(record_and_respond)
            .with_state(Arc::clone(&inner));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock backend");
        });

        Self {
            url: format!("http://{addr}"),
            inner,
        }
    }

    /// Queue the next response the mock will return.
    pub fn push_response(&self, status: u16, content_range: Option<&str>, body: Value) {
        self.lock(&self.inner.responses).push_back(CannedResponse {
            status,
            content_range: content_range.map(ToOwned::to_owned),
            body,
        });
    }

    /// Every request received so far.
    #[must_use]
    pub fn captured(&self) -> Vec<CapturedRequest> {
        self.lock(&self.inner.captured).clone()
    }

    /// The last request matching `path`, if any.
    #[must_use]
    pub fn last_request_to(&self, path: &str) -> Option<CapturedRequest> {
        self.captured()
            .into_iter()
            .rev()
            .find(|request| request.path == path)
    }

    /// Total requests received.
    #[must_use]
    pub fn hits(&self) -> u32 {
        self.inner.hits.load(Ordering::SeqCst)
    }

    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        mutex.lock().expect("mock backend lock")
    }
}

async fn record_and_respond(State(state): State<Arc<MockInner>>, request: Request) -> Response {
    let query = request.uri().query().map_or_else(Vec::new, |q| {
        url::form_urlencoded::parse(q.as_bytes())
            .into_owned()
            .collect()
    });
    let captured = CapturedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_owned(),
        query,
        range: request
            .headers()
            .get("Range")
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned),
    };

    state.hits.fetch_add(1, Ordering::SeqCst);
    state.captured.lock().expect("captured lock").push(captured);

    let canned = state
        .responses
        .lock()
        .expect("responses lock")
        .pop_front()
        .unwrap_or_default();

    let mut builder = Response::builder()
        .status(canned.status)
        .header("Content-Type", "application/json");
    if let Some(content_range) = &canned.content_range {
        builder = builder.header("Content-Range", content_range);
    }
    builder
        .body(Body::from(canned.body.to_string()))
        .expect("mock response")
}

/// The storefront under test, bound to an ephemeral port.
pub struct StorefrontApp {
    pub url: String,
    pub state: AppState,
}

impl StorefrontApp {
    /// Start the storefront against the given backend URL.
    ///
    /// The geocoder is pointed at the same mock so no test ever leaves the
    /// process; its failures degrade to coordinate labels by design.
    pub async fn spawn(backend_url: &str) -> Self {
        let config = StorefrontConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            base_url: "http://storefront.test".to_owned(),
            allowed_origin: None,
            data_dir: test_data_dir(),
            backend: BackendConfig {
                url: backend_url.to_owned(),
                api_key: SecretString::from("test-api-key"),
            },
            geocoder: GeocoderConfig {
                base_url: format!("{backend_url}/geocoder"),
                user_agent: "snorty-tests".to_owned(),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        let state = AppState::new(config).expect("build app state");
        let app = Router::new()
            .merge(routes::health_routes())
            .nest("/api", routes::api_routes())
            .layer(axum::middleware::from_fn(
                snorty_storefront::middleware::request_id_middleware,
            ))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind storefront");
        let addr = listener.local_addr().expect("storefront addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve storefront");
        });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }
}

fn test_data_dir() -> PathBuf {
    std::env::temp_dir().join(format!("snorty-integration-{}", Uuid::new_v4()))
}
