use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use frontend_kit::AppSession;
use frontend_kit::api::{self, QueryParams};
use frontend_kit::config::{ApiConfig, AppConfig, RuntimeEnvironment};
use frontend_kit::store::{FileStorage, MemoryStorage, StateStorage, UiState};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Hits {
    profile: Arc<AtomicUsize>,
    flaky: Arc<AtomicUsize>,
}

async fn profile(State(hits): State<Hits>) -> Json<Value> {
    let n = hits.profile.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({ "name": "alice", "served": n }))
}

async fn flaky(State(hits): State<Hits>) -> Response {
    if hits.flaky.fetch_add(1, Ordering::SeqCst) == 0 {
        (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "message": "warming up" }))).into_response()
    } else {
        Json(json!({ "ready": true })).into_response()
    }
}

async fn spawn_backend(hits: Hits) -> String {
    let app = Router::new()
        .route("/api/profile", get(profile))
        .route("/api/flaky", get(flaky))
        .with_state(hits);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn config(base_url: &str, environment: RuntimeEnvironment) -> AppConfig {
    AppConfig {
        api: ApiConfig {
            base_url: base_url.to_string(),
        },
        environment,
    }
}

fn memory() -> Arc<dyn StateStorage> {
    Arc::new(MemoryStorage::new())
}

#[test]
fn test_sessions_are_isolated() {
    let cfg = AppConfig::default();
    let a = AppSession::new(&cfg, memory()).unwrap();
    let b = AppSession::new(&cfg, memory()).unwrap();

    a.query_client().set_query_data("me", "alice".to_string());
    a.ui.open_modal("welcome");

    assert!(!a.query_client().same_client(b.query_client()));
    assert!(b.query_client().get_query_data::<String>("me").is_none());
    assert_eq!(b.ui.active_modal(), None);
}

#[test]
fn test_query_client_survives_remounts() {
    let session = AppSession::new(&AppConfig::default(), memory()).unwrap();
    let first = session.query_client().clone();
    assert!(session.query.mount().same_client(&first));
}

#[test]
fn test_environment_gates_focus_refetch() {
    let prod = AppSession::new(
        &config("http://localhost:3001/api", RuntimeEnvironment::Production),
        memory(),
    )
    .unwrap();
    let dev = AppSession::new(
        &config("http://localhost:3001/api", RuntimeEnvironment::Development),
        memory(),
    )
    .unwrap();

    assert!(prod.query_client().policy().queries.refetch_on_window_focus);
    assert!(!dev.query_client().policy().queries.refetch_on_window_focus);
}

#[test]
fn test_theme_head_markup() {
    let session = AppSession::new(&AppConfig::default(), memory()).unwrap();
    let head = session.theme.head_markup();

    assert!(head.contains("--color-primary-6: #0969ff;"));
    assert!(head.contains("data-color-scheme-script"));
}

#[tokio::test]
async fn test_query_cache_fronts_api_calls() {
    let hits = Hits::default();
    let base = spawn_backend(hits.clone()).await;
    let session = AppSession::new(&config(&base, RuntimeEnvironment::Test), memory()).unwrap();
    let client = session.query_client();
    let api = &session.api;

    for _ in 0..3 {
        let profile: Value = client
            .fetch_query("profile", move || api.get::<Value>("/profile", QueryParams::new()))
            .await
            .unwrap();
        assert_eq!(profile["served"], 1);
    }
    assert_eq!(hits.profile.load(Ordering::SeqCst), 1);

    client.invalidate_queries("profile");
    let profile: Value = client
        .fetch_query("profile", move || api.get::<Value>("/profile", QueryParams::new()))
        .await
        .unwrap();
    assert_eq!(profile["served"], 2);
}

#[tokio::test]
async fn test_failed_read_is_retried_by_query_client() {
    let hits = Hits::default();
    let base = spawn_backend(hits.clone()).await;
    let session = AppSession::new(&config(&base, RuntimeEnvironment::Test), memory()).unwrap();

    // Calling the wrapper directly surfaces the failure.
    let direct: api::Result<Value> = session.api.get("/flaky", QueryParams::new()).await;
    assert_eq!(direct.unwrap_err().to_string(), "warming up");

    hits.flaky.store(0, Ordering::SeqCst);
    let api = &session.api;
    let ready: Value = session
        .query_client()
        .fetch_query("flaky", move || api.get::<Value>("/flaky", QueryParams::new()))
        .await
        .unwrap();
    assert_eq!(ready, json!({ "ready": true }));
    assert_eq!(hits.flaky.load(Ordering::SeqCst), 2);
}

#[test]
fn test_sidebar_persists_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = AppConfig::default();

    let first = AppSession::new(&cfg, Arc::new(FileStorage::new(dir.path()))).unwrap();
    first.ui.toggle_sidebar();
    first.ui.open_modal("settings");
    first.ui.set_loading(true);
    drop(first);

    let record = std::fs::read_to_string(dir.path().join("ui-storage.json")).unwrap();
    assert_eq!(serde_json::from_str::<Value>(&record).unwrap(), json!({ "sidebarOpen": false }));

    let second = AppSession::new(&cfg, Arc::new(FileStorage::new(dir.path()))).unwrap();
    assert_eq!(
        second.ui.state(),
        UiState {
            sidebar_open: false,
            active_modal: None,
            is_loading: false,
        }
    );
}
