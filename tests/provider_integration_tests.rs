//! Integration Tests for Fetch-Through Caching
//!
//! A mock posyandu backend runs on an ephemeral port; screens fetch from it
//! with reqwest through the shared cache provider.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use posyandu_cache::{CacheConfig, CacheKey, CacheProvider, ManualClock, Role};
use serde::{Deserialize, Serialize};

// == Mock Backend ==

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Child {
    id: u32,
    name: String,
}

#[derive(Clone, Default)]
struct Backend {
    requests: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    children: Arc<Mutex<Vec<Child>>>,
}

impl Backend {
    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn begin_request(&self) -> Result<(), StatusCode> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            Err(StatusCode::SERVICE_UNAVAILABLE)
        } else {
            Ok(())
        }
    }
}

async fn list_children(State(backend): State<Backend>) -> Result<Json<Vec<Child>>, StatusCode> {
    backend.begin_request()?;
    let children = backend.children.lock().unwrap().clone();
    Ok(Json(children))
}

async fn get_child(
    State(backend): State<Backend>,
    Path(id): Path<u32>,
) -> Result<Json<Child>, StatusCode> {
    backend.begin_request()?;
    let children = backend.children.lock().unwrap();
    children
        .iter()
        .find(|child| child.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_child(State(backend): State<Backend>, Json(child): Json<Child>) -> StatusCode {
    backend.children.lock().unwrap().push(child);
    StatusCode::CREATED
}

async fn spawn_backend(backend: Backend) -> anyhow::Result<String> {
    let app = Router::new()
        .route("/children", get(list_children).post(create_child))
        .route("/children/:id", get(get_child))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    Ok(format!("http://{}", addr))
}

// == Screen-side Helpers ==

async fn fetch_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: String,
) -> anyhow::Result<T> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.json().await?)
}

fn children_key() -> CacheKey<Vec<Child>> {
    Role::Kader.key("children")
}

fn child_key(id: u32) -> CacheKey<Child> {
    Role::Kader.key("child").with(id)
}

struct Harness {
    backend: Backend,
    base: String,
    client: reqwest::Client,
    provider: CacheProvider,
    clock: ManualClock,
}

async fn harness() -> anyhow::Result<Harness> {
    let backend = Backend::default();
    backend.children.lock().unwrap().push(Child {
        id: 1,
        name: "Ani".to_string(),
    });

    let base = spawn_backend(backend.clone()).await?;
    let clock = ManualClock::new(1_700_000_000_000);
    let provider =
        CacheProvider::from_config_with_clock(&CacheConfig::default(), Arc::new(clock.clone()));

    Ok(Harness {
        backend,
        base,
        client: reqwest::Client::new(),
        provider,
        clock,
    })
}

impl Harness {
    async fn open_children_screen(&self) -> anyhow::Result<Vec<Child>> {
        let client = &self.client;
        let url = format!("{}/children", self.base);
        self.provider
            .fetch_through(&children_key(), Some(60), move || fetch_json(client, url))
            .await
    }

    async fn open_child_screen(&self, id: u32) -> anyhow::Result<Child> {
        let client = &self.client;
        let url = format!("{}/children/{}", self.base, id);
        self.provider
            .fetch_through(&child_key(id), Some(30), move || fetch_json(client, url))
            .await
    }
}

// == Tests ==

#[tokio::test]
async fn test_repeat_navigation_reuses_cached_list() -> anyhow::Result<()> {
    let h = harness().await?;

    let first = h.open_children_screen().await?;
    let second = h.open_children_screen().await?;

    assert_eq!(first, second);
    assert_eq!(h.backend.requests(), 1);
    assert_eq!(h.provider.stats().await.hits, 1);
    Ok(())
}

#[tokio::test]
async fn test_mutation_then_invalidate_refetches() -> anyhow::Result<()> {
    let h = harness().await?;
    h.open_children_screen().await?;

    let created = h
        .client
        .post(format!("{}/children", h.base))
        .json(&Child {
            id: 2,
            name: "Budi".to_string(),
        })
        .send()
        .await?;
    assert_eq!(created.status(), reqwest::StatusCode::CREATED);

    // Without invalidation the screen would still see the stale list.
    assert_eq!(h.open_children_screen().await?.len(), 1);

    h.provider.invalidate(&children_key()).await;
    let refreshed = h.open_children_screen().await?;

    assert_eq!(refreshed.len(), 2);
    assert_eq!(h.backend.requests(), 2);
    Ok(())
}

#[tokio::test]
async fn test_failed_fetch_is_not_cached() -> anyhow::Result<()> {
    let h = harness().await?;
    h.backend.set_failing(true);

    let result = h.open_children_screen().await;
    assert!(result.is_err());
    assert!(!h.provider.contains(&children_key()).await);

    // Retry after the backend recovers goes to the network again.
    h.backend.set_failing(false);
    let children = h.open_children_screen().await?;

    assert_eq!(children.len(), 1);
    assert_eq!(h.backend.requests(), 2);
    assert!(h.provider.contains(&children_key()).await);
    Ok(())
}

#[tokio::test]
async fn test_detail_view_refetches_after_expiry() -> anyhow::Result<()> {
    let h = harness().await?;

    h.open_child_screen(1).await?;
    h.clock.advance_secs(29);
    h.open_child_screen(1).await?;
    assert_eq!(h.backend.requests(), 1);

    h.clock.advance_secs(1);
    let child = h.open_child_screen(1).await?;

    assert_eq!(child.name, "Ani");
    assert_eq!(h.backend.requests(), 2);
    Ok(())
}

#[tokio::test]
async fn test_detail_keys_are_independent() -> anyhow::Result<()> {
    let h = harness().await?;
    h.backend.children.lock().unwrap().push(Child {
        id: 5,
        name: "Citra".to_string(),
    });

    h.open_child_screen(1).await?;
    h.open_child_screen(5).await?;
    h.provider.invalidate(&child_key(5)).await;

    assert!(h.provider.contains(&child_key(1)).await);
    assert!(!h.provider.contains(&child_key(5)).await);
    Ok(())
}

#[tokio::test]
async fn test_missing_record_is_an_error_not_a_cache_entry() -> anyhow::Result<()> {
    let h = harness().await?;

    assert!(h.open_child_screen(404).await.is_err());
    assert!(h.provider.is_empty().await);
    Ok(())
}
