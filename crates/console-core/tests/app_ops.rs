//! Tests for the core app operations against the in-memory store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use console_app::{App, AppDraft, AppService, MemoryService, QueryOptions, ServiceError};
use console_core::token::{SUFFIX_LEN, TOKEN_LEN};
use console_core::{AppCore, CoreError};

const NS: &str = "test";

fn core() -> (Arc<MemoryService>, AppCore<MemoryService>) {
    let store = Arc::new(MemoryService::new());
    let core = AppCore::new(Arc::clone(&store), NS);
    (store, core)
}

struct FailingService;

impl AppService for FailingService {
    async fn put(&self, _namespace: &str, _draft: AppDraft) -> Result<App, ServiceError> {
        Err(ServiceError::Config(String::from("down")))
    }

    async fn query(
        &self,
        _namespace: &str,
        _options: &QueryOptions,
    ) -> Result<Vec<App>, ServiceError> {
        Err(ServiceError::Config(String::from("down")))
    }
}

#[tokio::test]
async fn create_sets_defaults_and_tokens() {
    let (_, core) = core();

    let app = core.create("Acme", "d").await.unwrap();

    assert_eq!(app.name, "Acme");
    assert_eq!(app.description, "d");
    assert!(app.enabled);
    assert!(!app.in_production);
    assert_eq!(app.token.len(), TOKEN_LEN);
    assert!(app.backend_token.starts_with(&app.token));
    assert_eq!(app.backend_token.len(), TOKEN_LEN + SUFFIX_LEN);
}

#[tokio::test]
async fn created_apps_get_distinct_tokens() {
    let (_, core) = core();

    let a = core.create("a", "").await.unwrap();
    let b = core.create("b", "").await.unwrap();

    assert_ne!(a.id, b.id);
    assert_ne!(a.token, b.token);
    assert_ne!(a.backend_token, b.backend_token);
}

#[tokio::test]
async fn fetch_returns_created_app() {
    let (_, core) = core();
    let created = core.create("Acme", "d").await.unwrap();

    let fetched = core.fetch(created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn fetch_unknown_id_is_not_found() {
    let (_, core) = core();

    let err = core.fetch(42).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { id: 42 }));
    assert_eq!(err.to_string(), "app (42) not found");
}

#[tokio::test]
async fn fetch_disabled_app_is_not_found() {
    let (store, core) = core();
    let disabled = store
        .put(
            NS,
            AppDraft {
                name: String::from("old"),
                description: String::new(),
                token: String::from("t"),
                backend_token: String::from("tb"),
                enabled: false,
                in_production: false,
            },
        )
        .await
        .unwrap();

    let err = core.fetch(disabled.id).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound { id } if id == disabled.id));
}

#[tokio::test]
async fn list_includes_disabled_apps() {
    let (store, core) = core();
    core.create("on", "").await.unwrap();
    store
        .put(
            NS,
            AppDraft {
                name: String::from("off"),
                description: String::new(),
                token: String::from("t"),
                backend_token: String::from("tb"),
                enabled: false,
                in_production: false,
            },
        )
        .await
        .unwrap();

    let apps = core.list().await.unwrap();
    assert_eq!(apps.len(), 2);
    assert!(apps.iter().any(|a| !a.enabled));
}

#[tokio::test]
async fn list_on_empty_store_is_empty() {
    let (_, core) = core();
    assert!(core.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn store_errors_pass_through_unchanged() {
    let core = AppCore::new(Arc::new(FailingService), NS);

    let err = core.create("Acme", "d").await.unwrap_err();
    assert!(matches!(err, CoreError::Service(ServiceError::Config(ref m)) if m == "down"));

    let err = core.fetch(1).await.unwrap_err();
    assert!(matches!(err, CoreError::Service(_)));

    let err = core.list().await.unwrap_err();
    assert!(matches!(err, CoreError::Service(_)));
}
