//! In-process app store.
//!
//! Keeps apps per namespace behind a [`tokio::sync::RwLock`]. Ids are
//! assigned sequentially starting at 1 and are shared across namespaces,
//! matching a single `BIGSERIAL` column.

use std::collections::BTreeMap;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::error::ServiceError;
use crate::model::{App, AppDraft, QueryOptions};
use crate::service::AppService;

#[derive(Debug, Default)]
struct Inner {
    last_id: u64,
    namespaces: BTreeMap<String, Vec<App>>,
}

/// App store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryService {
    inner: RwLock<Inner>,
}

impl MemoryService {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AppService for MemoryService {
    async fn put(&self, namespace: &str, draft: AppDraft) -> Result<App, ServiceError> {
        let mut inner = self.inner.write().await;

        let id = inner
            .last_id
            .checked_add(1)
            .ok_or_else(|| ServiceError::InvalidId(String::from("id space exhausted")))?;
        inner.last_id = id;

        let app = draft.into_app(id, Utc::now());
        inner
            .namespaces
            .entry(namespace.to_owned())
            .or_default()
            .push(app.clone());

        Ok(app)
    }

    async fn query(
        &self,
        namespace: &str,
        options: &QueryOptions,
    ) -> Result<Vec<App>, ServiceError> {
        let inner = self.inner.read().await;

        Ok(inner
            .namespaces
            .get(namespace)
            .map(|apps| {
                apps.iter()
                    .filter(|app| options.matches(app))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
