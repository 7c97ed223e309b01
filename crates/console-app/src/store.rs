//! Runtime selection of the backing store.
//!
//! Uses enum dispatch instead of trait objects because the async methods
//! of [`AppService`] are not dyn-compatible.

use std::fmt;
use std::str::FromStr;

use crate::error::ServiceError;
use crate::memory::MemoryService;
use crate::model::{App, AppDraft, QueryOptions};
use crate::postgres::PostgresService;
use crate::service::AppService;

/// Kind of store, used as the `store` metric label and log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// [`PostgresService`].
    #[default]
    Postgres,
    /// [`MemoryService`].
    Memory,
}

impl StoreKind {
    /// The label value for this store kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreKind {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(ServiceError::Config(format!("unknown store kind: {other}"))),
        }
    }
}

/// The store selected at startup.
pub enum AppStore {
    /// `PostgreSQL` backed store.
    Postgres(PostgresService),
    /// In-process store.
    Memory(MemoryService),
}

impl AppStore {
    /// Which kind of store this is.
    pub const fn kind(&self) -> StoreKind {
        match self {
            Self::Postgres(_) => StoreKind::Postgres,
            Self::Memory(_) => StoreKind::Memory,
        }
    }

    /// Release store resources. A no-op for the in-process store.
    pub async fn close(&self) {
        if let Self::Postgres(pg) = self {
            pg.close().await;
        }
    }
}

impl AppService for AppStore {
    async fn put(&self, namespace: &str, draft: AppDraft) -> Result<App, ServiceError> {
        match self {
            Self::Postgres(store) => store.put(namespace, draft).await,
            Self::Memory(store) => store.put(namespace, draft).await,
        }
    }

    async fn query(
        &self,
        namespace: &str,
        options: &QueryOptions,
    ) -> Result<Vec<App>, ServiceError> {
        match self {
            Self::Postgres(store) => store.query(namespace, options).await,
            Self::Memory(store) => store.query(namespace, options).await,
        }
    }
}
