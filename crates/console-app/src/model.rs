//! App data model.
//!
//! [`App`] values returned by a store are snapshots: the core never mutates
//! them after construction. [`AppDraft`] is the not-yet-persisted shape
//! handed to [`AppService::put`](crate::AppService::put); the store assigns
//! the id and timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Namespace used by the console for every store operation.
pub const NAMESPACE_DEFAULT: &str = "console";

/// A tenant application as persisted by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    /// Store-assigned identifier, immutable after creation.
    pub id: u64,
    /// Human-readable name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Client-facing credential.
    pub token: String,
    /// Backend credential, always prefixed by [`App::token`].
    pub backend_token: String,
    /// Whether the app is active.
    pub enabled: bool,
    /// Whether the app serves production traffic.
    pub in_production: bool,
    /// When the store first persisted the app.
    pub created_at: DateTime<Utc>,
    /// When the store last wrote the app.
    pub updated_at: DateTime<Utc>,
}

/// An app that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDraft {
    /// Human-readable name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Client-facing credential.
    pub token: String,
    /// Backend credential.
    pub backend_token: String,
    /// Whether the app is active.
    pub enabled: bool,
    /// Whether the app serves production traffic.
    pub in_production: bool,
}

impl AppDraft {
    /// Attach store-assigned fields, producing the persisted [`App`].
    pub fn into_app(self, id: u64, now: DateTime<Utc>) -> App {
        App {
            id,
            name: self.name,
            description: self.description,
            token: self.token,
            backend_token: self.backend_token,
            enabled: self.enabled,
            in_production: self.in_production,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Filter for [`AppService::query`](crate::AppService::query).
///
/// The default value matches every app in the namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Only return apps whose `enabled` flag equals this value.
    pub enabled: Option<bool>,
    /// Only return apps with one of these ids. Empty means no id filter.
    pub ids: Vec<u64>,
}

impl QueryOptions {
    /// Whether `app` passes this filter.
    pub fn matches(&self, app: &App) -> bool {
        if let Some(enabled) = self.enabled
            && app.enabled != enabled
        {
            return false;
        }
        self.ids.is_empty() || self.ids.contains(&app.id)
    }
}
