//! Request and response bodies for the app endpoints.

use console_app::App;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/apps`.
#[derive(Debug, Deserialize)]
pub struct CreateAppRequest {
    /// Name of the new app.
    pub name: String,
    /// Description of the new app.
    pub description: String,
}

/// Public view of a single app.
#[derive(Debug, Serialize)]
pub struct AppPayload {
    /// Decimal string form of the id.
    pub id: String,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Enabled flag.
    pub enabled: bool,
    /// Client token.
    pub token: String,
    /// Backend token.
    pub backend_token: String,
}

impl From<App> for AppPayload {
    fn from(app: App) -> Self {
        Self {
            id: app.id.to_string(),
            name: app.name,
            description: app.description,
            enabled: app.enabled,
            token: app.token,
            backend_token: app.backend_token,
        }
    }
}

/// Public view of a collection of apps.
#[derive(Debug, Serialize)]
pub struct AppsPayload {
    /// The apps, in store order.
    pub apps: Vec<AppPayload>,
}

impl From<Vec<App>> for AppsPayload {
    fn from(apps: Vec<App>) -> Self {
        Self {
            apps: apps.into_iter().map(AppPayload::from).collect(),
        }
    }
}
