//! App operations over a (decorated) app service.

use std::sync::Arc;

use console_app::{App, AppDraft, AppService, QueryOptions};

use crate::error::CoreError;
use crate::token::generate_tokens;

/// Create, list and fetch apps in one namespace.
///
/// Cloning is cheap: clones share the same underlying service.
pub struct AppCore<S> {
    apps: Arc<S>,
    namespace: String,
}

impl<S> Clone for AppCore<S> {
    fn clone(&self) -> Self {
        Self {
            apps: Arc::clone(&self.apps),
            namespace: self.namespace.clone(),
        }
    }
}

impl<S: AppService> AppCore<S> {
    /// Operate on `apps` within `namespace`.
    pub fn new(apps: Arc<S>, namespace: &str) -> Self {
        Self {
            apps,
            namespace: namespace.to_owned(),
        }
    }

    /// Create a new, enabled, non-production app with a fresh token pair.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Token`] if tokens cannot be generated and
    /// [`CoreError::Service`] if the store rejects the insert.
    pub async fn create(&self, name: &str, description: &str) -> Result<App, CoreError> {
        let tokens = generate_tokens()?;

        let app = self
            .apps
            .put(
                &self.namespace,
                AppDraft {
                    name: name.to_owned(),
                    description: description.to_owned(),
                    token: tokens.token,
                    backend_token: tokens.backend_token,
                    enabled: true,
                    in_production: false,
                },
            )
            .await?;

        tracing::debug!(app_id = app.id, namespace = %self.namespace, "app created");

        Ok(app)
    }

    /// Return every app in the namespace, disabled ones included.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Service`] if the store query fails.
    pub async fn list(&self) -> Result<Vec<App>, CoreError> {
        let apps = self
            .apps
            .query(&self.namespace, &QueryOptions::default())
            .await?;
        Ok(apps)
    }

    /// Return the enabled app with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if no enabled app has this id,
    /// whether it never existed or is disabled, and
    /// [`CoreError::Service`] if the store query fails.
    pub async fn fetch(&self, id: u64) -> Result<App, CoreError> {
        let apps = self
            .apps
            .query(
                &self.namespace,
                &QueryOptions {
                    enabled: Some(true),
                    ids: vec![id],
                },
            )
            .await?;

        apps.into_iter().next().ok_or_else(|| {
            tracing::debug!(app_id = id, namespace = %self.namespace, "no enabled app with id");
            CoreError::NotFound { id }
        })
    }
}
