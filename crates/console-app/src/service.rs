//! The app service contract.
//!
//! [`AppService`] is the narrow interface every store and every decorator
//! implements. Decorators hold the next service in the chain and delegate
//! to it, so the assembled pipeline is a strictly linear stack of values
//! sharing one contract.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::ServiceError;
use crate::model::{App, AppDraft, QueryOptions};

/// Operations available on apps.
///
/// `namespace` is a logical partition key passed through unchanged by
/// decorators. Store errors are returned untranslated.
pub trait AppService: Send + Sync {
    /// Persist a new app and return it with its assigned id.
    fn put(
        &self,
        namespace: &str,
        draft: AppDraft,
    ) -> impl Future<Output = Result<App, ServiceError>> + Send;

    /// Return every app in `namespace` matching `options`.
    ///
    /// Ordering is store-defined.
    fn query(
        &self,
        namespace: &str,
        options: &QueryOptions,
    ) -> impl Future<Output = Result<Vec<App>, ServiceError>> + Send;
}

/// A shared service is itself a service.
impl<S: AppService> AppService for Arc<S> {
    async fn put(&self, namespace: &str, draft: AppDraft) -> Result<App, ServiceError> {
        S::put(self, namespace, draft).await
    }

    async fn query(
        &self,
        namespace: &str,
        options: &QueryOptions,
    ) -> Result<Vec<App>, ServiceError> {
        S::query(self, namespace, options).await
    }
}

/// Name of an [`AppService`] method, used as a metric label and log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// [`AppService::put`].
    Put,
    /// [`AppService::query`].
    Query,
}

impl Method {
    /// The label value for this method.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Put => "Put",
            Self::Query => "Query",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
