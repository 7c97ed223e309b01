//! Axum router construction for the console.
//!
//! The API routes are wrapped by the middleware [`Chain`]. Static assets
//! and the shell page are served outside the chain with a plain
//! [`TraceLayer`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use console_app::AppService;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::Chain;
use crate::shell::Shell;
use crate::state::AppState;

/// Build the app API router wrapped by `chain`.
///
/// - `GET /api/apps/{id}` -- fetch one enabled app
/// - `GET /api/apps` -- list apps
/// - `POST /api/apps` -- create an app
pub fn api_router<S: AppService + 'static>(state: Arc<AppState<S>>, chain: &Chain) -> Router {
    let routes = Router::new()
        .route(
            "/api/apps",
            get(handlers::list_apps::<S>).post(handlers::create_app::<S>),
        )
        .route("/api/apps/{id}", get(handlers::retrieve_app::<S>))
        .with_state(state);

    chain.wrap(routes)
}

/// Build the router for static assets and the shell page.
///
/// - `GET /fonts/*`, `/scripts/*`, `/styles/*` -- files under `assets_dir`
/// - `GET` anything else -- the shell page
pub fn console_router(assets_dir: &Path, shell: Arc<Shell>) -> Router {
    let dir = |name: &str| -> PathBuf { assets_dir.join(name) };

    Router::new()
        .nest_service("/fonts", ServeDir::new(dir("fonts")))
        .nest_service("/scripts", ServeDir::new(dir("scripts")))
        .nest_service("/styles", ServeDir::new(dir("styles")))
        .fallback_service(get(move || {
            let shell = Arc::clone(&shell);
            async move { shell.render() }
        }))
        .layer(TraceLayer::new_for_http())
}

/// Build the complete console router.
pub fn build_router<S: AppService + 'static>(
    state: Arc<AppState<S>>,
    chain: &Chain,
    assets_dir: &Path,
    shell: Arc<Shell>,
) -> Router {
    api_router(state, chain).merge(console_router(assets_dir, shell))
}
