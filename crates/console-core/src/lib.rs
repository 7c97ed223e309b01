//! Core app operations for the administrative console.
//!
//! [`AppCore`] adapts any [`AppService`](console_app::AppService) into the
//! three operations the HTTP layer exposes: `create`, `list` and `fetch`.
//! It owns the small business rules that sit above the store: token
//! generation for new apps and not-found translation for lookups by id.
//!
//! # Modules
//!
//! - [`app`] -- [`AppCore`] operations
//! - [`token`] -- client/backend token pair generation
//! - [`error`] -- [`CoreError`] and [`TokenError`]

pub mod app;
pub mod error;
pub mod token;

pub use app::AppCore;
pub use error::{CoreError, TokenError};
pub use token::{TokenPair, generate_tokens};
