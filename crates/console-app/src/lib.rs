//! App records and the service pipeline behind the administrative console.
//!
//! An [`App`] is a tenant application with a client token and a backend
//! token. Everything that touches apps goes through the narrow
//! [`AppService`] contract (`put` and `query`), which lets cross-cutting
//! concerns be layered on as decorators without the stores knowing.
//!
//! # Pipeline
//!
//! ```text
//! caller
//!   |
//!   +-- LogService          (one structured record per call)
//!        |
//!        +-- InstrumentService   (op/err counters, latency histogram)
//!             |
//!             +-- AppStore       (PostgresService | MemoryService)
//! ```
//!
//! # Modules
//!
//! - [`model`] -- `App`, `AppDraft`, `QueryOptions`
//! - [`service`] -- the [`AppService`] contract and method names
//! - [`postgres`] -- `PostgreSQL` backed store
//! - [`memory`] -- in-process store
//! - [`store`] -- runtime selection between the two stores
//! - [`metrics`] -- recorder contract, Prometheus and counting recorders
//! - [`instrument`] -- instrumentation decorator
//! - [`log`] -- structured logging decorator
//! - [`error`] -- shared error type

pub mod error;
pub mod instrument;
pub mod log;
pub mod memory;
pub mod metrics;
pub mod model;
pub mod postgres;
pub mod service;
pub mod store;

// Re-export primary types for convenience.
pub use error::ServiceError;
pub use instrument::InstrumentService;
pub use log::LogService;
pub use memory::MemoryService;
pub use metrics::{CountingRecorder, KeyMetrics, Recorder};
pub use model::{App, AppDraft, NAMESPACE_DEFAULT, QueryOptions};
pub use postgres::{PostgresConfig, PostgresService};
pub use service::{AppService, Method};
pub use store::{AppStore, StoreKind};
