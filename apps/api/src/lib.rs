//! # Bazaar API Library
//!
//! HTTP surface of the Bazaar cart and order engine.
//!
//! ## Module Organization
//! ```text
//! bazaar_api/
//! ├── lib.rs          ◄─── You are here (exports, tracing setup)
//! ├── config.rs       ◄─── Environment configuration
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState, StoreError
//! │   ├── cart.rs     ◄─── Per-owner cart store
//! │   ├── order.rs    ◄─── Append-only order store
//! │   └── catalog.rs  ◄─── Price / availability lookup
//! ├── routes/
//! │   ├── mod.rs      ◄─── Router and request tracing
//! │   ├── cart.rs     ◄─── /api/cart handlers
//! │   ├── order.rs    ◄─── /api/orders handlers
//! │   └── health.rs   ◄─── /health
//! └── error.rs        ◄─── { code, message } error responses
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use tracing_subscriber::EnvFilter;

pub use config::{ApiConfig, ConfigError, StorageMode};
pub use error::{ApiError, ErrorCode};
pub use routes::router;
pub use state::{AppState, Catalog, DbCatalog, StaticCatalog, StoreError, StoreResult};

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bazaar_api=debug,bazaar_db=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
