pub mod catalog;
pub mod commands;
pub mod config;
pub mod db;
pub mod engagement;
pub mod history;
pub mod matcher;
pub mod models;
pub mod planner;
pub mod recommendation;
pub mod safety;
pub mod status;
pub mod store;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{AdvisorConfig, EngineConfig};
pub use db::AppState;
pub use recommendation::Recommendation;
pub use store::{SqliteStore, StoreError, TrainingStore};

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
    .with(fmt::layer().with_writer(std::io::stderr))
    .init();
}
