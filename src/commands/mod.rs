pub mod advice;
pub mod plans;

use serde::Serialize;
use tracing::warn;

use crate::catalog::{seed_default_catalog, SeedSummary};
use crate::db::AppState;

/// Envelope returned by every caller-facing command. Failures never escape as
/// errors; check `success`.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResponse<T> {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data: Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl<T> CommandResponse<T> {
  pub fn ok(data: T) -> Self {
    Self {
      success: true,
      data: Some(data),
      message: None,
    }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self {
      success: false,
      data: None,
      message: Some(message.into()),
    }
  }

  /// Wrap a fallible result, logging and flattening the error into the message
  pub fn from_result<E: std::fmt::Display>(result: Result<T, E>, context: &str) -> Self {
    match result {
      Ok(data) => Self::ok(data),
      Err(e) => {
        warn!(error = %e, "{}", context);
        Self::error(format!("{}: {}", context, e))
      }
    }
  }
}

/// Load the built-in exercise catalog into the store
pub async fn seed_catalog(state: &AppState) -> CommandResponse<SeedSummary> {
  let result = seed_default_catalog(&state.store).await;
  CommandResponse::from_result(result, "Failed to seed exercise catalog")
}
