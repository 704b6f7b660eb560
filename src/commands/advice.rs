//! Recommendation and recovery-status commands

use chrono::Utc;

use super::CommandResponse;
use crate::db::AppState;
use crate::history::load_training_history;
use crate::recommendation::{recommend, Recommendation};
use crate::status::MuscleStatusReport;

/// Recommend the user's next workout
pub async fn suggest(state: &AppState, user_id: &str) -> CommandResponse<Recommendation> {
  let result = recommend(
    &state.store,
    user_id,
    &state.engine,
    state.config.max_exercises,
    Utc::now(),
  )
  .await;

  CommandResponse::from_result(result, "Failed to build recommendation")
}

/// Per-group recovery state over the last week
pub async fn muscle_status(state: &AppState, user_id: &str) -> CommandResponse<MuscleStatusReport> {
  let now = Utc::now();
  let result = load_training_history(&state.store, user_id, now)
    .await
    .map(|history| MuscleStatusReport::from_history(&history, now, &state.engine));

  CommandResponse::from_result(result, "Failed to load muscle status")
}
