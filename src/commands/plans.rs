//! Plan generation and validation commands

use serde::Serialize;
use tracing::debug;

use super::CommandResponse;
use crate::db::AppState;
use crate::models::{ExerciseDefinition, MusclePart};
use crate::planner::{build_optimal_plan, PlanBuildResult, PlanRequest};
use crate::safety::{validate_plan, PlanValidation};
use crate::store::{StoreError, TrainingStore};

/// Build a plan for the given muscle parts. `max_exercises` falls back to the
/// configured default.
pub async fn generate(
  state: &AppState,
  parts: &[MusclePart],
  training_type: &str,
  max_exercises: Option<usize>,
) -> PlanBuildResult {
  if parts.is_empty() {
    return PlanBuildResult::failure(training_type, "No target muscle parts given");
  }

  let request = PlanRequest::new(parts.to_vec(), training_type)
    .with_max_exercises(max_exercises.unwrap_or(state.config.max_exercises));
  build_optimal_plan(&state.store, &request, &state.engine).await
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
  /// Names that resolved to a known exercise, in input order
  pub exercises: Vec<String>,
  /// Names with no matching exercise; they are left out of the analysis
  pub unknown: Vec<String>,
  #[serde(flatten)]
  pub validation: PlanValidation,
}

async fn resolve_names<S: TrainingStore>(
  store: &S,
  names: &[String],
) -> Result<(Vec<ExerciseDefinition>, Vec<String>), StoreError> {
  let mut found = Vec::new();
  let mut unknown = Vec::new();
  for name in names {
    match store.find_exercise_by_name(name.trim()).await? {
      Some(exercise) => found.push(exercise),
      None => {
        debug!(exercise = %name, "Unknown exercise in validation request");
        unknown.push(name.clone());
      }
    }
  }
  Ok((found, unknown))
}

/// Check a list of exercises for volume and antagonist balance
pub async fn validate(state: &AppState, names: &[String]) -> CommandResponse<ValidationReport> {
  let result = resolve_names(&state.store, names)
    .await
    .map(|(exercises, unknown)| ValidationReport {
      exercises: exercises.iter().map(|e| e.name.clone()).collect(),
      unknown,
      validation: validate_plan(&exercises, &state.engine),
    });

  CommandResponse::from_result(result, "Failed to validate exercises")
}
