//! Plan building from the exercise catalog
//!
//! Two builders live here. `build_optimal_plan` scores the whole catalog
//! against a list of target parts and fills a plan compounds-first. The
//! temporary-plan path is a narrower variant used when a user has undertrained
//! groups and no saved plan covers them.

use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::engagement::resolve_engagement;
use crate::models::{
  expand_groups, EngagementMap, ExerciseDefinition, ExerciseType, MusclePart, PlanFilter, PlanType,
  PlannedExercise, TrainingGroup, WorkoutPlan,
};
use crate::safety::{validate_plan, BalanceReport, PlanEngagement, SafetyReport};
use crate::store::{StoreError, TrainingStore};

pub const DEFAULT_MAX_EXERCISES: usize = 6;
/// Sets per exercise in plans the engine writes itself
pub const DEFAULT_PLAN_SETS: u32 = 3;

/// A candidate must engage at least one target part this much to qualify
pub const PRIMARY_ENGAGEMENT_THRESHOLD: f64 = 50.0;
const COMPOUND_BONUS: f64 = 50.0;

/// Temporary plans accept anything strictly above this on a target part
pub const TEMPORARY_ENGAGEMENT_THRESHOLD: f64 = 30.0;
pub const TEMPORARY_PLAN_SIZE: usize = 6;

/// ---------------------------------------------------------------------------
/// Optimal Plan Builder
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PlanRequest {
  pub parts: Vec<MusclePart>,
  /// Informational label carried into the result
  pub training_type: String,
  pub max_exercises: usize,
}

impl PlanRequest {
  pub fn new(parts: Vec<MusclePart>, training_type: &str) -> Self {
    Self {
      parts,
      training_type: training_type.to_string(),
      max_exercises: DEFAULT_MAX_EXERCISES,
    }
  }

  pub fn for_groups(groups: &[TrainingGroup], training_type: &str) -> Self {
    Self::new(expand_groups(groups), training_type)
  }

  pub fn with_max_exercises(mut self, max_exercises: usize) -> Self {
    self.max_exercises = max_exercises;
    self
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanBuildResult {
  pub success: bool,
  pub training_type: String,
  pub exercises: Vec<ExerciseDefinition>,
  pub compound_count: usize,
  pub isolation_count: usize,
  pub engagement: Option<PlanEngagement>,
  pub safety: Option<SafetyReport>,
  pub balance: Option<BalanceReport>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

impl PlanBuildResult {
  pub fn failure(training_type: &str, error: impl Into<String>) -> Self {
    Self {
      success: false,
      training_type: training_type.to_string(),
      exercises: Vec::new(),
      compound_count: 0,
      isolation_count: 0,
      engagement: None,
      safety: None,
      balance: None,
      error: Some(error.into()),
    }
  }

  /// Planned exercises at the given set count, in selection order
  pub fn planned_exercises(&self, num_sets: u32) -> Vec<PlannedExercise> {
    self
      .exercises
      .iter()
      .map(|e| PlannedExercise {
        name: e.name.clone(),
        num_sets,
      })
      .collect()
  }
}

/// Score an exercise against the target parts, or `None` if no target part
/// reaches the primary engagement threshold.
pub fn score_candidate(
  exercise: &ExerciseDefinition,
  engagement: &EngagementMap,
  parts: &[MusclePart],
) -> Option<f64> {
  let qualifies = parts
    .iter()
    .any(|p| engagement[*p] >= PRIMARY_ENGAGEMENT_THRESHOLD);
  if !qualifies {
    return None;
  }

  let bonus = if exercise.is_compound() { COMPOUND_BONUS } else { 0.0 };
  let coverage: f64 = parts
    .iter()
    .map(|p| engagement[*p])
    .filter(|v| *v > 0.0)
    .sum();

  Some(bonus + coverage)
}

/// Pick up to `max` exercises: compounds by score first, then isolations.
/// Deterministic for a given catalog order.
pub fn select_exercises(
  catalog: Vec<ExerciseDefinition>,
  parts: &[MusclePart],
  max: usize,
) -> Vec<ExerciseDefinition> {
  let mut scored: Vec<(f64, ExerciseDefinition)> = catalog
    .into_iter()
    .filter_map(|exercise| {
      let engagement = resolve_engagement(&exercise);
      score_candidate(&exercise, &engagement, parts).map(|score| (score, exercise))
    })
    .collect();

  // Stable, so equal scores keep catalog order
  scored.sort_by(|a, b| b.0.total_cmp(&a.0));

  let mut selected: Vec<ExerciseDefinition> = Vec::new();
  let mut names: HashSet<String> = HashSet::new();

  for pass in [ExerciseType::Compound, ExerciseType::Isolation] {
    for (_, exercise) in scored.iter().filter(|(_, e)| e.exercise_type == pass) {
      if selected.len() >= max {
        break;
      }
      if names.insert(exercise.name.clone()) {
        selected.push(exercise.clone());
      }
    }
  }

  selected
}

/// Build a plan for the requested parts from the full catalog
pub async fn build_plan<S: TrainingStore>(
  store: &S,
  request: &PlanRequest,
  config: &EngineConfig,
) -> Result<PlanBuildResult, StoreError> {
  let catalog = store.find_all_exercises().await?;

  let exercises = select_exercises(catalog, &request.parts, request.max_exercises);
  let count_of = |kind: ExerciseType| exercises.iter().filter(|e| e.exercise_type == kind).count();
  let compound_count = count_of(ExerciseType::Compound);
  let isolation_count = count_of(ExerciseType::Isolation);
  let validation = validate_plan(&exercises, config);

  for warning in &validation.safety.warnings {
    debug!(message = %warning.message, "Plan volume warning");
  }
  for warning in &validation.balance.warnings {
    debug!(message = %warning.message, "Plan balance warning");
  }

  info!(
    training_type = %request.training_type,
    parts = request.parts.len(),
    selected = exercises.len(),
    compound_count,
    isolation_count,
    "Built plan"
  );

  Ok(PlanBuildResult {
    success: true,
    training_type: request.training_type.clone(),
    exercises,
    compound_count,
    isolation_count,
    engagement: Some(validation.engagement),
    safety: Some(validation.safety),
    balance: Some(validation.balance),
    error: None,
  })
}

/// Like `build_plan`, but store failures come back as an unsuccessful result
pub async fn build_optimal_plan<S: TrainingStore>(
  store: &S,
  request: &PlanRequest,
  config: &EngineConfig,
) -> PlanBuildResult {
  match build_plan(store, request, config).await {
    Ok(result) => result,
    Err(e) => {
      warn!(error = %e, "Failed to build plan");
      PlanBuildResult::failure(&request.training_type, e.to_string())
    }
  }
}

/// ---------------------------------------------------------------------------
/// Temporary Plans
/// ---------------------------------------------------------------------------

/// Exercises engaging any target part above the temporary threshold,
/// compounds ahead of everything else, otherwise in catalog order.
pub fn select_temporary_exercises(
  catalog: Vec<ExerciseDefinition>,
  parts: &[MusclePart],
) -> Vec<ExerciseDefinition> {
  let mut matching: Vec<ExerciseDefinition> = catalog
    .into_iter()
    .filter(|exercise| {
      let engagement = resolve_engagement(exercise);
      parts
        .iter()
        .any(|p| engagement[*p] > TEMPORARY_ENGAGEMENT_THRESHOLD)
    })
    .collect();

  matching.sort_by_key(|e| !e.is_compound());
  matching.truncate(TEMPORARY_PLAN_SIZE);
  matching
}

fn temporary_plan_name(groups: &[TrainingGroup]) -> String {
  let labels: Vec<&str> = groups.iter().map(|g| g.label()).collect();
  format!("Quick session: {}", labels.join(" + "))
}

/// Return the user's temporary plan, creating one for `groups` if none exists.
///
/// At most one temporary plan per user is kept by check-then-create. Two
/// concurrent calls for the same user can both see no plan and both create
/// one; that gap is accepted and callers reuse whichever they find first.
///
/// Returns `None` when no catalog exercise fits the groups; nothing is created.
pub async fn ensure_temporary_plan<S: TrainingStore>(
  store: &S,
  user_id: &str,
  groups: &[TrainingGroup],
) -> Result<Option<WorkoutPlan>, StoreError> {
  let existing = store.find_plans(user_id, &PlanFilter::temporary(true)).await?;
  if let Some(plan) = existing.into_iter().next() {
    info!(user_id, plan = %plan.name, "Reusing temporary plan");
    return Ok(Some(plan));
  }

  let parts = expand_groups(groups);
  let exercises = select_temporary_exercises(store.find_all_exercises().await?, &parts);
  if exercises.is_empty() {
    debug!(user_id, ?groups, "No exercises fit a temporary plan");
    return Ok(None);
  }

  let mut plan = WorkoutPlan::new(user_id, &temporary_plan_name(groups), PlanType::Custom);
  plan.description = format!(
    "Generated for undertrained groups: {}",
    groups.iter().map(|g| g.label()).collect::<Vec<_>>().join(", ")
  );
  plan.is_generated = true;
  plan.temporary = true;
  plan.exercises = exercises
    .iter()
    .map(|e| PlannedExercise {
      name: e.name.clone(),
      num_sets: DEFAULT_PLAN_SETS,
    })
    .collect();

  let created = store.create_plan(&plan).await?;
  info!(
    user_id,
    plan = %created.name,
    exercises = created.exercises.len(),
    "Created temporary plan"
  );

  Ok(Some(created))
}
