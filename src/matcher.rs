//! Matching a user's saved plans against the groups we want to train
//!
//! A plan's targets are inferred from keywords in its name. This is loose by
//! nature ("Push A" targets chest, front delts and triceps) and is kept that
//! way so matching stays predictable for users who name plans by split.

use tracing::debug;

use crate::models::{PlanFilter, TrainingGroup, WorkoutPlan};
use crate::status::MuscleStatus;
use crate::store::{StoreError, TrainingStore};

const BLOCKED_WEIGHT: i32 = -500;
const OVERTRAINED_WEIGHT: i32 = -100;
const UNDERTRAINED_WEIGHT: i32 = 50;
const RESTED_WEIGHT: i32 = 30;
const REQUESTED_WEIGHT: i32 = 20;

#[derive(Debug, Clone)]
pub struct PlanMatch {
  pub plan: WorkoutPlan,
  pub score: i32,
  pub targets: Vec<TrainingGroup>,
}

/// Groups a plan name suggests it trains, in canonical group order
pub fn plan_targets(name: &str) -> Vec<TrainingGroup> {
  let lowered = name.to_lowercase();
  TrainingGroup::ALL
    .into_iter()
    .filter(|group| group.plan_keywords().iter().any(|k| lowered.contains(k)))
    .collect()
}

pub fn score_plan(
  targets: &[TrainingGroup],
  requested: &[TrainingGroup],
  status: &MuscleStatus,
  blocked: &[TrainingGroup],
) -> i32 {
  let overlap = |set: &[TrainingGroup]| targets.iter().filter(|g| set.contains(g)).count() as i32;

  BLOCKED_WEIGHT * overlap(blocked)
    + OVERTRAINED_WEIGHT * overlap(&status.overtrained)
    + UNDERTRAINED_WEIGHT * overlap(&status.undertrained)
    + RESTED_WEIGHT * overlap(&status.rested)
    + REQUESTED_WEIGHT * overlap(requested)
}

/// Highest-scoring plan with a strictly positive score. Earlier plans win ties.
pub fn best_match(
  plans: Vec<WorkoutPlan>,
  requested: &[TrainingGroup],
  status: &MuscleStatus,
  blocked: &[TrainingGroup],
) -> Option<PlanMatch> {
  let mut best: Option<PlanMatch> = None;

  for plan in plans {
    let targets = plan_targets(&plan.name);
    let score = score_plan(&targets, requested, status, blocked);
    debug!(plan = %plan.name, score, "Scored plan");

    if best.as_ref().is_none_or(|b| score > b.score) {
      best = Some(PlanMatch { plan, score, targets });
    }
  }

  best.filter(|m| m.score > 0)
}

/// Look for a saved, non-temporary plan that suits the requested groups
pub async fn find_matching_plan<S: TrainingStore>(
  store: &S,
  user_id: &str,
  requested: &[TrainingGroup],
  status: &MuscleStatus,
  blocked: &[TrainingGroup],
) -> Result<Option<PlanMatch>, StoreError> {
  let plans = store.find_plans(user_id, &PlanFilter::temporary(false)).await?;
  if plans.is_empty() {
    return Ok(None);
  }
  Ok(best_match(plans, requested, status, blocked))
}
