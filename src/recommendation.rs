//! Workout recommendation
//!
//! A recommendation is produced by walking a fixed cascade of steps. Each step
//! either settles on a recommendation or hands over to the next one:
//!
//! 1. `CheckUndertrained`: target undertrained groups. Use a saved plan if one
//!    fits, otherwise create (or reuse) the user's temporary plan.
//! 2. `CheckRested`: target rested groups that are due again. Saved plans only.
//! 3. `CheckAvailable`: rank every ready or rested group that is due and target
//!    the best. Use a saved plan if one fits, otherwise generate one.
//! 4. `Rest`: nothing suitable to train.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::history::load_training_history;
use crate::matcher::{find_matching_plan, PlanMatch};
use crate::models::{PlanType, TrainingGroup, WorkoutPlan};
use crate::planner::{build_plan, ensure_temporary_plan, PlanRequest, DEFAULT_PLAN_SETS};
use crate::status::{MuscleGroupAggregate, MuscleStatusReport};
use crate::store::{StoreError, TrainingStore};

/// Groups trained at least this many days ago are due regardless of volume
const DUE_AFTER_DAYS: i64 = 2;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
  ExistingPlan {
    plan: WorkoutPlan,
    reason: String,
    muscle_groups: Vec<TrainingGroup>,
  },
  TemporaryPlan {
    plan: WorkoutPlan,
    reason: String,
    muscle_groups: Vec<TrainingGroup>,
  },
  /// Generated on the fly and not saved
  GeneratedPlan {
    plan: WorkoutPlan,
    reason: String,
    muscle_groups: Vec<TrainingGroup>,
  },
  Rest {
    reason: String,
  },
}

impl Recommendation {
  pub fn rest() -> Self {
    Recommendation::Rest {
      reason: "Every muscle group is either recovering or was trained recently. Take a rest day."
        .to_string(),
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      Recommendation::ExistingPlan { .. } => "existing_plan",
      Recommendation::TemporaryPlan { .. } => "temporary_plan",
      Recommendation::GeneratedPlan { .. } => "generated_plan",
      Recommendation::Rest { .. } => "rest",
    }
  }

  pub fn plan(&self) -> Option<&WorkoutPlan> {
    match self {
      Recommendation::ExistingPlan { plan, .. }
      | Recommendation::TemporaryPlan { plan, .. }
      | Recommendation::GeneratedPlan { plan, .. } => Some(plan),
      Recommendation::Rest { .. } => None,
    }
  }

  pub fn muscle_groups(&self) -> &[TrainingGroup] {
    match self {
      Recommendation::ExistingPlan { muscle_groups, .. }
      | Recommendation::TemporaryPlan { muscle_groups, .. }
      | Recommendation::GeneratedPlan { muscle_groups, .. } => muscle_groups,
      Recommendation::Rest { .. } => &[],
    }
  }

  pub fn reason(&self) -> &str {
    match self {
      Recommendation::ExistingPlan { reason, .. }
      | Recommendation::TemporaryPlan { reason, .. }
      | Recommendation::GeneratedPlan { reason, .. }
      | Recommendation::Rest { reason } => reason,
    }
  }
}

fn group_list(groups: &[TrainingGroup]) -> String {
  groups.iter().map(|g| g.label()).collect::<Vec<_>>().join(", ")
}

fn existing_plan(found: PlanMatch, lead: &str, groups: Vec<TrainingGroup>) -> Recommendation {
  let reason = format!(
    "{}: {}. Your plan \"{}\" covers them.",
    lead,
    group_list(&groups),
    found.plan.name
  );
  Recommendation::ExistingPlan {
    plan: found.plan,
    reason,
    muscle_groups: groups,
  }
}

/// ---------------------------------------------------------------------------
/// Target Selection
/// ---------------------------------------------------------------------------

/// Pick the groups to train from an ordered candidate list.
///
/// The first major group becomes the primary target and brings along the first
/// of its synergists that is a minor candidate. Without a major group the
/// first two candidates are taken as-is.
pub fn select_targets(candidates: &[TrainingGroup]) -> Vec<TrainingGroup> {
  let Some(primary) = candidates.iter().copied().find(|g| g.is_major()) else {
    return candidates.iter().copied().take(2).collect();
  };

  let synergist = primary
    .synergists()
    .iter()
    .copied()
    .find(|g| g.is_minor() && candidates.contains(g));

  std::iter::once(primary).chain(synergist).collect()
}

/// A group is due when it was never trained, has had two days off, or has not
/// yet reached the bottom of its adaptive range.
pub fn is_due(aggregate: &MuscleGroupAggregate, mav_min: Option<f64>) -> bool {
  aggregate.last_trained.is_none()
    || aggregate.days_since_last_trained >= DUE_AFTER_DAYS
    || mav_min.is_some_and(|min| aggregate.accumulated_sets < min)
}

/// Order groups longest-rested first, then by size, then least volume first
pub fn rank_available(groups: &mut [TrainingGroup], report: &MuscleStatusReport) {
  groups.sort_by(|a, b| {
    let (Some(left), Some(right)) = (report.aggregate(*a), report.aggregate(*b)) else {
      return std::cmp::Ordering::Equal;
    };
    right
      .days_since_last_trained
      .cmp(&left.days_since_last_trained)
      .then(a.priority().cmp(&b.priority()))
      .then(left.accumulated_sets.total_cmp(&right.accumulated_sets))
  });
}

/// ---------------------------------------------------------------------------
/// Cascade
/// ---------------------------------------------------------------------------

pub struct RecommendationContext<'a> {
  pub user_id: &'a str,
  pub report: &'a MuscleStatusReport,
  pub engine: &'a EngineConfig,
  /// Size cap for generated plans
  pub max_exercises: usize,
}

impl RecommendationContext<'_> {
  fn due(&self, groups: &[TrainingGroup]) -> Vec<TrainingGroup> {
    groups
      .iter()
      .copied()
      .filter(|group| {
        let mav_min = self.engine.landmark(*group).map(|l| l.mav_min);
        self
          .report
          .aggregate(*group)
          .is_none_or(|aggregate| is_due(aggregate, mav_min))
      })
      .collect()
  }

  async fn find_plan<S: TrainingStore>(
    &self,
    store: &S,
    targets: &[TrainingGroup],
  ) -> Result<Option<PlanMatch>, StoreError> {
    find_matching_plan(
      store,
      self.user_id,
      targets,
      &self.report.status,
      &self.report.blocked,
    )
    .await
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
  CheckUndertrained,
  CheckRested,
  CheckAvailable,
  Rest,
}

impl CascadeStep {
  pub fn next(self) -> Option<CascadeStep> {
    match self {
      CascadeStep::CheckUndertrained => Some(CascadeStep::CheckRested),
      CascadeStep::CheckRested => Some(CascadeStep::CheckAvailable),
      CascadeStep::CheckAvailable => Some(CascadeStep::Rest),
      CascadeStep::Rest => None,
    }
  }

  /// Run one step. `None` hands over to the next step.
  pub async fn evaluate<S: TrainingStore>(
    self,
    store: &S,
    ctx: &RecommendationContext<'_>,
  ) -> Result<Option<Recommendation>, StoreError> {
    match self {
      CascadeStep::CheckUndertrained => check_undertrained(store, ctx).await,
      CascadeStep::CheckRested => check_rested(store, ctx).await,
      CascadeStep::CheckAvailable => check_available(store, ctx).await,
      CascadeStep::Rest => Ok(Some(Recommendation::rest())),
    }
  }
}

async fn check_undertrained<S: TrainingStore>(
  store: &S,
  ctx: &RecommendationContext<'_>,
) -> Result<Option<Recommendation>, StoreError> {
  let undertrained = &ctx.report.status.undertrained;
  if undertrained.is_empty() {
    return Ok(None);
  }

  let targets = select_targets(undertrained);
  if let Some(found) = ctx.find_plan(store, &targets).await? {
    return Ok(Some(existing_plan(found, "Undertrained", targets)));
  }

  let Some(plan) = ensure_temporary_plan(store, ctx.user_id, &targets).await? else {
    return Ok(None);
  };

  Ok(Some(Recommendation::TemporaryPlan {
    reason: format!(
      "Undertrained: {}. No saved plan fits, so \"{}\" was prepared.",
      group_list(&targets),
      plan.name
    ),
    plan,
    muscle_groups: targets,
  }))
}

async fn check_rested<S: TrainingStore>(
  store: &S,
  ctx: &RecommendationContext<'_>,
) -> Result<Option<Recommendation>, StoreError> {
  let rested = ctx.due(&ctx.report.status.rested);
  if rested.is_empty() {
    return Ok(None);
  }

  let targets = select_targets(&rested);
  let found = ctx.find_plan(store, &targets).await?;
  Ok(found.map(|found| existing_plan(found, "Rested and due", targets)))
}

async fn check_available<S: TrainingStore>(
  store: &S,
  ctx: &RecommendationContext<'_>,
) -> Result<Option<Recommendation>, StoreError> {
  let status = &ctx.report.status;
  let mut available: Vec<TrainingGroup> = ctx
    .due(&status.ready)
    .into_iter()
    .chain(ctx.due(&status.rested))
    .filter(|g| !status.overtrained.contains(g))
    .collect();
  if available.is_empty() {
    return Ok(None);
  }

  rank_available(&mut available, ctx.report);
  let targets = select_targets(&available);

  if let Some(found) = ctx.find_plan(store, &targets).await? {
    return Ok(Some(existing_plan(found, "Best recovered", targets)));
  }

  let training_type = targets.iter().map(|g| g.label()).collect::<Vec<_>>().join(" + ");
  let request =
    PlanRequest::for_groups(&targets, &training_type).with_max_exercises(ctx.max_exercises);
  let built = build_plan(store, &request, ctx.engine).await?;
  if built.exercises.is_empty() {
    debug!(?targets, "Generated plan came back empty");
    return Ok(None);
  }

  let name = format!("Generated: {}", training_type);
  let mut plan = WorkoutPlan::new(ctx.user_id, &name, PlanType::Custom);
  plan.description = format!(
    "{} compound and {} isolation exercises",
    built.compound_count, built.isolation_count
  );
  plan.is_generated = true;
  plan.exercises = built.planned_exercises(DEFAULT_PLAN_SETS);

  Ok(Some(Recommendation::GeneratedPlan {
    reason: format!(
      "Best recovered: {}. No saved plan fits, so a plan was generated.",
      group_list(&targets)
    ),
    plan,
    muscle_groups: targets,
  }))
}

/// Walk the cascade until a step settles on a recommendation
pub async fn synthesize<S: TrainingStore>(
  store: &S,
  ctx: &RecommendationContext<'_>,
) -> Result<Recommendation, StoreError> {
  let mut step = Some(CascadeStep::CheckUndertrained);

  while let Some(current) = step {
    if let Some(recommendation) = current.evaluate(store, ctx).await? {
      info!(
        user_id = ctx.user_id,
        step = ?current,
        kind = recommendation.kind(),
        groups = %group_list(recommendation.muscle_groups()),
        "Recommendation settled"
      );
      return Ok(recommendation);
    }
    debug!(step = ?current, "Cascade step passed");
    step = current.next();
  }

  Ok(Recommendation::rest())
}

/// Load a user's recent history and recommend their next workout
pub async fn recommend<S: TrainingStore>(
  store: &S,
  user_id: &str,
  engine: &EngineConfig,
  max_exercises: usize,
  now: DateTime<Utc>,
) -> Result<Recommendation, StoreError> {
  let history = load_training_history(store, user_id, now).await?;
  let report = MuscleStatusReport::from_history(&history, now, engine);

  let ctx = RecommendationContext {
    user_id,
    report: &report,
    engine,
    max_exercises,
  };
  synthesize(store, &ctx).await
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{ExercisePerformance, PlanFilter, SetRecord};
  use crate::planner::DEFAULT_MAX_EXERCISES;
  use crate::status::{classify, days_since, GroupAggregates};
  use crate::store::SqliteStore;
  use crate::test_utils::{
    date_days_ago, datetime_now, mock_workout, seed_test_exercises, setup_test_db, teardown_test_db,
    FailingStore,
  };

  fn uniform_report(sets: f64, days_ago: i64) -> MuscleStatusReport {
    let now = datetime_now();
    let engine = EngineConfig::default();
    let last_trained = Some(date_days_ago(days_ago));
    let aggregates: GroupAggregates = TrainingGroup::ALL
      .into_iter()
      .map(|group| {
        (
          group,
          MuscleGroupAggregate {
            accumulated_sets: sets,
            frequency: 1,
            last_trained,
            days_since_last_trained: days_since(last_trained, now),
          },
        )
      })
      .collect();

    MuscleStatusReport {
      status: classify(&aggregates, &engine),
      blocked: Vec::new(),
      aggregates,
      workout_count: 4,
    }
  }

  async fn run(store: &SqliteStore, report: &MuscleStatusReport) -> Recommendation {
    let engine = EngineConfig::default();
    let ctx = RecommendationContext {
      user_id: "u1",
      report,
      engine: &engine,
      max_exercises: DEFAULT_MAX_EXERCISES,
    };
    synthesize(store, &ctx).await.expect("cascade failed")
  }

  #[test]
  fn test_targets_pair_major_with_minor_synergist() {
    let all = TrainingGroup::ALL.to_vec();
    assert_eq!(select_targets(&all), vec![TrainingGroup::Chest, TrainingGroup::Triceps]);

    let back_day = [TrainingGroup::Back, TrainingGroup::RearDelts, TrainingGroup::Biceps];
    assert_eq!(select_targets(&back_day), vec![TrainingGroup::Back, TrainingGroup::Biceps]);

    // Rear delts is a synergist of back but not a minor group
    let no_minor = [TrainingGroup::Back, TrainingGroup::RearDelts];
    assert_eq!(select_targets(&no_minor), vec![TrainingGroup::Back]);

    let minors = [TrainingGroup::Biceps, TrainingGroup::Triceps, TrainingGroup::Core];
    assert_eq!(select_targets(&minors), vec![TrainingGroup::Biceps, TrainingGroup::Triceps]);

    assert!(select_targets(&[]).is_empty());
  }

  #[test]
  fn test_due_filter() {
    let aggregate = |sets: f64, days: Option<i64>| MuscleGroupAggregate {
      accumulated_sets: sets,
      frequency: 1,
      last_trained: days.map(date_days_ago),
      days_since_last_trained: days.unwrap_or(999),
    };

    assert!(is_due(&aggregate(20.0, None), Some(12.0)));
    assert!(is_due(&aggregate(20.0, Some(2)), Some(12.0)));
    assert!(is_due(&aggregate(8.0, Some(1)), Some(12.0)));
    assert!(!is_due(&aggregate(12.0, Some(1)), Some(12.0)));
    assert!(!is_due(&aggregate(8.0, Some(0)), None));
  }

  #[test]
  fn test_ranking_prefers_longest_rest_then_bigger_groups() {
    let mut report = uniform_report(12.0, 2);
    if let Some(core) = report.aggregates.get_mut(&TrainingGroup::Core) {
      core.days_since_last_trained = 5;
    }
    if let Some(chest) = report.aggregates.get_mut(&TrainingGroup::Chest) {
      chest.accumulated_sets = 10.0;
    }

    let mut groups = vec![
      TrainingGroup::Biceps,
      TrainingGroup::Back,
      TrainingGroup::Chest,
      TrainingGroup::Legs,
      TrainingGroup::Core,
    ];
    rank_available(&mut groups, &report);

    assert_eq!(
      groups,
      vec![
        TrainingGroup::Core,
        TrainingGroup::Legs,
        TrainingGroup::Chest,
        TrainingGroup::Back,
        TrainingGroup::Biceps,
      ]
    );
  }

  #[test]
  fn test_cascade_order() {
    assert_eq!(CascadeStep::CheckUndertrained.next(), Some(CascadeStep::CheckRested));
    assert_eq!(CascadeStep::CheckRested.next(), Some(CascadeStep::CheckAvailable));
    assert_eq!(CascadeStep::CheckAvailable.next(), Some(CascadeStep::Rest));
    assert_eq!(CascadeStep::Rest.next(), None);
  }

  #[tokio::test]
  async fn test_new_user_gets_a_temporary_plan_once() {
    let pool = setup_test_db().await;
    let store = SqliteStore::new(pool.clone());
    seed_test_exercises(&store).await;
    let engine = EngineConfig::default();

    let first = recommend(&store, "u1", &engine, DEFAULT_MAX_EXERCISES, datetime_now())
      .await
      .unwrap();

    let Recommendation::TemporaryPlan { plan, reason, muscle_groups } = &first else {
      panic!("expected temporary plan, got {:?}", first);
    };
    assert_eq!(muscle_groups, &vec![TrainingGroup::Chest, TrainingGroup::Triceps]);
    assert!(reason.contains("chest, triceps"));
    assert!(plan.temporary);
    assert!(!plan.exercises.is_empty());

    let second = recommend(&store, "u1", &engine, DEFAULT_MAX_EXERCISES, datetime_now())
      .await
      .unwrap();
    assert_eq!(second.kind(), "temporary_plan");
    assert_eq!(second.plan().and_then(|p| p.id), plan.id);

    let temporary = store.find_plans("u1", &PlanFilter::temporary(true)).await.unwrap();
    assert_eq!(temporary.len(), 1);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_saved_plan_beats_temporary_plan() {
    let pool = setup_test_db().await;
    let store = SqliteStore::new(pool.clone());
    seed_test_exercises(&store).await;
    store.create_plan(&WorkoutPlan::new("u1", "Leg Day", PlanType::Custom)).await.unwrap();
    store.create_plan(&WorkoutPlan::new("u1", "Push A", PlanType::Custom)).await.unwrap();

    let recommendation = recommend(&store, "u1", &EngineConfig::default(), 6, datetime_now())
      .await
      .unwrap();

    assert_eq!(recommendation.kind(), "existing_plan");
    assert_eq!(recommendation.plan().map(|p| p.name.as_str()), Some("Push A"));
    assert!(store.find_plans("u1", &PlanFilter::temporary(true)).await.unwrap().is_empty());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_empty_catalog_and_no_history_means_rest() {
    let pool = setup_test_db().await;
    let store = SqliteStore::new(pool.clone());

    let recommendation = recommend(&store, "u1", &EngineConfig::default(), 6, datetime_now())
      .await
      .unwrap();

    // Everything is undertrained, nothing can fill a temporary plan and
    // nothing is ready or rested.
    assert_eq!(recommendation.kind(), "rest");
    assert!(recommendation.muscle_groups().is_empty());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_rested_groups_match_saved_plans_only() {
    let pool = setup_test_db().await;
    let store = SqliteStore::new(pool.clone());
    seed_test_exercises(&store).await;
    let report = uniform_report(12.0, 4);
    assert_eq!(report.status.rested, TrainingGroup::ALL.to_vec());

    // No plan: the rested step passes and the available step generates
    let generated = run(&store, &report).await;
    let Recommendation::GeneratedPlan { plan, muscle_groups, .. } = &generated else {
      panic!("expected generated plan, got {:?}", generated);
    };
    assert_eq!(muscle_groups, &vec![TrainingGroup::Legs, TrainingGroup::Core]);
    assert!(plan.id.is_none());
    assert!(plan.is_generated);
    assert!(!plan.temporary);
    assert!(plan.exercises.len() <= DEFAULT_MAX_EXERCISES);
    assert!(store.find_plans("u1", &PlanFilter::default()).await.unwrap().is_empty());

    store.create_plan(&WorkoutPlan::new("u1", "Klatka + triceps", PlanType::Custom)).await.unwrap();
    let matched = run(&store, &report).await;
    assert_eq!(matched.kind(), "existing_plan");
    assert_eq!(matched.muscle_groups(), &[TrainingGroup::Chest, TrainingGroup::Triceps]);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_ready_groups_fall_back_to_generated_plan() {
    let pool = setup_test_db().await;
    let store = SqliteStore::new(pool.clone());
    seed_test_exercises(&store).await;
    let report = uniform_report(12.0, 2);
    assert_eq!(report.status.ready, TrainingGroup::ALL.to_vec());

    let recommendation = run(&store, &report).await;

    assert_eq!(recommendation.kind(), "generated_plan");
    assert_eq!(recommendation.muscle_groups(), &[TrainingGroup::Legs, TrainingGroup::Core]);
    assert!(recommendation.reason().contains("legs, core"));

    let json = serde_json::to_value(&recommendation).unwrap();
    assert_eq!(json["kind"], "generated_plan");
    assert_eq!(json["muscle_groups"][0], "legs");

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_ready_groups_prefer_saved_plan() {
    let pool = setup_test_db().await;
    let store = SqliteStore::new(pool.clone());
    seed_test_exercises(&store).await;
    store
      .create_plan(&WorkoutPlan::new("u1", "Leg + core day", PlanType::Custom))
      .await
      .unwrap();
    let report = uniform_report(12.0, 2);
    assert_eq!(report.status.ready, TrainingGroup::ALL.to_vec());

    let recommendation = run(&store, &report).await;

    assert_eq!(recommendation.kind(), "existing_plan");
    assert_eq!(recommendation.muscle_groups(), &[TrainingGroup::Legs, TrainingGroup::Core]);
    assert_eq!(recommendation.plan().map(|p| p.name.as_str()), Some("Leg + core day"));
    assert!(recommendation.reason().starts_with("Best recovered"));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_overtrained_everywhere_means_rest() {
    let pool = setup_test_db().await;
    let store = SqliteStore::new(pool.clone());
    seed_test_exercises(&store).await;
    let report = uniform_report(30.0, 2);
    assert_eq!(report.status.overtrained, TrainingGroup::ALL.to_vec());

    let recommendation = run(&store, &report).await;

    assert_eq!(recommendation.kind(), "rest");
    let json = serde_json::to_value(&recommendation).unwrap();
    assert_eq!(json["kind"], "rest");
    assert!(json["reason"].is_string());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_recent_leg_work_steers_away_from_legs() {
    let pool = setup_test_db().await;
    let store = SqliteStore::new(pool.clone());
    seed_test_exercises(&store).await;

    let squats = ExercisePerformance::new("Back Squat", vec![SetRecord::new("100", "5"); 14]);
    store
      .insert_workout(&mock_workout("u1", date_days_ago(0), vec![squats]))
      .await
      .unwrap();
    store.create_plan(&WorkoutPlan::new("u1", "Leg Day", PlanType::Custom)).await.unwrap();

    let recommendation = recommend(&store, "u1", &EngineConfig::default(), 6, datetime_now())
      .await
      .unwrap();

    assert!(!recommendation.muscle_groups().contains(&TrainingGroup::Legs));
    assert_ne!(recommendation.plan().map(|p| p.name.as_str()), Some("Leg Day"));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_store_failure_is_an_error() {
    let result = recommend(&FailingStore, "u1", &EngineConfig::default(), 6, datetime_now()).await;
    assert!(result.is_err());
  }
}
