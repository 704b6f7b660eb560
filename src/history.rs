//! Training history aggregation
//!
//! Rebuilds per-part training load from the last seven days of workouts on
//! every request. Two passes over the same workouts:
//! - volume: weighted effective sets and last-trained date
//! - frequency: distinct days on which any work touched a part
//!
//! The passes gate sets differently on purpose. Volume only counts sets with
//! 1-50 reps, frequency counts any set with reps > 0.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::engagement::resolve_engagement;
use crate::models::{EngagementMap, ExercisePerformance, PartMap, WorkoutRecord};
use crate::store::{StoreError, TrainingStore, WorkoutQuery};

pub const HISTORY_WINDOW_DAYS: i64 = 7;

const MIN_EFFECTIVE_REPS: f64 = 1.0;
const MAX_EFFECTIVE_REPS: f64 = 50.0;

/// Engagement at or above this earns full set credit
const FULL_CREDIT_ENGAGEMENT: f64 = 50.0;
/// Engagement at or above this (and below full) earns half credit
const HALF_CREDIT_ENGAGEMENT: f64 = 30.0;

/// ---------------------------------------------------------------------------
/// Per-part Statistics
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MusclePartStat {
  /// Weighted effective set count, not a raw count
  pub accumulated_sets: f64,
  /// Distinct workout days that touched this part
  pub frequency: u32,
  pub last_trained: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct TrainingHistory {
  pub parts: PartMap<MusclePartStat>,
  pub workout_count: usize,
}

/// Sets whose reps fall within the effective range
pub fn effective_set_count(performance: &ExercisePerformance) -> usize {
  performance
    .sets
    .iter()
    .filter(|s| {
      let reps = s.reps_value();
      (MIN_EFFECTIVE_REPS..=MAX_EFFECTIVE_REPS).contains(&reps)
    })
    .count()
}

/// Set credit a part receives for a given engagement percentage
pub fn weighted_sets(effective_sets: f64, engagement: f64) -> f64 {
  if engagement >= FULL_CREDIT_ENGAGEMENT {
    effective_sets
  } else if engagement >= HALF_CREDIT_ENGAGEMENT {
    effective_sets * 0.5
  } else {
    effective_sets * engagement / 100.0
  }
}

/// ---------------------------------------------------------------------------
/// Aggregation
/// ---------------------------------------------------------------------------

/// Aggregate workouts into per-part statistics.
///
/// `engagements` maps exercise names to their resolved engagement. Names that
/// are missing (unknown exercises) or resolve to an empty map contribute
/// nothing.
pub fn aggregate_history(
  workouts: &[WorkoutRecord],
  engagements: &HashMap<String, EngagementMap>,
) -> TrainingHistory {
  let mut parts: PartMap<MusclePartStat> = PartMap::default();

  // Volume pass
  for workout in workouts {
    for performance in &workout.exercises {
      let Some(engagement) = engagements.get(&performance.name).filter(|e| !e.is_empty()) else {
        continue;
      };

      let effective = effective_set_count(performance);
      if effective == 0 {
        continue;
      }

      for (part, percent) in engagement.engaged() {
        let stat = &mut parts[part];
        stat.accumulated_sets += weighted_sets(effective as f64, percent);
        stat.last_trained = stat.last_trained.max(Some(workout.date));
      }
    }
  }

  // Frequency pass
  let mut trained_by_day: BTreeMap<NaiveDate, PartMap<bool>> = BTreeMap::new();
  for workout in workouts {
    for performance in &workout.exercises {
      let Some(engagement) = engagements.get(&performance.name) else {
        continue;
      };
      if !performance.sets.iter().any(|s| s.reps_value() > 0.0) {
        continue;
      }

      let day = trained_by_day.entry(workout.date).or_default();
      for (part, _) in engagement.engaged() {
        day[part] = true;
      }
    }
  }

  for day in trained_by_day.values() {
    for (part, trained) in day.iter() {
      if *trained {
        parts[part].frequency += 1;
      }
    }
  }

  TrainingHistory {
    parts,
    workout_count: workouts.len(),
  }
}

/// Resolve the engagement of every distinct exercise named in the workouts.
/// One lookup per name; unknown names are left out of the map.
pub async fn resolve_workout_engagements<S: TrainingStore>(
  store: &S,
  workouts: &[WorkoutRecord],
) -> Result<HashMap<String, EngagementMap>, StoreError> {
  let mut resolved = HashMap::new();
  let mut unknown: Vec<&str> = Vec::new();

  for performance in workouts.iter().flat_map(|w| w.exercises.iter()) {
    let name = performance.name.as_str();
    if resolved.contains_key(name) || unknown.contains(&name) {
      continue;
    }
    match store.find_exercise_by_name(name).await? {
      Some(definition) => {
        resolved.insert(name.to_string(), resolve_engagement(&definition));
      }
      None => {
        debug!(exercise = name, "Skipping unknown exercise in history");
        unknown.push(name);
      }
    }
  }

  Ok(resolved)
}

/// Load and aggregate the trailing window of history for a user.
///
/// The window has no upper bound: a workout logged under a local date that is
/// already tomorrow in UTC still counts.
pub async fn load_training_history<S: TrainingStore>(
  store: &S,
  user_id: &str,
  now: DateTime<Utc>,
) -> Result<TrainingHistory, StoreError> {
  let since = now.date_naive() - Duration::days(HISTORY_WINDOW_DAYS);
  let query = WorkoutQuery::for_user(user_id).since(since);

  let workouts = store.find_workouts(&query).await?;
  let engagements = resolve_workout_engagements(store, &workouts).await?;
  let history = aggregate_history(&workouts, &engagements);

  debug!(
    user_id,
    workouts = history.workout_count,
    exercises = engagements.len(),
    "Aggregated training history"
  );

  Ok(history)
}
