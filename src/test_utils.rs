//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Database setup/teardown
//! - Exercise and workout factories
//! - A store that always fails
//! - Helper assertions

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::models::{
  ExerciseDefinition, ExercisePerformance, ExerciseType, MuscleGroup, MusclePart, PlanFilter,
  SetRecord, WorkoutPlan, WorkoutRecord,
};
use crate::store::{StoreError, TrainingStore, WorkoutQuery};

/// ---------------------------------------------------------------------------
/// Database Test Utilities
/// ---------------------------------------------------------------------------

/// Create an in-memory SQLite database for testing
/// Runs all migrations and returns a ready-to-use pool
///
/// Uses max_connections(1) to prevent multiple pool connections from creating
/// isolated in-memory databases, which would cause intermittent test failures
pub async fn setup_test_db() -> SqlitePool {
  let pool = sqlx::sqlite::SqlitePoolOptions::new()
    .max_connections(1)
    .connect("sqlite::memory:")
    .await
    .expect("Failed to create in-memory database");

  sqlx::migrate!("./migrations")
    .run(&pool)
    .await
    .expect("Failed to run migrations");

  pool
}

/// Close a test database pool
pub async fn teardown_test_db(pool: SqlitePool) {
  pool.close().await;
}

/// A small catalog covering every training group.
/// "Leg Extension" and "Leg Curl" engage a single part each.
pub fn test_exercises() -> Vec<ExerciseDefinition> {
  vec![
    ExerciseDefinition::new("Bench Press", MuscleGroup::Chest, ExerciseType::Compound)
      .with_engagement(&[
        (MusclePart::MiddleChest, 90.0),
        (MusclePart::UpperChest, 40.0),
        (MusclePart::Triceps, 40.0),
        (MusclePart::FrontDelts, 30.0),
      ]),
    ExerciseDefinition::new("Incline Dumbbell Press", MuscleGroup::Chest, ExerciseType::Compound)
      .with_engagement(&[
        (MusclePart::UpperChest, 90.0),
        (MusclePart::FrontDelts, 50.0),
        (MusclePart::Triceps, 30.0),
      ]),
    ExerciseDefinition::new("Cable Fly", MuscleGroup::Chest, ExerciseType::Isolation)
      .with_engagement(&[(MusclePart::MiddleChest, 85.0)]),
    ExerciseDefinition::new("Triceps Pushdown", MuscleGroup::Arms, ExerciseType::Isolation)
      .with_engagement(&[(MusclePart::Triceps, 95.0)]),
    ExerciseDefinition::new("Barbell Row", MuscleGroup::Back, ExerciseType::Compound)
      .with_engagement(&[
        (MusclePart::UpperBack, 80.0),
        (MusclePart::Lats, 70.0),
        (MusclePart::Biceps, 40.0),
        (MusclePart::RearDelts, 40.0),
      ]),
    ExerciseDefinition::new("Biceps Curl", MuscleGroup::Arms, ExerciseType::Isolation)
      .with_engagement(&[(MusclePart::Biceps, 95.0), (MusclePart::Forearms, 30.0)]),
    ExerciseDefinition::new("Overhead Press", MuscleGroup::Shoulders, ExerciseType::Compound)
      .with_engagement(&[
        (MusclePart::FrontDelts, 90.0),
        (MusclePart::SideDelts, 50.0),
        (MusclePart::Triceps, 50.0),
      ]),
    ExerciseDefinition::new("Lateral Raise", MuscleGroup::Shoulders, ExerciseType::Isolation)
      .with_engagement(&[(MusclePart::SideDelts, 95.0)]),
    ExerciseDefinition::new("Back Squat", MuscleGroup::Legs, ExerciseType::Compound)
      .with_engagement(&[
        (MusclePart::Quads, 90.0),
        (MusclePart::Glutes, 80.0),
        (MusclePart::Hamstrings, 40.0),
        (MusclePart::LowerBack, 30.0),
        (MusclePart::UpperAbs, 20.0),
      ]),
    ExerciseDefinition::new("Leg Extension", MuscleGroup::Legs, ExerciseType::Isolation)
      .with_engagement(&[(MusclePart::Quads, 90.0)]),
    ExerciseDefinition::new("Leg Curl", MuscleGroup::Legs, ExerciseType::Isolation)
      .with_engagement(&[(MusclePart::Hamstrings, 90.0)]),
    // No engagement map: resolves to 80 on every core part
    ExerciseDefinition::new("Hanging Leg Raise", MuscleGroup::Core, ExerciseType::Isolation),
  ]
}

/// Seed the store with `test_exercises()`
pub async fn seed_test_exercises<S: TrainingStore>(store: &S) {
  for exercise in test_exercises() {
    store
      .insert_exercise(&exercise)
      .await
      .expect("Failed to insert test exercise");
  }
}

/// Seed one single-exercise workout per entry, `(days_ago, exercise, set count)`.
/// Every set is 8 reps. Returns the IDs of created workouts.
pub async fn seed_test_workouts<S: TrainingStore>(
  store: &S,
  user_id: &str,
  entries: &[(i64, &str, usize)],
) -> Vec<i64> {
  let mut ids = Vec::new();
  for (days_ago, name, sets) in entries {
    let performance = ExercisePerformance::new(name, vec![SetRecord::new("60", "8"); *sets]);
    let id = store
      .insert_workout(&mock_workout(user_id, date_days_ago(*days_ago), vec![performance]))
      .await
      .expect("Failed to insert test workout");
    ids.push(id);
  }
  ids
}

/// ---------------------------------------------------------------------------
/// Mock Data Factories
/// ---------------------------------------------------------------------------

pub fn mock_workout(
  user_id: &str,
  date: NaiveDate,
  exercises: Vec<ExercisePerformance>,
) -> WorkoutRecord {
  WorkoutRecord {
    id: None,
    user_id: user_id.to_string(),
    date,
    exercises,
  }
}

/// Store whose every call fails, for exercising error paths
pub struct FailingStore;

impl FailingStore {
  fn error() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
  }
}

impl TrainingStore for FailingStore {
  async fn find_exercise_by_name(
    &self,
    _name: &str,
  ) -> Result<Option<ExerciseDefinition>, StoreError> {
    Err(Self::error())
  }

  async fn find_all_exercises(&self) -> Result<Vec<ExerciseDefinition>, StoreError> {
    Err(Self::error())
  }

  async fn find_workouts(&self, _query: &WorkoutQuery) -> Result<Vec<WorkoutRecord>, StoreError> {
    Err(Self::error())
  }

  async fn find_plans(
    &self,
    _user_id: &str,
    _filter: &PlanFilter,
  ) -> Result<Vec<WorkoutPlan>, StoreError> {
    Err(Self::error())
  }

  async fn create_plan(&self, _plan: &WorkoutPlan) -> Result<WorkoutPlan, StoreError> {
    Err(Self::error())
  }

  async fn insert_exercise(&self, _exercise: &ExerciseDefinition) -> Result<i64, StoreError> {
    Err(Self::error())
  }

  async fn insert_workout(&self, _workout: &WorkoutRecord) -> Result<i64, StoreError> {
    Err(Self::error())
  }
}

/// ---------------------------------------------------------------------------
/// Time Helpers
/// ---------------------------------------------------------------------------

/// Create a DateTime N days ago from now
pub fn datetime_days_ago(days: i64) -> DateTime<Utc> {
  Utc::now() - Duration::days(days)
}

/// Create a DateTime representing now
pub fn datetime_now() -> DateTime<Utc> {
  Utc::now()
}

/// Calendar date N days ago (UTC)
pub fn date_days_ago(days: i64) -> NaiveDate {
  datetime_days_ago(days).date_naive()
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::store::SqliteStore;

  #[tokio::test]
  async fn test_setup_db_creates_schema() {
    let pool = setup_test_db().await;

    let tables: Vec<(String,)> = sqlx::query_as(
      r#"
      SELECT name FROM sqlite_master
      WHERE type = 'table' AND name IN ('exercises', 'workouts', 'workout_plans')
      "#,
    )
    .fetch_all(&pool)
    .await
    .expect("Failed to query tables");

    assert_eq!(tables.len(), 3, "Expected 3 tables, got {}", tables.len());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_seed_workouts_returns_correct_count() {
    let pool = setup_test_db().await;
    let store = SqliteStore::new(pool.clone());

    let entries = [(0, "Bench Press", 3), (2, "Back Squat", 4)];
    let ids = seed_test_workouts(&store, "u1", &entries).await;
    assert_eq!(ids.len(), 2);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workouts")
      .fetch_one(&pool)
      .await
      .expect("Failed to count workouts");

    assert_eq!(count, 2);

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_failing_store_fails() {
    assert!(FailingStore.find_all_exercises().await.is_err());
  }

  #[test]
  fn test_date_helpers_agree() {
    assert_eq!(date_days_ago(3), datetime_days_ago(3).date_naive());
    assert!(date_days_ago(1) < date_days_ago(0));
  }
}
