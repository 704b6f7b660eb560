//! Data access for the recommendation engine
//!
//! The engine only talks to storage through `TrainingStore`. `SqliteStore` is
//! the production implementation; JSON columns hold the nested workout, plan
//! and engagement data.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::models::muscle::sparse_engagement;
use crate::models::{
  ExerciseDefinition, ExercisePerformance, ExerciseType, Mechanics, MuscleGroup, PlanFilter,
  PlanType, PlannedExercise, WorkoutPlan, WorkoutRecord,
};

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),

  #[error("Migration failed: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Malformed JSON column: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("Invalid stored value: {0}")]
  InvalidData(String),
}

impl Serialize for StoreError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Queries
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
  #[default]
  Ascending,
  Descending,
}

/// Workout lookup; date bounds are inclusive
#[derive(Debug, Clone, Default)]
pub struct WorkoutQuery {
  pub user_id: String,
  pub date_from: Option<NaiveDate>,
  pub date_to: Option<NaiveDate>,
  pub exercise_name: Option<String>,
  pub order: SortOrder,
}

impl WorkoutQuery {
  pub fn for_user(user_id: &str) -> Self {
    Self {
      user_id: user_id.to_string(),
      ..Default::default()
    }
  }

  pub fn since(mut self, from: NaiveDate) -> Self {
    self.date_from = Some(from);
    self
  }

  pub fn between(mut self, from: NaiveDate, to: NaiveDate) -> Self {
    self.date_from = Some(from);
    self.date_to = Some(to);
    self
  }
}

/// ---------------------------------------------------------------------------
/// Store Contract
/// ---------------------------------------------------------------------------

/// Every call is a single attempt; retry policy is the implementor's concern.
#[allow(async_fn_in_trait)]
pub trait TrainingStore {
  async fn find_exercise_by_name(
    &self,
    name: &str,
  ) -> Result<Option<ExerciseDefinition>, StoreError>;

  async fn find_all_exercises(&self) -> Result<Vec<ExerciseDefinition>, StoreError>;

  async fn find_workouts(&self, query: &WorkoutQuery) -> Result<Vec<WorkoutRecord>, StoreError>;

  async fn find_plans(
    &self,
    user_id: &str,
    filter: &PlanFilter,
  ) -> Result<Vec<WorkoutPlan>, StoreError>;

  /// Persist a plan and return it with its assigned id
  async fn create_plan(&self, plan: &WorkoutPlan) -> Result<WorkoutPlan, StoreError>;

  async fn insert_exercise(&self, exercise: &ExerciseDefinition) -> Result<i64, StoreError>;

  async fn insert_workout(&self, workout: &WorkoutRecord) -> Result<i64, StoreError>;
}

/// ---------------------------------------------------------------------------
/// SQLite Implementation
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SqliteStore {
  pool: SqlitePool,
}

impl SqliteStore {
  pub fn new(pool: SqlitePool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &SqlitePool {
    &self.pool
  }
}

const EXERCISE_COLUMNS: &str = r#"
  id, name, muscle_group, exercise_type, mechanics, equipment, difficulty,
  secondary_muscles_json, muscle_engagement_json
"#;

const PLAN_COLUMNS: &str = r#"
  id, user_id, name, description, plan_type, is_active, is_generated,
  temporary, exercises_json, created_at
"#;

impl TrainingStore for SqliteStore {
  async fn find_exercise_by_name(
    &self,
    name: &str,
  ) -> Result<Option<ExerciseDefinition>, StoreError> {
    let sql = format!("SELECT {} FROM exercises WHERE name = ?1", EXERCISE_COLUMNS);
    let row = sqlx::query(&sql)
      .bind(name)
      .fetch_optional(&self.pool)
      .await?;

    row.map(|r| exercise_from_row(&r)).transpose()
  }

  async fn find_all_exercises(&self) -> Result<Vec<ExerciseDefinition>, StoreError> {
    let rows = sqlx::query(&format!("SELECT {} FROM exercises ORDER BY id", EXERCISE_COLUMNS))
      .fetch_all(&self.pool)
      .await?;

    rows.iter().map(exercise_from_row).collect()
  }

  async fn find_workouts(&self, query: &WorkoutQuery) -> Result<Vec<WorkoutRecord>, StoreError> {
    let order = match query.order {
      SortOrder::Ascending => "ASC",
      SortOrder::Descending => "DESC",
    };

    let rows = sqlx::query(&format!(
      r#"
      SELECT id, user_id, date, exercises_json
      FROM workouts
      WHERE user_id = ?1
        AND (?2 IS NULL OR date >= ?2)
        AND (?3 IS NULL OR date <= ?3)
      ORDER BY date {order}, id {order}
      "#
    ))
    .bind(&query.user_id)
    .bind(query.date_from)
    .bind(query.date_to)
    .fetch_all(&self.pool)
    .await?;

    let mut workouts = Vec::with_capacity(rows.len());
    for row in rows {
      let exercises_json: String = row.get("exercises_json");
      let exercises: Vec<ExercisePerformance> = serde_json::from_str(&exercises_json)?;
      workouts.push(WorkoutRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        date: row.get("date"),
        exercises,
      });
    }

    if let Some(name) = &query.exercise_name {
      workouts.retain(|w| w.exercises.iter().any(|e| e.name.eq_ignore_ascii_case(name)));
    }

    Ok(workouts)
  }

  async fn find_plans(
    &self,
    user_id: &str,
    filter: &PlanFilter,
  ) -> Result<Vec<WorkoutPlan>, StoreError> {
    let rows = sqlx::query(&format!(
      r#"
      SELECT {}
      FROM workout_plans
      WHERE user_id = ?1
        AND (?2 IS NULL OR temporary = ?2)
        AND (?3 IS NULL OR plan_type = ?3)
      ORDER BY id
      "#,
      PLAN_COLUMNS
    ))
    .bind(user_id)
    .bind(filter.temporary)
    .bind(filter.plan_type.map(|t| t.as_str()))
    .fetch_all(&self.pool)
    .await?;

    rows.iter().map(plan_from_row).collect()
  }

  async fn create_plan(&self, plan: &WorkoutPlan) -> Result<WorkoutPlan, StoreError> {
    let exercises_json = serde_json::to_string(&plan.exercises)?;
    let created_at = plan.created_at.unwrap_or_else(Utc::now);

    let result = sqlx::query(
      r#"
      INSERT INTO workout_plans (
        user_id, name, description, plan_type, is_active, is_generated,
        temporary, exercises_json, created_at
      )
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
      "#,
    )
    .bind(&plan.user_id)
    .bind(&plan.name)
    .bind(&plan.description)
    .bind(plan.plan_type.as_str())
    .bind(plan.is_active)
    .bind(plan.is_generated)
    .bind(plan.temporary)
    .bind(&exercises_json)
    .bind(created_at)
    .execute(&self.pool)
    .await?;

    let mut created = plan.clone();
    created.id = Some(result.last_insert_rowid());
    created.created_at = Some(created_at);
    Ok(created)
  }

  async fn insert_exercise(&self, exercise: &ExerciseDefinition) -> Result<i64, StoreError> {
    let secondary_json = serde_json::to_string(&exercise.secondary_muscles)?;
    let engagement_json = engagement_to_json(exercise)?;

    let result = sqlx::query(
      r#"
      INSERT INTO exercises (
        name, muscle_group, exercise_type, mechanics, equipment, difficulty,
        secondary_muscles_json, muscle_engagement_json
      )
      VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
      "#,
    )
    .bind(&exercise.name)
    .bind(exercise.muscle_group.map(|g| g.as_str()))
    .bind(exercise.exercise_type.as_str())
    .bind(exercise.mechanics.as_str())
    .bind(&exercise.equipment)
    .bind(exercise.difficulty as i64)
    .bind(&secondary_json)
    .bind(&engagement_json)
    .execute(&self.pool)
    .await?;

    Ok(result.last_insert_rowid())
  }

  async fn insert_workout(&self, workout: &WorkoutRecord) -> Result<i64, StoreError> {
    let exercises_json = serde_json::to_string(&workout.exercises)?;

    let result = sqlx::query(
      r#"
      INSERT INTO workouts (user_id, date, exercises_json)
      VALUES (?1, ?2, ?3)
      "#,
    )
    .bind(&workout.user_id)
    .bind(workout.date)
    .bind(&exercises_json)
    .execute(&self.pool)
    .await?;

    Ok(result.last_insert_rowid())
  }
}

/// ---------------------------------------------------------------------------
/// Row Mapping
/// ---------------------------------------------------------------------------

fn exercise_from_row(row: &SqliteRow) -> Result<ExerciseDefinition, StoreError> {
  let muscle_group: Option<String> = row.get("muscle_group");
  let exercise_type: String = row.get("exercise_type");
  let mechanics: String = row.get("mechanics");
  let difficulty: i64 = row.get("difficulty");
  let secondary_json: Option<String> = row.get("secondary_muscles_json");
  let engagement_json: Option<String> = row.get("muscle_engagement_json");

  // Engagement is parsed through the same sparse adapter the API uses
  let engagement = match engagement_json.as_deref() {
    Some(json) if !json.trim().is_empty() => {
      let mut deserializer = serde_json::Deserializer::from_str(json);
      let engagement = sparse_engagement::deserialize(&mut deserializer)?;
      deserializer.end()?;
      engagement
    }
    _ => Default::default(),
  };

  Ok(ExerciseDefinition {
    id: row.get("id"),
    name: row.get("name"),
    muscle_group: muscle_group
      .filter(|g| !g.trim().is_empty())
      .map(|g| g.parse::<MuscleGroup>())
      .transpose()
      .map_err(StoreError::InvalidData)?,
    exercise_type: exercise_type.parse::<ExerciseType>().map_err(StoreError::InvalidData)?,
    mechanics: mechanics.parse::<Mechanics>().map_err(StoreError::InvalidData)?,
    equipment: row.get("equipment"),
    difficulty: difficulty.clamp(1, 5) as u8,
    secondary_muscles: match secondary_json.as_deref() {
      Some(json) if !json.trim().is_empty() => serde_json::from_str(json)?,
      _ => Vec::new(),
    },
    muscle_engagement: engagement,
  })
}

fn engagement_to_json(exercise: &ExerciseDefinition) -> Result<String, StoreError> {
  let mut buf = Vec::new();
  let mut serializer = serde_json::Serializer::new(&mut buf);
  sparse_engagement::serialize(&exercise.muscle_engagement, &mut serializer)?;
  String::from_utf8(buf).map_err(|e| StoreError::InvalidData(e.to_string()))
}

fn plan_from_row(row: &SqliteRow) -> Result<WorkoutPlan, StoreError> {
  let plan_type: String = row.get("plan_type");
  let exercises_json: String = row.get("exercises_json");
  let exercises: Vec<PlannedExercise> = serde_json::from_str(&exercises_json)?;
  let created_at: Option<DateTime<Utc>> = row.try_get("created_at").ok().flatten();

  Ok(WorkoutPlan {
    id: row.get("id"),
    user_id: row.get("user_id"),
    name: row.get("name"),
    description: row.get("description"),
    plan_type: plan_type.parse::<PlanType>().map_err(StoreError::InvalidData)?,
    is_active: row.get("is_active"),
    is_generated: row.get("is_generated"),
    temporary: row.get("temporary"),
    exercises,
    created_at,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{MusclePart, SecondaryMuscle, SetRecord};
  use crate::test_utils::{date_days_ago, setup_test_db, teardown_test_db};

  #[tokio::test]
  async fn test_exercise_round_trips_through_sqlite() {
    let pool = setup_test_db().await;
    let store = SqliteStore::new(pool.clone());

    let squat = ExerciseDefinition::new("Back Squat", MuscleGroup::Legs, ExerciseType::Compound)
      .with_engagement(&[(MusclePart::Quads, 90.0), (MusclePart::Glutes, 70.0)])
      .with_secondary(vec![SecondaryMuscle::Group("Core".to_string())]);
    store.insert_exercise(&squat).await.expect("insert failed");

    let loaded = store
      .find_exercise_by_name("Back Squat")
      .await
      .expect("query failed")
      .expect("exercise missing");

    assert!(loaded.id.is_some());
    assert_eq!(loaded.muscle_group, Some(MuscleGroup::Legs));
    assert_eq!(loaded.muscle_engagement[MusclePart::Quads], 90.0);
    assert_eq!(loaded.muscle_engagement[MusclePart::Hamstrings], 0.0);
    assert_eq!(loaded.secondary_muscles.len(), 1);

    assert!(store.find_exercise_by_name("Nope").await.unwrap().is_none());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_engagement_column_is_read_leniently() {
    let pool = setup_test_db().await;
    let store = SqliteStore::new(pool.clone());

    for (name, engagement) in [
      ("Hack Squat", Some(r#"{"quads": 75, "pecs": 10}"#)),
      ("Null Row", Some("null")),
      ("Missing Row", None),
      ("Broken Row", Some(r#"{"quads": 75} trailing"#)),
    ] {
      sqlx::query(
        r#"
        INSERT INTO exercises (name, muscle_group, exercise_type, muscle_engagement_json)
        VALUES (?1, 'Legs', 'Compound', ?2)
        "#,
      )
      .bind(name)
      .bind(engagement)
      .execute(&pool)
      .await
      .expect("raw insert failed");
    }

    let hack = store.find_exercise_by_name("Hack Squat").await.unwrap().unwrap();
    assert_eq!(hack.muscle_engagement[MusclePart::Quads], 75.0);
    assert_eq!(hack.muscle_engagement.engaged().count(), 1);

    for name in ["Null Row", "Missing Row"] {
      let loaded = store.find_exercise_by_name(name).await.unwrap().unwrap();
      assert!(!loaded.muscle_engagement.has_positive());
    }

    assert!(matches!(
      store.find_exercise_by_name("Broken Row").await,
      Err(StoreError::Serialization(_))
    ));

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_find_workouts_filters_by_range_and_name() {
    let pool = setup_test_db().await;
    let store = SqliteStore::new(pool.clone());

    for (days_ago, name) in [(1, "Bench Press"), (3, "Back Squat"), (10, "Bench Press")] {
      let workout = WorkoutRecord {
        id: None,
        user_id: "u1".to_string(),
        date: date_days_ago(days_ago),
        exercises: vec![ExercisePerformance::new(name, vec![SetRecord::new("60", "8")])],
      };
      store.insert_workout(&workout).await.expect("insert failed");
    }

    let mut query = WorkoutQuery::for_user("u1").between(date_days_ago(7), date_days_ago(0));
    let recent = store.find_workouts(&query).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent[0].date < recent[1].date);

    query.order = SortOrder::Descending;
    query.exercise_name = Some("bench press".to_string());
    let benches = store.find_workouts(&query).await.unwrap();
    assert_eq!(benches.len(), 1);
    assert_eq!(benches[0].date, date_days_ago(1));

    let other_user = store.find_workouts(&WorkoutQuery::for_user("u2")).await.unwrap();
    assert!(other_user.is_empty());

    teardown_test_db(pool).await;
  }

  #[tokio::test]
  async fn test_plans_filter_on_temporary_flag() {
    let pool = setup_test_db().await;
    let store = SqliteStore::new(pool.clone());

    let mut push = WorkoutPlan::new("u1", "Push A", PlanType::Custom);
    push.exercises.push(PlannedExercise {
      name: "Bench Press".to_string(),
      num_sets: 4,
    });
    let created = store.create_plan(&push).await.unwrap();
    assert!(created.id.is_some());

    let mut temp = WorkoutPlan::new("u1", "Temporary", PlanType::Custom);
    temp.temporary = true;
    store.create_plan(&temp).await.unwrap();

    let permanent = store.find_plans("u1", &PlanFilter::temporary(false)).await.unwrap();
    assert_eq!(permanent.len(), 1);
    assert_eq!(permanent[0].name, "Push A");
    assert_eq!(permanent[0].exercises[0].num_sets, 4);

    let all = store.find_plans("u1", &PlanFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);

    teardown_test_db(pool).await;
  }
}
