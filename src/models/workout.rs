use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// A logged training session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutRecord {
  pub id: Option<i64>,
  pub user_id: String,
  pub date: NaiveDate,
  #[serde(default)]
  pub exercises: Vec<ExercisePerformance>,
}

/// One exercise as performed within a workout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExercisePerformance {
  pub name: String,
  #[serde(default)]
  pub num_sets: u32,
  #[serde(default)]
  pub sets: Vec<SetRecord>,
}

/// Weight and reps as the user typed them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetRecord {
  #[serde(default, deserialize_with = "text_or_number")]
  pub weight: String,
  #[serde(default, deserialize_with = "text_or_number")]
  pub reps: String,
}

impl SetRecord {
  pub fn new(weight: &str, reps: &str) -> Self {
    Self {
      weight: weight.to_string(),
      reps: reps.to_string(),
    }
  }

  /// Reps as a number; anything unparseable counts as 0
  pub fn reps_value(&self) -> f64 {
    parse_lenient(&self.reps)
  }

  /// Weight as a number; anything unparseable counts as 0
  pub fn weight_value(&self) -> f64 {
    parse_lenient(&self.weight)
  }
}

impl ExercisePerformance {
  pub fn new(name: &str, sets: Vec<SetRecord>) -> Self {
    Self {
      name: name.to_string(),
      num_sets: sets.len() as u32,
      sets,
    }
  }
}

fn parse_lenient(raw: &str) -> f64 {
  raw
    .trim()
    .replace(',', ".")
    .parse::<f64>()
    .ok()
    .filter(|v| v.is_finite())
    .unwrap_or(0.0)
}

/// Older clients send numbers where newer ones send strings
fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Raw {
    Text(String),
    Number(f64),
    Null(()),
  }

  Ok(match Raw::deserialize(deserializer)? {
    Raw::Text(s) => s,
    Raw::Number(n) => n.to_string(),
    Raw::Null(()) => String::new(),
  })
}
