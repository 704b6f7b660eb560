use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanType {
  Template,
  Custom,
}

impl PlanType {
  pub fn as_str(&self) -> &'static str {
    match self {
      PlanType::Template => "Template",
      PlanType::Custom => "Custom",
    }
  }
}

impl std::str::FromStr for PlanType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "template" => Ok(Self::Template),
      "custom" => Ok(Self::Custom),
      _ => Err(format!("Unknown plan type: {}", s)),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedExercise {
  pub name: String,
  pub num_sets: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
  /// Assigned by the store on creation
  pub id: Option<i64>,
  pub user_id: String,
  pub name: String,
  pub description: String,
  pub plan_type: PlanType,
  pub is_active: bool,
  pub is_generated: bool,
  /// Disposable auto-generated plan; at most one per user
  pub temporary: bool,
  pub exercises: Vec<PlannedExercise>,
  pub created_at: Option<DateTime<Utc>>,
}

impl WorkoutPlan {
  pub fn new(user_id: &str, name: &str, plan_type: PlanType) -> Self {
    Self {
      id: None,
      user_id: user_id.to_string(),
      name: name.to_string(),
      description: String::new(),
      plan_type,
      is_active: true,
      is_generated: false,
      temporary: false,
      exercises: Vec::new(),
      created_at: None,
    }
  }
}

/// Optional filters for plan lookups
#[derive(Debug, Clone, Default)]
pub struct PlanFilter {
  pub temporary: Option<bool>,
  pub plan_type: Option<PlanType>,
}

impl PlanFilter {
  pub fn temporary(temporary: bool) -> Self {
    Self {
      temporary: Some(temporary),
      plan_type: None,
    }
  }
}
