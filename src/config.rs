//! Configuration
//!
//! `AdvisorConfig` is read from the environment (a `.env` file is honoured).
//! `EngineConfig` holds the static training tables the engine is judged
//! against; it is passed into the classifier and validator explicitly so tests
//! can swap in alternate tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;

use crate::models::{MusclePart, TrainingGroup};

/// ---------------------------------------------------------------------------
/// Environment Configuration
/// ---------------------------------------------------------------------------

const DEFAULT_DATABASE_URL: &str = "sqlite://workout-advisor.db?mode=rwc";
const DEFAULT_LOG_FILTER: &str = "workout_advisor=info";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {key}: {value}")]
  InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AdvisorConfig {
  pub database_url: String,
  pub max_connections: u32,
  /// Upper bound on exercises in a generated plan
  pub max_exercises: usize,
  pub log_filter: String,
}

impl Default for AdvisorConfig {
  fn default() -> Self {
    Self {
      database_url: DEFAULT_DATABASE_URL.to_string(),
      max_connections: 5,
      max_exercises: 6,
      log_filter: DEFAULT_LOG_FILTER.to_string(),
    }
  }
}

impl AdvisorConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let defaults = Self::default();
    Ok(Self {
      database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
      max_connections: parse_var("ADVISOR_MAX_CONNECTIONS", defaults.max_connections)?,
      max_exercises: parse_var("ADVISOR_MAX_EXERCISES", defaults.max_exercises)?,
      log_filter: env::var("ADVISOR_LOG").unwrap_or(defaults.log_filter),
    })
  }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
  match env::var(key) {
    Ok(value) => value
      .trim()
      .parse()
      .map_err(|_| ConfigError::InvalidValue { key, value }),
    Err(_) => Ok(default),
  }
}

/// ---------------------------------------------------------------------------
/// Training Tables
/// ---------------------------------------------------------------------------

/// Weekly set thresholds for one training group
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeLandmark {
  /// Maintenance volume
  pub mv: f64,
  /// Minimum effective volume
  pub mev: f64,
  /// Maximum adaptive volume range
  pub mav_min: f64,
  pub mav_max: f64,
  /// Maximum recoverable volume
  pub mrv: f64,
}

impl VolumeLandmark {
  pub const fn new(mv: f64, mev: f64, mav_min: f64, mav_max: f64, mrv: f64) -> Self {
    Self {
      mv,
      mev,
      mav_min,
      mav_max,
      mrv,
    }
  }
}

/// Acceptable engagement ratio between two opposing muscle sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntagonistPair {
  pub first_label: String,
  pub first: Vec<MusclePart>,
  pub second_label: String,
  pub second: Vec<MusclePart>,
  pub min_ratio: f64,
  pub max_ratio: f64,
}

impl AntagonistPair {
  pub fn new(
    first_label: &str,
    first: &[MusclePart],
    second_label: &str,
    second: &[MusclePart],
    min_ratio: f64,
    max_ratio: f64,
  ) -> Self {
    Self {
      first_label: first_label.to_string(),
      first: first.to_vec(),
      second_label: second_label.to_string(),
      second: second.to_vec(),
      min_ratio,
      max_ratio,
    }
  }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
  pub landmarks: BTreeMap<TrainingGroup, VolumeLandmark>,
  pub antagonists: Vec<AntagonistPair>,
  /// Aggregate plan engagement above this for one balance group is overwork
  pub overwork_threshold: f64,
  /// Non-zero aggregate engagement below this is underwork
  pub underwork_threshold: f64,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      landmarks: default_landmarks(),
      antagonists: default_antagonists(),
      overwork_threshold: 600.0,
      underwork_threshold: 50.0,
    }
  }
}

impl EngineConfig {
  pub fn landmark(&self, group: TrainingGroup) -> Option<&VolumeLandmark> {
    self.landmarks.get(&group)
  }
}

pub fn default_landmarks() -> BTreeMap<TrainingGroup, VolumeLandmark> {
  BTreeMap::from([
    (TrainingGroup::Chest, VolumeLandmark::new(8.0, 10.0, 12.0, 20.0, 22.0)),
    (TrainingGroup::Back, VolumeLandmark::new(8.0, 10.0, 14.0, 22.0, 25.0)),
    (TrainingGroup::FrontDelts, VolumeLandmark::new(2.0, 4.0, 6.0, 8.0, 12.0)),
    (TrainingGroup::SideDelts, VolumeLandmark::new(4.0, 8.0, 16.0, 22.0, 26.0)),
    (TrainingGroup::RearDelts, VolumeLandmark::new(4.0, 8.0, 16.0, 22.0, 26.0)),
    (TrainingGroup::Biceps, VolumeLandmark::new(5.0, 8.0, 14.0, 20.0, 26.0)),
    (TrainingGroup::Triceps, VolumeLandmark::new(4.0, 6.0, 10.0, 14.0, 18.0)),
    (TrainingGroup::Legs, VolumeLandmark::new(6.0, 8.0, 12.0, 18.0, 20.0)),
    (TrainingGroup::Core, VolumeLandmark::new(2.0, 4.0, 16.0, 20.0, 25.0)),
  ])
}

pub fn default_antagonists() -> Vec<AntagonistPair> {
  vec![
    AntagonistPair::new(
      "chest",
      TrainingGroup::Chest.parts(),
      "back",
      TrainingGroup::Back.parts(),
      0.5,
      2.0,
    ),
    AntagonistPair::new(
      "front delts",
      &[MusclePart::FrontDelts],
      "rear delts",
      &[MusclePart::RearDelts],
      0.4,
      2.5,
    ),
    AntagonistPair::new(
      "quads",
      &[MusclePart::Quads],
      "hamstrings",
      &[MusclePart::Hamstrings],
      0.4,
      2.5,
    ),
  ]
}
