//! Muscle status classification
//!
//! Rolls per-part statistics up into the nine training groups and sorts every
//! group into exactly one bucket: overtrained, undertrained, rested or ready.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::{EngineConfig, VolumeLandmark};
use crate::history::TrainingHistory;
use crate::models::TrainingGroup;

/// Days reported for a group that has never been trained
pub const NEVER_TRAINED_DAYS: i64 = 999;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStatus {
  Overtrained,
  Undertrained,
  Rested,
  Ready,
}

impl RecoveryStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      RecoveryStatus::Overtrained => "overtrained",
      RecoveryStatus::Undertrained => "undertrained",
      RecoveryStatus::Rested => "rested",
      RecoveryStatus::Ready => "ready",
    }
  }
}

/// ---------------------------------------------------------------------------
/// Group Aggregation
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MuscleGroupAggregate {
  /// Sum of the group's part set counts
  pub accumulated_sets: f64,
  /// Highest frequency among the group's parts
  pub frequency: u32,
  pub last_trained: Option<NaiveDate>,
  pub days_since_last_trained: i64,
}

pub type GroupAggregates = BTreeMap<TrainingGroup, MuscleGroupAggregate>;

/// Whole days between `now` and the start of `last_trained`, floored.
pub fn days_since(last_trained: Option<NaiveDate>, now: DateTime<Utc>) -> i64 {
  match last_trained {
    Some(date) => {
      let start = date.and_time(NaiveTime::default()).and_utc();
      (now - start).num_seconds().div_euclid(SECONDS_PER_DAY)
    }
    None => NEVER_TRAINED_DAYS,
  }
}

pub fn aggregate_groups(history: &TrainingHistory, now: DateTime<Utc>) -> GroupAggregates {
  TrainingGroup::ALL
    .into_iter()
    .map(|group| {
      let stats = group.parts().iter().map(|p| history.parts[*p]);
      let accumulated_sets: f64 = stats.clone().map(|s| s.accumulated_sets).sum();
      let frequency = stats.clone().map(|s| s.frequency).max().unwrap_or(0);
      let last_trained = stats.filter_map(|s| s.last_trained).max();

      (
        group,
        MuscleGroupAggregate {
          accumulated_sets,
          frequency,
          last_trained,
          days_since_last_trained: days_since(last_trained, now),
        },
      )
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Classification
/// ---------------------------------------------------------------------------

pub fn classify_group(
  aggregate: &MuscleGroupAggregate,
  landmark: Option<&VolumeLandmark>,
) -> RecoveryStatus {
  let sets = aggregate.accumulated_sets;
  let days = aggregate.days_since_last_trained;

  let Some(landmark) = landmark else {
    return if aggregate.last_trained.is_none() || days >= 7 {
      RecoveryStatus::Undertrained
    } else if days >= 3 {
      RecoveryStatus::Rested
    } else {
      RecoveryStatus::Ready
    };
  };

  if sets > landmark.mrv || (aggregate.frequency >= 3 && days < 1) {
    RecoveryStatus::Overtrained
  } else if sets < landmark.mev && days >= 7 {
    RecoveryStatus::Undertrained
  } else if sets >= landmark.mev && (3..7).contains(&days) {
    RecoveryStatus::Rested
  } else {
    RecoveryStatus::Ready
  }
}

/// Four disjoint buckets of training groups, each in canonical group order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MuscleStatus {
  pub overtrained: Vec<TrainingGroup>,
  pub undertrained: Vec<TrainingGroup>,
  pub rested: Vec<TrainingGroup>,
  pub ready: Vec<TrainingGroup>,
}

impl MuscleStatus {
  pub fn bucket(&self, status: RecoveryStatus) -> &[TrainingGroup] {
    match status {
      RecoveryStatus::Overtrained => &self.overtrained,
      RecoveryStatus::Undertrained => &self.undertrained,
      RecoveryStatus::Rested => &self.rested,
      RecoveryStatus::Ready => &self.ready,
    }
  }

  fn bucket_mut(&mut self, status: RecoveryStatus) -> &mut Vec<TrainingGroup> {
    match status {
      RecoveryStatus::Overtrained => &mut self.overtrained,
      RecoveryStatus::Undertrained => &mut self.undertrained,
      RecoveryStatus::Rested => &mut self.rested,
      RecoveryStatus::Ready => &mut self.ready,
    }
  }

  /// Every bucket the group appears in; exactly one when the status is valid
  pub fn buckets_of(&self, group: TrainingGroup) -> Vec<RecoveryStatus> {
    [
      RecoveryStatus::Overtrained,
      RecoveryStatus::Undertrained,
      RecoveryStatus::Rested,
      RecoveryStatus::Ready,
    ]
    .into_iter()
    .filter(|s| self.bucket(*s).contains(&group))
    .collect()
  }

  pub fn status_of(&self, group: TrainingGroup) -> Option<RecoveryStatus> {
    self.buckets_of(group).first().copied()
  }

  /// True when every training group sits in exactly one bucket
  pub fn is_partition(&self) -> bool {
    let total =
      self.overtrained.len() + self.undertrained.len() + self.rested.len() + self.ready.len();
    total == TrainingGroup::ALL.len()
      && TrainingGroup::ALL.iter().all(|g| self.buckets_of(*g).len() == 1)
  }
}

pub fn classify(aggregates: &GroupAggregates, config: &EngineConfig) -> MuscleStatus {
  let mut status = MuscleStatus::default();

  for group in TrainingGroup::ALL {
    let aggregate = aggregates.get(&group).copied().unwrap_or(MuscleGroupAggregate {
      accumulated_sets: 0.0,
      frequency: 0,
      last_trained: None,
      days_since_last_trained: NEVER_TRAINED_DAYS,
    });
    let outcome = classify_group(&aggregate, config.landmark(group));
    status.bucket_mut(outcome).push(group);
  }

  debug_assert!(status.is_partition(), "muscle status buckets overlap: {:?}", status);
  status
}

/// Groups trained within the last day at or above the bottom of their
/// adaptive range. These are never re-targeted.
pub fn blocked_groups(aggregates: &GroupAggregates, config: &EngineConfig) -> Vec<TrainingGroup> {
  aggregates
    .iter()
    .filter_map(|(group, aggregate)| {
      let landmark = config.landmark(*group)?;
      let blocked = aggregate.last_trained.is_some()
        && aggregate.days_since_last_trained <= 1
        && aggregate.accumulated_sets >= landmark.mav_min;
      blocked.then_some(*group)
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Status Report
/// ---------------------------------------------------------------------------

/// Everything the recommender needs about a user's recovery state
#[derive(Debug, Clone, Serialize)]
pub struct MuscleStatusReport {
  pub aggregates: GroupAggregates,
  pub status: MuscleStatus,
  pub blocked: Vec<TrainingGroup>,
  pub workout_count: usize,
}

impl MuscleStatusReport {
  pub fn from_history(
    history: &TrainingHistory,
    now: DateTime<Utc>,
    config: &EngineConfig,
  ) -> Self {
    let aggregates = aggregate_groups(history, now);
    let status = classify(&aggregates, config);
    let blocked = blocked_groups(&aggregates, config);

    debug!(
      overtrained = status.overtrained.len(),
      undertrained = status.undertrained.len(),
      rested = status.rested.len(),
      ready = status.ready.len(),
      blocked = blocked.len(),
      "Classified muscle groups"
    );

    Self {
      aggregates,
      status,
      blocked,
      workout_count: history.workout_count,
    }
  }

  pub fn aggregate(&self, group: TrainingGroup) -> Option<&MuscleGroupAggregate> {
    self.aggregates.get(&group)
  }
}
