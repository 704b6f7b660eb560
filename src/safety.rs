//! Plan safety and antagonist balance checks
//!
//! Both checks annotate a plan; neither blocks it.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::{AntagonistPair, EngineConfig};
use crate::engagement::resolve_engagement;
use crate::models::{BalanceGroup, EngagementMap, ExerciseDefinition};

/// Summed engagement of every exercise in a plan
#[derive(Debug, Clone, Serialize)]
pub struct PlanEngagement {
  pub parts: EngagementMap,
  pub groups: BTreeMap<BalanceGroup, f64>,
}

impl PlanEngagement {
  pub fn group(&self, group: BalanceGroup) -> f64 {
    self.groups.get(&group).copied().unwrap_or(0.0)
  }
}

pub fn aggregate_engagement(exercises: &[ExerciseDefinition]) -> PlanEngagement {
  let mut parts = EngagementMap::default();
  for exercise in exercises {
    for (part, value) in resolve_engagement(exercise).engaged() {
      parts[part] += value;
    }
  }

  let groups = BalanceGroup::ALL
    .into_iter()
    .map(|group| (group, group.parts().map(|p| parts[p]).sum::<f64>()))
    .collect();

  PlanEngagement { parts, groups }
}

/// ---------------------------------------------------------------------------
/// Absolute Volume
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeIssue {
  Overwork,
  Underwork,
}

#[derive(Debug, Clone, Serialize)]
pub struct VolumeWarning {
  pub group: BalanceGroup,
  pub issue: VolumeIssue,
  pub engagement: f64,
  pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SafetyReport {
  pub valid: bool,
  pub warnings: Vec<VolumeWarning>,
}

pub fn check_volume(engagement: &PlanEngagement, config: &EngineConfig) -> SafetyReport {
  let mut warnings = Vec::new();

  for group in BalanceGroup::ALL {
    let value = engagement.group(group);
    if value > config.overwork_threshold {
      warnings.push(VolumeWarning {
        group,
        issue: VolumeIssue::Overwork,
        engagement: value,
        message: format!(
          "{} engagement {:.0} exceeds {:.0}: risk of overwork",
          group.as_str(),
          value,
          config.overwork_threshold
        ),
      });
    } else if value > 0.0 && value < config.underwork_threshold {
      warnings.push(VolumeWarning {
        group,
        issue: VolumeIssue::Underwork,
        engagement: value,
        message: format!(
          "{} engagement {:.0} is below {:.0}: too little stimulus to matter",
          group.as_str(),
          value,
          config.underwork_threshold
        ),
      });
    }
  }

  SafetyReport {
    valid: warnings.is_empty(),
    warnings,
  }
}

/// ---------------------------------------------------------------------------
/// Antagonist Balance
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct BalanceWarning {
  /// "chest/back" style pair name
  pub pair: String,
  pub ratio: f64,
  /// The side with too much work
  pub dominant: String,
  pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceReport {
  pub balanced: bool,
  pub warnings: Vec<BalanceWarning>,
}

fn check_pair(engagement: &PlanEngagement, pair: &AntagonistPair) -> Option<BalanceWarning> {
  let first: f64 = pair.first.iter().map(|p| engagement.parts[*p]).sum();
  let second: f64 = pair.second.iter().map(|p| engagement.parts[*p]).sum();

  // A side the plan never touches is not an imbalance
  if first <= 0.0 || second <= 0.0 {
    return None;
  }

  let ratio = first / second;
  let dominant = if ratio > pair.max_ratio {
    &pair.first_label
  } else if ratio < pair.min_ratio {
    &pair.second_label
  } else {
    return None;
  };

  Some(BalanceWarning {
    pair: format!("{}/{}", pair.first_label, pair.second_label),
    ratio,
    dominant: dominant.clone(),
    message: format!(
      "Too much {} ({}/{} ratio {:.2}, expected {:.1}-{:.1})",
      dominant, pair.first_label, pair.second_label, ratio, pair.min_ratio, pair.max_ratio
    ),
  })
}

pub fn check_balance(engagement: &PlanEngagement, config: &EngineConfig) -> BalanceReport {
  let warnings: Vec<BalanceWarning> = config
    .antagonists
    .iter()
    .filter_map(|pair| check_pair(engagement, pair))
    .collect();

  BalanceReport {
    balanced: warnings.is_empty(),
    warnings,
  }
}

/// ---------------------------------------------------------------------------
/// Combined Validation
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct PlanValidation {
  pub engagement: PlanEngagement,
  pub safety: SafetyReport,
  pub balance: BalanceReport,
}

pub fn validate_plan(exercises: &[ExerciseDefinition], config: &EngineConfig) -> PlanValidation {
  let engagement = aggregate_engagement(exercises);
  let safety = check_volume(&engagement, config);
  let balance = check_balance(&engagement, config);

  PlanValidation {
    engagement,
    safety,
    balance,
  }
}
