//! Closed muscle taxonomy
//!
//! Three levels of granularity are used throughout the engine:
//! - `MusclePart`: the 19 fine-grained parts an exercise can engage
//! - `TrainingGroup`: the 9 groups that carry volume landmarks and get classified
//! - `BalanceGroup`: the 6 coarse groups used for plan safety checks
//!
//! Per-part data lives in `PartMap<T>`, a fixed array indexed by `MusclePart`.

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

pub const PART_COUNT: usize = 19;

/// ---------------------------------------------------------------------------
/// Muscle Parts
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MusclePart {
  UpperChest,
  MiddleChest,
  LowerChest,
  Lats,
  UpperBack,
  LowerBack,
  FrontDelts,
  SideDelts,
  RearDelts,
  Biceps,
  Triceps,
  Forearms,
  Quads,
  Hamstrings,
  Glutes,
  Calves,
  UpperAbs,
  LowerAbs,
  Obliques,
}

impl MusclePart {
  pub const ALL: [MusclePart; PART_COUNT] = [
    MusclePart::UpperChest,
    MusclePart::MiddleChest,
    MusclePart::LowerChest,
    MusclePart::Lats,
    MusclePart::UpperBack,
    MusclePart::LowerBack,
    MusclePart::FrontDelts,
    MusclePart::SideDelts,
    MusclePart::RearDelts,
    MusclePart::Biceps,
    MusclePart::Triceps,
    MusclePart::Forearms,
    MusclePart::Quads,
    MusclePart::Hamstrings,
    MusclePart::Glutes,
    MusclePart::Calves,
    MusclePart::UpperAbs,
    MusclePart::LowerAbs,
    MusclePart::Obliques,
  ];

  pub fn index(self) -> usize {
    self as usize
  }

  /// Key used in stored engagement maps
  pub fn key(self) -> &'static str {
    match self {
      MusclePart::UpperChest => "upperChest",
      MusclePart::MiddleChest => "middleChest",
      MusclePart::LowerChest => "lowerChest",
      MusclePart::Lats => "lats",
      MusclePart::UpperBack => "upperBack",
      MusclePart::LowerBack => "lowerBack",
      MusclePart::FrontDelts => "frontDelts",
      MusclePart::SideDelts => "sideDelts",
      MusclePart::RearDelts => "rearDelts",
      MusclePart::Biceps => "biceps",
      MusclePart::Triceps => "triceps",
      MusclePart::Forearms => "forearms",
      MusclePart::Quads => "quads",
      MusclePart::Hamstrings => "hamstrings",
      MusclePart::Glutes => "glutes",
      MusclePart::Calves => "calves",
      MusclePart::UpperAbs => "upperAbs",
      MusclePart::LowerAbs => "lowerAbs",
      MusclePart::Obliques => "obliques",
    }
  }

  pub fn balance_group(self) -> BalanceGroup {
    match self {
      MusclePart::UpperChest | MusclePart::MiddleChest | MusclePart::LowerChest => {
        BalanceGroup::Chest
      }
      MusclePart::Lats | MusclePart::UpperBack | MusclePart::LowerBack => BalanceGroup::Back,
      MusclePart::FrontDelts | MusclePart::SideDelts | MusclePart::RearDelts => {
        BalanceGroup::Shoulders
      }
      MusclePart::Biceps | MusclePart::Triceps | MusclePart::Forearms => BalanceGroup::Arms,
      MusclePart::Quads | MusclePart::Hamstrings | MusclePart::Glutes | MusclePart::Calves => {
        BalanceGroup::Legs
      }
      MusclePart::UpperAbs | MusclePart::LowerAbs | MusclePart::Obliques => BalanceGroup::Core,
    }
  }
}

impl std::fmt::Display for MusclePart {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.key())
  }
}

impl std::str::FromStr for MusclePart {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    MusclePart::ALL
      .iter()
      .copied()
      .find(|p| p.key().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| format!("Unknown muscle part: {}", s))
  }
}

/// ---------------------------------------------------------------------------
/// Training Groups (classified against volume landmarks)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrainingGroup {
  Chest,
  Back,
  FrontDelts,
  SideDelts,
  RearDelts,
  Biceps,
  Triceps,
  Legs,
  Core,
}

impl TrainingGroup {
  pub const ALL: [TrainingGroup; 9] = [
    TrainingGroup::Chest,
    TrainingGroup::Back,
    TrainingGroup::FrontDelts,
    TrainingGroup::SideDelts,
    TrainingGroup::RearDelts,
    TrainingGroup::Biceps,
    TrainingGroup::Triceps,
    TrainingGroup::Legs,
    TrainingGroup::Core,
  ];

  pub fn parts(self) -> &'static [MusclePart] {
    match self {
      TrainingGroup::Chest => &[
        MusclePart::UpperChest,
        MusclePart::MiddleChest,
        MusclePart::LowerChest,
      ],
      TrainingGroup::Back => &[MusclePart::Lats, MusclePart::UpperBack, MusclePart::LowerBack],
      TrainingGroup::FrontDelts => &[MusclePart::FrontDelts],
      TrainingGroup::SideDelts => &[MusclePart::SideDelts],
      TrainingGroup::RearDelts => &[MusclePart::RearDelts],
      TrainingGroup::Biceps => &[MusclePart::Biceps],
      TrainingGroup::Triceps => &[MusclePart::Triceps],
      TrainingGroup::Legs => &[
        MusclePart::Quads,
        MusclePart::Hamstrings,
        MusclePart::Glutes,
        MusclePart::Calves,
      ],
      TrainingGroup::Core => &[MusclePart::UpperAbs, MusclePart::LowerAbs, MusclePart::Obliques],
    }
  }

  /// Legs, chest, back and the three delt heads
  pub fn is_major(self) -> bool {
    matches!(
      self,
      TrainingGroup::Legs
        | TrainingGroup::Chest
        | TrainingGroup::Back
        | TrainingGroup::FrontDelts
        | TrainingGroup::SideDelts
        | TrainingGroup::RearDelts
    )
  }

  pub fn is_minor(self) -> bool {
    matches!(
      self,
      TrainingGroup::Biceps | TrainingGroup::Triceps | TrainingGroup::Core
    )
  }

  /// Lower sorts first when ranking available groups
  pub fn priority(self) -> u8 {
    match self {
      TrainingGroup::Legs => 0,
      TrainingGroup::Chest | TrainingGroup::Back => 1,
      TrainingGroup::FrontDelts | TrainingGroup::SideDelts | TrainingGroup::RearDelts => 2,
      TrainingGroup::Biceps | TrainingGroup::Triceps => 3,
      TrainingGroup::Core => 4,
    }
  }

  /// Groups conventionally trained alongside this one, in preference order
  pub fn synergists(self) -> &'static [TrainingGroup] {
    match self {
      TrainingGroup::Back => &[TrainingGroup::Biceps, TrainingGroup::RearDelts],
      TrainingGroup::RearDelts => &[TrainingGroup::Biceps],
      TrainingGroup::Chest => &[
        TrainingGroup::Triceps,
        TrainingGroup::FrontDelts,
        TrainingGroup::SideDelts,
      ],
      TrainingGroup::FrontDelts => &[TrainingGroup::Triceps, TrainingGroup::SideDelts],
      TrainingGroup::SideDelts => &[TrainingGroup::Triceps, TrainingGroup::FrontDelts],
      TrainingGroup::Legs => &[TrainingGroup::Core],
      TrainingGroup::Biceps | TrainingGroup::Triceps | TrainingGroup::Core => &[],
    }
  }

  /// Lower-case substrings that mark a plan name as targeting this group.
  /// Includes the Polish names users commonly give their plans.
  pub fn plan_keywords(self) -> &'static [&'static str] {
    match self {
      TrainingGroup::Chest => &["push", "chest", "klatka"],
      TrainingGroup::Back => &["pull", "back", "plecy"],
      TrainingGroup::FrontDelts => &["push", "shoulder", "barki"],
      TrainingGroup::SideDelts => &["shoulder", "delt", "barki"],
      TrainingGroup::RearDelts => &["pull", "rear delt", "barki"],
      TrainingGroup::Biceps => &["pull", "arm", "biceps", "ramiona"],
      TrainingGroup::Triceps => &["push", "arm", "triceps", "ramiona"],
      TrainingGroup::Legs => &["leg", "lower", "squat", "nogi"],
      TrainingGroup::Core => &["core", "abs", "brzuch"],
    }
  }

  /// Human-readable name used in recommendation reasons
  pub fn label(self) -> &'static str {
    match self {
      TrainingGroup::Chest => "chest",
      TrainingGroup::Back => "back",
      TrainingGroup::FrontDelts => "front delts",
      TrainingGroup::SideDelts => "side delts",
      TrainingGroup::RearDelts => "rear delts",
      TrainingGroup::Biceps => "biceps",
      TrainingGroup::Triceps => "triceps",
      TrainingGroup::Legs => "legs",
      TrainingGroup::Core => "core",
    }
  }
}

impl std::fmt::Display for TrainingGroup {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.label())
  }
}

/// Expand a list of training groups into their muscle parts, preserving order
/// and dropping duplicates.
pub fn expand_groups(groups: &[TrainingGroup]) -> Vec<MusclePart> {
  let mut parts = Vec::new();
  for group in groups {
    for part in group.parts() {
      if !parts.contains(part) {
        parts.push(*part);
      }
    }
  }
  parts
}

/// ---------------------------------------------------------------------------
/// Balance Groups (plan safety roll-up)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceGroup {
  Chest,
  Back,
  Shoulders,
  Arms,
  Legs,
  Core,
}

impl BalanceGroup {
  pub const ALL: [BalanceGroup; 6] = [
    BalanceGroup::Chest,
    BalanceGroup::Back,
    BalanceGroup::Shoulders,
    BalanceGroup::Arms,
    BalanceGroup::Legs,
    BalanceGroup::Core,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      BalanceGroup::Chest => "chest",
      BalanceGroup::Back => "back",
      BalanceGroup::Shoulders => "shoulders",
      BalanceGroup::Arms => "arms",
      BalanceGroup::Legs => "legs",
      BalanceGroup::Core => "core",
    }
  }

  pub fn parts(self) -> impl Iterator<Item = MusclePart> {
    MusclePart::ALL
      .into_iter()
      .filter(move |p| p.balance_group() == self)
  }
}

/// ---------------------------------------------------------------------------
/// PartMap: fixed-size per-part storage
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartMap<T>([T; PART_COUNT]);

impl<T: Copy + Default> Default for PartMap<T> {
  fn default() -> Self {
    Self([T::default(); PART_COUNT])
  }
}

impl<T> PartMap<T> {
  pub fn iter(&self) -> impl Iterator<Item = (MusclePart, &T)> {
    MusclePart::ALL.into_iter().zip(self.0.iter())
  }
}

impl<T> Index<MusclePart> for PartMap<T> {
  type Output = T;
  fn index(&self, part: MusclePart) -> &T {
    &self.0[part.index()]
  }
}

impl<T> IndexMut<MusclePart> for PartMap<T> {
  fn index_mut(&mut self, part: MusclePart) -> &mut T {
    &mut self.0[part.index()]
  }
}

impl<T: Serialize> Serialize for PartMap<T> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(PART_COUNT))?;
    for (part, value) in self.iter() {
      map.serialize_entry(part.key(), value)?;
    }
    map.end()
  }
}

/// Engagement percentage (0-100) per muscle part
pub type EngagementMap = PartMap<f64>;

impl PartMap<f64> {
  pub fn from_pairs(pairs: &[(MusclePart, f64)]) -> Self {
    let mut map = Self::default();
    for (part, value) in pairs {
      map[*part] = *value;
    }
    map
  }

  /// Parts with a strictly positive value, in canonical order
  pub fn engaged(&self) -> impl Iterator<Item = (MusclePart, f64)> + '_ {
    self.iter().filter(|(_, v)| **v > 0.0).map(|(p, v)| (p, *v))
  }

  pub fn has_positive(&self) -> bool {
    self.0.iter().any(|v| *v > 0.0)
  }

  pub fn is_empty(&self) -> bool {
    !self.has_positive()
  }

  pub fn total(&self) -> f64 {
    self.0.iter().sum()
  }
}

/// Serde adapter storing an `EngagementMap` as a sparse `{ partKey: percent }`
/// object. Unknown keys are dropped on read.
pub mod sparse_engagement {
  use super::*;

  pub fn serialize<S: Serializer>(map: &EngagementMap, serializer: S) -> Result<S::Ok, S::Error> {
    let entries: Vec<(MusclePart, f64)> = map
      .iter()
      .filter(|(_, v)| **v != 0.0)
      .map(|(p, v)| (p, *v))
      .collect();
    let mut out = serializer.serialize_map(Some(entries.len()))?;
    for (part, value) in entries {
      out.serialize_entry(part.key(), &value)?;
    }
    out.end()
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
  ) -> Result<EngagementMap, D::Error> {
    let raw: Option<BTreeMap<String, f64>> = Option::deserialize(deserializer)?;
    let mut map = EngagementMap::default();
    for (key, value) in raw.unwrap_or_default() {
      if let Ok(part) = key.parse::<MusclePart>() {
        map[part] = value;
      }
    }
    Ok(map)
  }
}
