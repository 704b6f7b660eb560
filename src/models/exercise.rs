use serde::{Deserialize, Serialize};

use super::muscle::{sparse_engagement, EngagementMap, MusclePart};

/// Primary muscle group an exercise is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MuscleGroup {
  Chest,
  Back,
  Legs,
  Shoulders,
  Arms,
  Core,
  FullBody,
  Other,
}

impl MuscleGroup {
  /// Canonical parts a group expands to when no explicit engagement is known
  pub fn parts(self) -> &'static [MusclePart] {
    match self {
      MuscleGroup::Chest => &[
        MusclePart::UpperChest,
        MusclePart::MiddleChest,
        MusclePart::LowerChest,
      ],
      MuscleGroup::Back => &[MusclePart::Lats, MusclePart::UpperBack, MusclePart::LowerBack],
      MuscleGroup::Legs => &[
        MusclePart::Quads,
        MusclePart::Hamstrings,
        MusclePart::Glutes,
        MusclePart::Calves,
      ],
      MuscleGroup::Shoulders => &[
        MusclePart::FrontDelts,
        MusclePart::SideDelts,
        MusclePart::RearDelts,
      ],
      MuscleGroup::Arms => &[MusclePart::Biceps, MusclePart::Triceps, MusclePart::Forearms],
      MuscleGroup::Core => &[MusclePart::UpperAbs, MusclePart::LowerAbs, MusclePart::Obliques],
      MuscleGroup::FullBody | MuscleGroup::Other => &[],
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      MuscleGroup::Chest => "Chest",
      MuscleGroup::Back => "Back",
      MuscleGroup::Legs => "Legs",
      MuscleGroup::Shoulders => "Shoulders",
      MuscleGroup::Arms => "Arms",
      MuscleGroup::Core => "Core",
      MuscleGroup::FullBody => "FullBody",
      MuscleGroup::Other => "Other",
    }
  }
}

impl std::str::FromStr for MuscleGroup {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized: String = s
      .chars()
      .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
      .collect::<String>()
      .to_lowercase();
    match normalized.as_str() {
      "chest" => Ok(Self::Chest),
      "back" => Ok(Self::Back),
      "legs" => Ok(Self::Legs),
      "shoulders" => Ok(Self::Shoulders),
      "arms" => Ok(Self::Arms),
      "core" => Ok(Self::Core),
      "fullbody" => Ok(Self::FullBody),
      "other" => Ok(Self::Other),
      _ => Err(format!("Unknown muscle group: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExerciseType {
  Compound,
  Isolation,
  Cardio,
  Stretching,
}

impl ExerciseType {
  pub fn as_str(&self) -> &'static str {
    match self {
      ExerciseType::Compound => "Compound",
      ExerciseType::Isolation => "Isolation",
      ExerciseType::Cardio => "Cardio",
      ExerciseType::Stretching => "Stretching",
    }
  }
}

impl std::str::FromStr for ExerciseType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "compound" => Ok(Self::Compound),
      "isolation" => Ok(Self::Isolation),
      "cardio" => Ok(Self::Cardio),
      "stretching" => Ok(Self::Stretching),
      _ => Err(format!("Unknown exercise type: {}", s)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mechanics {
  Push,
  Pull,
  Static,
  #[serde(rename = "N/A")]
  NotApplicable,
}

impl Mechanics {
  pub fn as_str(&self) -> &'static str {
    match self {
      Mechanics::Push => "Push",
      Mechanics::Pull => "Pull",
      Mechanics::Static => "Static",
      Mechanics::NotApplicable => "N/A",
    }
  }
}

impl std::str::FromStr for Mechanics {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "push" => Ok(Self::Push),
      "pull" => Ok(Self::Pull),
      "static" => Ok(Self::Static),
      "n/a" | "na" | "" => Ok(Self::NotApplicable),
      _ => Err(format!("Unknown mechanics: {}", s)),
    }
  }
}

/// A secondary muscle entry: either a whole group or specific parts of one.
/// A detailed entry without `subMuscles` stands for the whole group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecondaryMuscle {
  Group(String),
  Detailed {
    group: String,
    #[serde(rename = "subMuscles", default, skip_serializing_if = "Option::is_none")]
    sub_muscles: Option<Vec<String>>,
  },
}

/// Reference data describing one exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseDefinition {
  pub id: Option<i64>,
  pub name: String,
  pub muscle_group: Option<MuscleGroup>,
  pub exercise_type: ExerciseType,
  pub mechanics: Mechanics,
  pub equipment: String,
  pub difficulty: u8,
  #[serde(default)]
  pub secondary_muscles: Vec<SecondaryMuscle>,
  #[serde(with = "sparse_engagement", default)]
  pub muscle_engagement: EngagementMap,
}

impl ExerciseDefinition {
  pub fn new(name: &str, muscle_group: MuscleGroup, exercise_type: ExerciseType) -> Self {
    Self {
      id: None,
      name: name.to_string(),
      muscle_group: Some(muscle_group),
      exercise_type,
      mechanics: Mechanics::NotApplicable,
      equipment: "None".to_string(),
      difficulty: 1,
      secondary_muscles: Vec::new(),
      muscle_engagement: EngagementMap::default(),
    }
  }

  pub fn with_engagement(mut self, pairs: &[(MusclePart, f64)]) -> Self {
    self.muscle_engagement = EngagementMap::from_pairs(pairs);
    self
  }

  pub fn with_secondary(mut self, secondary: Vec<SecondaryMuscle>) -> Self {
    self.secondary_muscles = secondary;
    self
  }

  pub fn with_mechanics(mut self, mechanics: Mechanics, equipment: &str, difficulty: u8) -> Self {
    self.mechanics = mechanics;
    self.equipment = equipment.to_string();
    self.difficulty = difficulty.clamp(1, 5);
    self
  }

  pub fn is_compound(&self) -> bool {
    self.exercise_type == ExerciseType::Compound
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_muscle_group_parsing_is_lenient() {
    assert_eq!("Full Body".parse::<MuscleGroup>(), Ok(MuscleGroup::FullBody));
    assert_eq!("legs".parse::<MuscleGroup>(), Ok(MuscleGroup::Legs));
    assert!("Neck".parse::<MuscleGroup>().is_err());
  }

  #[test]
  fn test_secondary_muscles_accept_both_shapes() {
    let parsed: Vec<SecondaryMuscle> = serde_json::from_str(
      r#"["Arms", {"group": "Shoulders", "subMuscles": ["frontDelts"]}, {"group": "Legs"}]"#,
    )
    .unwrap();

    assert_eq!(parsed[0], SecondaryMuscle::Group("Arms".to_string()));
    assert_eq!(
      parsed[1],
      SecondaryMuscle::Detailed {
        group: "Shoulders".to_string(),
        sub_muscles: Some(vec!["frontDelts".to_string()]),
      }
    );
    assert_eq!(
      parsed[2],
      SecondaryMuscle::Detailed {
        group: "Legs".to_string(),
        sub_muscles: None,
      }
    );
  }

  #[test]
  fn test_mechanics_serializes_not_applicable_as_slash() {
    let json = serde_json::to_string(&Mechanics::NotApplicable).unwrap();
    assert_eq!(json, r#""N/A""#);
  }
}
