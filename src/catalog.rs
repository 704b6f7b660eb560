//! Built-in exercise catalog
//!
//! Common gym exercises with hand-tuned engagement percentages. A few entries
//! carry no engagement map on purpose and rely on their primary group and
//! secondary muscles instead.

use serde::Serialize;
use tracing::{debug, info};

use crate::models::{
  ExerciseDefinition, ExerciseType, Mechanics, MuscleGroup, MusclePart, SecondaryMuscle,
};
use crate::store::{StoreError, TrainingStore};

use ExerciseType::{Compound, Isolation};
use Mechanics::{Pull, Push, Static};
use MusclePart::*;

struct CatalogEntry {
  name: &'static str,
  group: MuscleGroup,
  exercise_type: ExerciseType,
  mechanics: Mechanics,
  equipment: &'static str,
  difficulty: u8,
  engagement: &'static [(MusclePart, f64)],
  /// (group, listed parts); no listed parts means the whole group
  secondary: &'static [(&'static str, &'static [&'static str])],
}

impl From<&CatalogEntry> for ExerciseDefinition {
  fn from(entry: &CatalogEntry) -> Self {
    let secondary = entry
      .secondary
      .iter()
      .map(|(group, parts)| {
        if parts.is_empty() {
          SecondaryMuscle::Group(group.to_string())
        } else {
          SecondaryMuscle::Detailed {
            group: group.to_string(),
            sub_muscles: Some(parts.iter().map(|p| p.to_string()).collect()),
          }
        }
      })
      .collect();

    ExerciseDefinition::new(entry.name, entry.group, entry.exercise_type)
      .with_mechanics(entry.mechanics, entry.equipment, entry.difficulty)
      .with_engagement(entry.engagement)
      .with_secondary(secondary)
  }
}

const DEFAULT_EXERCISES: [CatalogEntry; 26] = [
  // Chest
  CatalogEntry {
    name: "Barbell Bench Press",
    group: MuscleGroup::Chest,
    exercise_type: Compound,
    mechanics: Push,
    equipment: "Barbell",
    difficulty: 3,
    engagement: &[
      (MiddleChest, 90.0),
      (UpperChest, 50.0),
      (LowerChest, 50.0),
      (FrontDelts, 40.0),
      (Triceps, 45.0),
    ],
    secondary: &[],
  },
  CatalogEntry {
    name: "Incline Dumbbell Press",
    group: MuscleGroup::Chest,
    exercise_type: Compound,
    mechanics: Push,
    equipment: "Dumbbell",
    difficulty: 3,
    engagement: &[(UpperChest, 90.0), (MiddleChest, 50.0), (FrontDelts, 55.0), (Triceps, 35.0)],
    secondary: &[],
  },
  CatalogEntry {
    name: "Dips",
    group: MuscleGroup::Chest,
    exercise_type: Compound,
    mechanics: Push,
    equipment: "Bodyweight",
    difficulty: 3,
    engagement: &[(LowerChest, 85.0), (Triceps, 75.0), (FrontDelts, 40.0)],
    secondary: &[],
  },
  CatalogEntry {
    name: "Push-up",
    group: MuscleGroup::Chest,
    exercise_type: Compound,
    mechanics: Push,
    equipment: "Bodyweight",
    difficulty: 1,
    engagement: &[],
    secondary: &[("Arms", &["triceps"]), ("Shoulders", &["frontDelts"])],
  },
  CatalogEntry {
    name: "Cable Fly",
    group: MuscleGroup::Chest,
    exercise_type: Isolation,
    mechanics: Push,
    equipment: "Cable",
    difficulty: 2,
    engagement: &[(MiddleChest, 85.0), (UpperChest, 40.0), (LowerChest, 40.0), (FrontDelts, 20.0)],
    secondary: &[],
  },
  // Back
  CatalogEntry {
    name: "Deadlift",
    group: MuscleGroup::Back,
    exercise_type: Compound,
    mechanics: Pull,
    equipment: "Barbell",
    difficulty: 5,
    engagement: &[
      (LowerBack, 90.0),
      (Hamstrings, 70.0),
      (Glutes, 75.0),
      (UpperBack, 50.0),
      (Quads, 35.0),
      (Forearms, 40.0),
    ],
    secondary: &[],
  },
  CatalogEntry {
    name: "Pull-up",
    group: MuscleGroup::Back,
    exercise_type: Compound,
    mechanics: Pull,
    equipment: "Bodyweight",
    difficulty: 4,
    engagement: &[
      (Lats, 90.0),
      (UpperBack, 50.0),
      (Biceps, 60.0),
      (RearDelts, 30.0),
      (Forearms, 30.0),
    ],
    secondary: &[],
  },
  CatalogEntry {
    name: "Barbell Row",
    group: MuscleGroup::Back,
    exercise_type: Compound,
    mechanics: Pull,
    equipment: "Barbell",
    difficulty: 3,
    engagement: &[
      (UpperBack, 85.0),
      (Lats, 70.0),
      (RearDelts, 45.0),
      (Biceps, 45.0),
      (LowerBack, 40.0),
    ],
    secondary: &[],
  },
  CatalogEntry {
    name: "Lat Pulldown",
    group: MuscleGroup::Back,
    exercise_type: Compound,
    mechanics: Pull,
    equipment: "Cable",
    difficulty: 2,
    engagement: &[(Lats, 85.0), (UpperBack, 40.0), (Biceps, 50.0)],
    secondary: &[],
  },
  CatalogEntry {
    name: "Seated Cable Row",
    group: MuscleGroup::Back,
    exercise_type: Compound,
    mechanics: Pull,
    equipment: "Cable",
    difficulty: 2,
    engagement: &[],
    secondary: &[("Arms", &["biceps"]), ("Shoulders", &["rearDelts"])],
  },
  // Shoulders
  CatalogEntry {
    name: "Overhead Press",
    group: MuscleGroup::Shoulders,
    exercise_type: Compound,
    mechanics: Push,
    equipment: "Barbell",
    difficulty: 3,
    engagement: &[(FrontDelts, 90.0), (SideDelts, 50.0), (Triceps, 55.0), (UpperChest, 25.0)],
    secondary: &[],
  },
  CatalogEntry {
    name: "Lateral Raise",
    group: MuscleGroup::Shoulders,
    exercise_type: Isolation,
    mechanics: Push,
    equipment: "Dumbbell",
    difficulty: 1,
    engagement: &[(SideDelts, 90.0), (FrontDelts, 20.0)],
    secondary: &[],
  },
  CatalogEntry {
    name: "Front Raise",
    group: MuscleGroup::Shoulders,
    exercise_type: Isolation,
    mechanics: Push,
    equipment: "Dumbbell",
    difficulty: 1,
    engagement: &[(FrontDelts, 85.0), (SideDelts, 25.0)],
    secondary: &[],
  },
  CatalogEntry {
    name: "Face Pull",
    group: MuscleGroup::Shoulders,
    exercise_type: Isolation,
    mechanics: Pull,
    equipment: "Cable",
    difficulty: 2,
    engagement: &[(RearDelts, 85.0), (UpperBack, 50.0), (SideDelts, 25.0)],
    secondary: &[],
  },
  CatalogEntry {
    name: "Reverse Fly",
    group: MuscleGroup::Shoulders,
    exercise_type: Isolation,
    mechanics: Pull,
    equipment: "Dumbbell",
    difficulty: 1,
    engagement: &[(RearDelts, 90.0), (UpperBack, 35.0)],
    secondary: &[],
  },
  // Arms
  CatalogEntry {
    name: "Barbell Curl",
    group: MuscleGroup::Arms,
    exercise_type: Isolation,
    mechanics: Pull,
    equipment: "Barbell",
    difficulty: 1,
    engagement: &[(Biceps, 90.0), (Forearms, 35.0)],
    secondary: &[],
  },
  CatalogEntry {
    name: "Hammer Curl",
    group: MuscleGroup::Arms,
    exercise_type: Isolation,
    mechanics: Pull,
    equipment: "Dumbbell",
    difficulty: 1,
    engagement: &[(Biceps, 70.0), (Forearms, 60.0)],
    secondary: &[],
  },
  CatalogEntry {
    name: "Triceps Pushdown",
    group: MuscleGroup::Arms,
    exercise_type: Isolation,
    mechanics: Push,
    equipment: "Cable",
    difficulty: 1,
    engagement: &[(Triceps, 90.0)],
    secondary: &[],
  },
  CatalogEntry {
    name: "Skull Crusher",
    group: MuscleGroup::Arms,
    exercise_type: Isolation,
    mechanics: Push,
    equipment: "Barbell",
    difficulty: 2,
    engagement: &[(Triceps, 90.0), (Forearms, 20.0)],
    secondary: &[],
  },
  // Legs
  CatalogEntry {
    name: "Back Squat",
    group: MuscleGroup::Legs,
    exercise_type: Compound,
    mechanics: Push,
    equipment: "Barbell",
    difficulty: 4,
    engagement: &[
      (Quads, 90.0),
      (Glutes, 75.0),
      (Hamstrings, 40.0),
      (LowerBack, 35.0),
      (UpperAbs, 20.0),
    ],
    secondary: &[],
  },
  CatalogEntry {
    name: "Romanian Deadlift",
    group: MuscleGroup::Legs,
    exercise_type: Compound,
    mechanics: Pull,
    equipment: "Barbell",
    difficulty: 3,
    engagement: &[(Hamstrings, 90.0), (Glutes, 70.0), (LowerBack, 50.0)],
    secondary: &[],
  },
  CatalogEntry {
    name: "Leg Press",
    group: MuscleGroup::Legs,
    exercise_type: Compound,
    mechanics: Push,
    equipment: "Machine",
    difficulty: 2,
    engagement: &[(Quads, 85.0), (Glutes, 55.0), (Hamstrings, 30.0)],
    secondary: &[],
  },
  CatalogEntry {
    name: "Leg Extension",
    group: MuscleGroup::Legs,
    exercise_type: Isolation,
    mechanics: Push,
    equipment: "Machine",
    difficulty: 1,
    engagement: &[(Quads, 90.0)],
    secondary: &[],
  },
  CatalogEntry {
    name: "Leg Curl",
    group: MuscleGroup::Legs,
    exercise_type: Isolation,
    mechanics: Pull,
    equipment: "Machine",
    difficulty: 1,
    engagement: &[(Hamstrings, 90.0)],
    secondary: &[],
  },
  CatalogEntry {
    name: "Standing Calf Raise",
    group: MuscleGroup::Legs,
    exercise_type: Isolation,
    mechanics: Push,
    equipment: "Machine",
    difficulty: 1,
    engagement: &[(Calves, 95.0)],
    secondary: &[],
  },
  // Core
  CatalogEntry {
    name: "Hanging Leg Raise",
    group: MuscleGroup::Core,
    exercise_type: Isolation,
    mechanics: Static,
    equipment: "Bodyweight",
    difficulty: 3,
    engagement: &[],
    secondary: &[("Arms", &["forearms"])],
  },
];

/// The built-in catalog as exercise definitions, in catalog order
pub fn default_catalog() -> Vec<ExerciseDefinition> {
  DEFAULT_EXERCISES.iter().map(ExerciseDefinition::from).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
  pub inserted: usize,
  pub skipped: usize,
}

/// Insert every catalog exercise the store does not already know by name
pub async fn seed_default_catalog<S: TrainingStore>(store: &S) -> Result<SeedSummary, StoreError> {
  let mut summary = SeedSummary::default();

  for exercise in default_catalog() {
    if store.find_exercise_by_name(&exercise.name).await?.is_some() {
      debug!(exercise = %exercise.name, "Exercise already present");
      summary.skipped += 1;
      continue;
    }
    store.insert_exercise(&exercise).await?;
    summary.inserted += 1;
  }

  info!(inserted = summary.inserted, skipped = summary.skipped, "Seeded exercise catalog");
  Ok(summary)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::engagement::resolve_engagement;
  use crate::models::TrainingGroup;
  use crate::store::SqliteStore;
  use crate::test_utils::{setup_test_db, teardown_test_db};
  use std::collections::HashSet;

  #[test]
  fn test_catalog_names_are_unique() {
    let names: HashSet<&str> = DEFAULT_EXERCISES.iter().map(|e| e.name).collect();
    assert_eq!(names.len(), DEFAULT_EXERCISES.len());
  }

  #[test]
  fn test_every_training_group_has_a_primary_exercise() {
    let catalog = default_catalog();
    for group in TrainingGroup::ALL {
      let covered = catalog.iter().any(|exercise| {
        let engagement = resolve_engagement(exercise);
        group.parts().iter().any(|p| engagement[*p] >= 50.0)
      });
      assert!(covered, "no exercise trains {}", group);
    }
  }

  #[test]
  fn test_fallback_entries_resolve_through_groups() {
    let catalog = default_catalog();
    let push_up = catalog.iter().find(|e| e.name == "Push-up").unwrap();

    let engagement = resolve_engagement(push_up);

    assert_eq!(engagement[MusclePart::MiddleChest], 80.0);
    assert_eq!(engagement[MusclePart::Triceps], 40.0);
    assert_eq!(engagement[MusclePart::Biceps], 0.0);
  }

  #[tokio::test]
  async fn test_seeding_is_idempotent() {
    let pool = setup_test_db().await;
    let store = SqliteStore::new(pool.clone());

    let first = seed_default_catalog(&store).await.unwrap();
    let second = seed_default_catalog(&store).await.unwrap();

    assert_eq!(first.inserted, DEFAULT_EXERCISES.len());
    assert_eq!(second, SeedSummary { inserted: 0, skipped: DEFAULT_EXERCISES.len() });
    assert_eq!(store.find_all_exercises().await.unwrap().len(), DEFAULT_EXERCISES.len());

    teardown_test_db(pool).await;
  }
}
