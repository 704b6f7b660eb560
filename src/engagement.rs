//! Muscle engagement resolution
//!
//! Explicit per-part engagement data is authoritative. Exercises without it fall
//! back to their primary group (80%) overlaid with secondary muscles (40%).

use crate::models::{EngagementMap, ExerciseDefinition, MuscleGroup, MusclePart, SecondaryMuscle};

pub const PRIMARY_GROUP_ENGAGEMENT: f64 = 80.0;
pub const SECONDARY_ENGAGEMENT: f64 = 40.0;

/// Resolve the per-part engagement of an exercise. May be empty.
pub fn resolve_engagement(exercise: &ExerciseDefinition) -> EngagementMap {
  if exercise.muscle_engagement.has_positive() {
    return exercise.muscle_engagement;
  }

  let mut engagement = EngagementMap::default();

  if let Some(group) = exercise.muscle_group {
    for part in group.parts() {
      engagement[*part] = PRIMARY_GROUP_ENGAGEMENT;
    }
  }

  // Later entries overwrite earlier ones, including the primary expansion
  for secondary in &exercise.secondary_muscles {
    match secondary {
      SecondaryMuscle::Group(name)
      | SecondaryMuscle::Detailed {
        group: name,
        sub_muscles: None,
      } => {
        for part in secondary_parts(name) {
          engagement[part] = SECONDARY_ENGAGEMENT;
        }
      }
      SecondaryMuscle::Detailed {
        sub_muscles: Some(sub_muscles),
        ..
      } => {
        for part in sub_muscles.iter().filter_map(|s| s.parse::<MusclePart>().ok()) {
          engagement[part] = SECONDARY_ENGAGEMENT;
        }
      }
    }
  }

  engagement
}

/// A bare secondary name is normally a group ("Arms"); single parts ("triceps")
/// are accepted too. Unknown names contribute nothing.
fn secondary_parts(name: &str) -> Vec<MusclePart> {
  if let Ok(group) = name.parse::<MuscleGroup>() {
    return group.parts().to_vec();
  }
  name.parse::<MusclePart>().map(|p| vec![p]).unwrap_or_default()
}
