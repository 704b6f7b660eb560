pub mod exercise;
pub mod muscle;
pub mod plan;
pub mod workout;

pub use exercise::{ExerciseDefinition, ExerciseType, Mechanics, MuscleGroup, SecondaryMuscle};
pub use muscle::{expand_groups, BalanceGroup, EngagementMap, MusclePart, PartMap, TrainingGroup};
pub use plan::{PlanFilter, PlanType, PlannedExercise, WorkoutPlan};
pub use workout::{ExercisePerformance, SetRecord, WorkoutRecord};
