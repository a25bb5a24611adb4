//! Default catalog of exercises.
//!
//! This module provides the built-in exercises and the lookup seam the
//! session engine uses to resolve an exercise id.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Exercise lookup by id
///
/// A miss is never fatal: callers skip the affected entry and log it.
pub trait ExerciseLookup {
    fn find(&self, exercise_id: &str) -> Option<&ExerciseDefinition>;
}

impl ExerciseLookup for Catalog {
    fn find(&self, exercise_id: &str) -> Option<&ExerciseDefinition> {
        self.exercises.get(exercise_id)
    }
}

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for tests that need an owned,
/// modifiable catalog.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn load(
    id: &str,
    name: &str,
    body_part: BodyPart,
    category: Category,
    weight: f64,
    reps: u32,
) -> ExerciseDefinition {
    ExerciseDefinition {
        id: id.into(),
        name: name.into(),
        body_part,
        category,
        default_weight: Some(weight),
        default_reps: Some(reps),
        default_duration: None,
    }
}

fn timed(id: &str, name: &str, body_part: BodyPart, duration: &str) -> ExerciseDefinition {
    ExerciseDefinition {
        id: id.into(),
        name: name.into(),
        body_part,
        category: Category::Duration,
        default_weight: None,
        default_reps: None,
        default_duration: Some(duration.into()),
    }
}

fn build_default_catalog_internal() -> Catalog {
    use BodyPart::*;
    use Category::*;

    let definitions = vec![
        load("1", "Seated Overhead Press", Shoulders, Barbell, 95.0, 8),
        load("2", "Bicep Curl", Arms, Barbell, 45.0, 10),
        timed("3", "Plank", Core, "1:00"),
        load("4", "Front Squat", Legs, Barbell, 135.0, 6),
        load("5", "Lunge", Legs, Dumbbell, 20.0, 12),
        load("6", "Shrug", Shoulders, Barbell, 135.0, 12),
        timed("7", "Ab Wheel", Core, "0:45"),
        load("8", "Bench Press", Chest, Barbell, 135.0, 8),
        load("9", "Bent Over One Arm Row", Back, Dumbbell, 40.0, 10),
        load("10", "Decline Crunch", Core, WeightedBodyweight, 10.0, 15),
        load("11", "Deadlift", Back, Barbell, 185.0, 5),
        load("12", "Triceps Extension", Arms, Dumbbell, 15.0, 12),
        load("13", "Hanging Leg Raise", Core, WeightedBodyweight, 5.0, 10),
        load("14", "Stiff Leg Deadlift", Back, Barbell, 135.0, 8),
    ];

    let exercises = definitions
        .into_iter()
        .map(|def| (def.id.clone(), def))
        .collect::<HashMap<_, _>>();

    Catalog { exercises }
}

impl Catalog {
    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, def) in &self.exercises {
            if id.is_empty() || def.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if id != &def.id {
                errors.push(format!(
                    "Exercise key '{}' doesn't match exercise.id '{}'",
                    id, def.id
                ));
            }
            if def.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", id));
            }

            // Defaults must match the recording shape of the category
            if def.category.tracks_time() {
                if def.default_weight.is_some() || def.default_reps.is_some() {
                    errors.push(format!(
                        "Duration exercise '{}' has weight/reps defaults",
                        id
                    ));
                }
            } else if def.default_duration.is_some() {
                errors.push(format!(
                    "Exercise '{}' has a duration default but records weight/reps",
                    id
                ));
            }
        }

        errors
    }

    /// Exercises sorted by numeric id where possible, for stable listings
    pub fn sorted(&self) -> Vec<&ExerciseDefinition> {
        let mut defs: Vec<_> = self.exercises.values().collect();
        defs.sort_by(|a, b| {
            match (a.id.parse::<u64>(), b.id.parse::<u64>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => a.id.cmp(&b.id),
            }
        });
        defs
    }
}

/// Criteria for browsing the exercise library; unset fields match everything
#[derive(Clone, Debug, Default)]
pub struct ExerciseFilter {
    /// Case-insensitive substring of the exercise name
    pub query: Option<String>,
    pub body_part: Option<BodyPart>,
    pub category: Option<Category>,
}

impl ExerciseFilter {
    pub fn matches(&self, def: &ExerciseDefinition) -> bool {
        if self.body_part.is_some_and(|part| part != def.body_part) {
            return false;
        }
        if self.category.is_some_and(|category| category != def.category) {
            return false;
        }
        match self.query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => def
                .name
                .to_lowercase()
                .contains(&query.to_lowercase()),
            _ => true,
        }
    }
}

impl Catalog {
    /// Exercises matching `filter`, in catalog order
    pub fn search(&self, filter: &ExerciseFilter) -> Vec<&ExerciseDefinition> {
        self.sorted()
            .into_iter()
            .filter(|def| filter.matches(def))
            .collect()
    }
}
