//! Built-in workout templates and template lookup.

use crate::catalog::ExerciseLookup;
use crate::types::{Template, TemplateExercise};
use chrono::{TimeZone, Utc};

/// Where a starting session reads its template from
///
/// Read once when the session starts. `None` means nothing was staged (or
/// what was staged could not be read), which aborts the session.
pub trait TemplateSource {
    fn load_active_template(&self) -> Option<Template>;
}

impl TemplateSource for Option<Template> {
    fn load_active_template(&self) -> Option<Template> {
        self.clone()
    }
}

fn lifts(exercise_id: &str, sets: u32, reps: u32, weight: f64) -> TemplateExercise {
    TemplateExercise {
        exercise_id: exercise_id.into(),
        sets,
        reps: Some(reps),
        weight: Some(weight),
        duration: None,
    }
}

fn hold(exercise_id: &str, sets: u32, duration: &str) -> TemplateExercise {
    TemplateExercise {
        exercise_id: exercise_id.into(),
        sets,
        reps: None,
        weight: None,
        duration: Some(duration.into()),
    }
}

/// The four-day split shipped with the app
pub fn builtin_templates() -> Vec<Template> {
    let modified = Utc.with_ymd_and_hms(2024, 12, 2, 0, 0, 0).single().unwrap_or_default();

    vec![
        Template {
            id: "1".into(),
            name: "Day 1 (OH Press)".into(),
            exercises: vec![lifts("1", 3, 8, 95.0), lifts("2", 3, 10, 45.0), hold("3", 3, "1:00")],
            last_modified: modified,
        },
        Template {
            id: "2".into(),
            name: "Day 2 (Squat)".into(),
            exercises: vec![
                lifts("4", 3, 6, 135.0),
                lifts("5", 3, 12, 20.0),
                lifts("6", 3, 12, 135.0),
                hold("7", 3, "0:45"),
            ],
            last_modified: modified,
        },
        Template {
            id: "3".into(),
            name: "Day 3 (Bench)".into(),
            exercises: vec![
                lifts("8", 3, 8, 135.0),
                lifts("9", 3, 10, 40.0),
                lifts("10", 3, 15, 10.0),
            ],
            last_modified: modified,
        },
        Template {
            id: "4".into(),
            name: "Day 4 (Deadlift)".into(),
            exercises: vec![
                lifts("11", 3, 5, 185.0),
                lifts("14", 3, 8, 135.0),
                lifts("12", 3, 12, 15.0),
                lifts("13", 3, 10, 5.0),
            ],
            last_modified: modified,
        },
    ]
}

/// Find a template by exact id, then by case-insensitive name or name prefix
pub fn find_template<'a>(templates: &'a [Template], query: &str) -> Option<&'a Template> {
    let needle = query.trim().to_lowercase();
    templates
        .iter()
        .find(|t| t.id == query.trim())
        .or_else(|| templates.iter().find(|t| t.name.to_lowercase() == needle))
        .or_else(|| {
            templates
                .iter()
                .find(|t| t.name.to_lowercase().starts_with(&needle))
        })
}

impl Template {
    /// Exercise ids this template references that the catalog does not know
    pub fn unknown_exercises(&self, catalog: &impl ExerciseLookup) -> Vec<String> {
        self.exercises
            .iter()
            .filter(|e| catalog.find(&e.exercise_id).is_none())
            .map(|e| e.exercise_id.clone())
            .collect()
    }
}
