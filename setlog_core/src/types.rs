//! Core domain types for setlog.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise definitions and the catalog
//! - Templates
//! - Working sets and active exercises (the live ledger)
//! - Workout snapshots (what gets persisted)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// Body region an exercise mainly works
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Arms,
    Back,
    Core,
    Legs,
    Shoulders,
    Chest,
}

impl BodyPart {
    pub const ALL: [BodyPart; 6] = [
        BodyPart::Arms,
        BodyPart::Back,
        BodyPart::Core,
        BodyPart::Legs,
        BodyPart::Shoulders,
        BodyPart::Chest,
    ];
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BodyPart::Arms => "Arms",
            BodyPart::Back => "Back",
            BodyPart::Core => "Core",
            BodyPart::Legs => "Legs",
            BodyPart::Shoulders => "Shoulders",
            BodyPart::Chest => "Chest",
        };
        f.write_str(name)
    }
}

impl FromStr for BodyPart {
    type Err = crate::Error;

    /// Case-insensitive body part name
    fn from_str(s: &str) -> crate::Result<Self> {
        let wanted = s.trim();
        BodyPart::ALL
            .into_iter()
            .find(|part| part.to_string().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                crate::Error::Other(format!(
                    "Unknown body part '{}' (expected one of: {})",
                    s,
                    join_names(&BodyPart::ALL)
                ))
            })
    }
}

/// Equipment/recording category of an exercise
///
/// Only `Duration` exercises record elapsed time; every other category
/// records weight and reps.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Barbell,
    Dumbbell,
    Bodyweight,
    Machine,
    Cable,
    Duration,
    #[serde(rename = "Weighted Bodyweight")]
    WeightedBodyweight,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Barbell,
        Category::Dumbbell,
        Category::Bodyweight,
        Category::Machine,
        Category::Cable,
        Category::Duration,
        Category::WeightedBodyweight,
    ];

    pub fn tracks_time(self) -> bool {
        matches!(self, Category::Duration)
    }

    /// A fresh, uncompleted set shaped for this category
    pub fn new_set(self) -> WorkingSet {
        let values = if self.tracks_time() {
            SetValues::Timed {
                time: String::new(),
            }
        } else {
            SetValues::Load {
                weight: None,
                reps: None,
            }
        };
        WorkingSet {
            values,
            completed: false,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Barbell => "Barbell",
            Category::Dumbbell => "Dumbbell",
            Category::Bodyweight => "Bodyweight",
            Category::Machine => "Machine",
            Category::Cable => "Cable",
            Category::Duration => "Duration",
            Category::WeightedBodyweight => "Weighted Bodyweight",
        };
        f.write_str(name)
    }
}

impl FromStr for Category {
    type Err = crate::Error;

    /// Case-insensitive category name; `-` or `_` may stand in for the space
    fn from_str(s: &str) -> crate::Result<Self> {
        let wanted = s.trim().replace(['-', '_'], " ");
        Category::ALL
            .into_iter()
            .find(|category| category.to_string().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                crate::Error::Other(format!(
                    "Unknown category '{}' (expected one of: {})",
                    s,
                    join_names(&Category::ALL)
                ))
            })
    }
}

fn join_names<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// An exercise definition (e.g., "Bench Press")
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub id: String,
    pub name: String,
    pub body_part: BodyPart,
    pub category: Category,
    pub default_weight: Option<f64>,
    pub default_reps: Option<u32>,
    pub default_duration: Option<String>,
}

/// The complete catalog of known exercises, keyed by id
#[derive(Clone, Debug)]
pub struct Catalog {
    pub exercises: HashMap<String, ExerciseDefinition>,
}

// ============================================================================
// Template Types
// ============================================================================

/// One exercise slot in a template
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateExercise {
    pub exercise_id: String,
    pub sets: u32,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub duration: Option<String>,
}

/// A named, ordered list of exercises a session starts from
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub exercises: Vec<TemplateExercise>,
    #[serde(default = "Utc::now")]
    pub last_modified: DateTime<Utc>,
}

// ============================================================================
// Ledger Types
// ============================================================================

/// A value typed into a set field
///
/// Programmatic callers supply numbers directly; interactive callers pass
/// the raw text the user typed. Raw text is only parsed at finish time.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Entry {
    Number(f64),
    Raw(String),
}

impl Entry {
    /// Interpret the entry as a number.
    ///
    /// Blank raw text counts as "not entered". Anything else that does not
    /// parse to a finite number is returned as the offending text.
    pub fn as_number(&self) -> std::result::Result<Option<f64>, String> {
        match self {
            Entry::Number(n) if n.is_finite() => Ok(Some(*n)),
            Entry::Number(n) => Err(n.to_string()),
            Entry::Raw(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(Some(n)),
                    _ => Err(text.clone()),
                }
            }
        }
    }
}

impl From<f64> for Entry {
    fn from(n: f64) -> Self {
        Entry::Number(n)
    }
}

impl From<u32> for Entry {
    fn from(n: u32) -> Self {
        Entry::Number(f64::from(n))
    }
}

impl From<&str> for Entry {
    fn from(text: &str) -> Self {
        Entry::Raw(text.to_string())
    }
}

impl From<String> for Entry {
    fn from(text: String) -> Self {
        Entry::Raw(text)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Number(n) => write!(f, "{}", n),
            Entry::Raw(text) => f.write_str(text),
        }
    }
}

/// Field shape of a working set, fixed when the set is created
#[derive(Clone, Debug, PartialEq)]
pub enum SetValues {
    Load {
        weight: Option<Entry>,
        reps: Option<Entry>,
    },
    Timed {
        time: String,
    },
}

/// A single set being logged during a session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WorkingSetRepr", into = "WorkingSetRepr")]
pub struct WorkingSet {
    pub values: SetValues,
    pub completed: bool,
}

impl WorkingSet {
    pub fn is_timed(&self) -> bool {
        matches!(self.values, SetValues::Timed { .. })
    }
}

/// Flat on-disk shape of a working set
#[derive(Clone, Debug, Serialize, Deserialize)]
struct WorkingSetRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weight: Option<Entry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reps: Option<Entry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time: Option<String>,
    completed: bool,
}

impl TryFrom<WorkingSetRepr> for WorkingSet {
    type Error = String;

    fn try_from(repr: WorkingSetRepr) -> std::result::Result<Self, Self::Error> {
        let values = match (repr.time, repr.weight, repr.reps) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err("a set cannot carry both time and weight/reps".into())
            }
            (Some(time), None, None) => SetValues::Timed { time },
            (None, weight, reps) => SetValues::Load { weight, reps },
        };
        Ok(WorkingSet {
            values,
            completed: repr.completed,
        })
    }
}

impl From<WorkingSet> for WorkingSetRepr {
    fn from(set: WorkingSet) -> Self {
        match set.values {
            SetValues::Load { weight, reps } => WorkingSetRepr {
                weight,
                reps,
                time: None,
                completed: set.completed,
            },
            SetValues::Timed { time } => WorkingSetRepr {
                weight: None,
                reps: None,
                time: Some(time),
                completed: set.completed,
            },
        }
    }
}

/// An exercise in the live session with its sets in display order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveExercise {
    pub exercise_id: String,
    pub sets: Vec<WorkingSet>,
}

impl ActiveExercise {
    pub fn new(exercise_id: impl Into<String>) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            sets: Vec::new(),
        }
    }
}

/// Checkpoint of an in-progress session, used to start and resume it
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveSession {
    pub template: Template,
    #[serde(default)]
    pub exercises: Vec<ActiveExercise>,
    pub started_at: DateTime<Utc>,
}

impl LiveSession {
    /// A freshly staged session that has not been started yet
    pub fn staged(template: Template, now: DateTime<Utc>) -> Self {
        Self {
            template,
            exercises: Vec::new(),
            started_at: now,
        }
    }
}

// ============================================================================
// Snapshot Types
// ============================================================================

/// A validated set as stored
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub completed: bool,
}

/// A validated exercise as stored
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedExercise {
    pub exercise_id: String,
    pub sets: Vec<RecordedSet>,
}

/// A finished workout, immutable once created
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSnapshot {
    pub id: Uuid,
    pub name: String,
    pub exercises: Vec<RecordedExercise>,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_set_shape_follows_category() {
        assert!(Category::Duration.new_set().is_timed());
        assert!(!Category::Barbell.new_set().is_timed());
        assert!(!Category::WeightedBodyweight.new_set().is_timed());
    }

    #[test]
    fn test_entry_as_number() {
        assert_eq!(Entry::from(95.0).as_number(), Ok(Some(95.0)));
        assert_eq!(Entry::from(" 8 ").as_number(), Ok(Some(8.0)));
        assert_eq!(Entry::from("").as_number(), Ok(None));
        assert_eq!(Entry::from("abc").as_number(), Err("abc".to_string()));
        assert!(Entry::from("NaN").as_number().is_err());
    }

    #[test]
    fn test_working_set_wire_shape() {
        let set = WorkingSet {
            values: SetValues::Load {
                weight: Some(Entry::from(95.0)),
                reps: Some(Entry::from("8")),
            },
            completed: true,
        };
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"weight": 95.0, "reps": "8", "completed": true})
        );

        let timed: WorkingSet =
            serde_json::from_str(r#"{"time":"1:00","completed":false}"#).unwrap();
        assert_eq!(
            timed.values,
            SetValues::Timed {
                time: "1:00".into()
            }
        );
    }

    #[test]
    fn test_working_set_rejects_mixed_shape() {
        let result =
            serde_json::from_str::<WorkingSet>(r#"{"time":"1:00","reps":5,"completed":false}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let snapshot = WorkoutSnapshot {
            id: Uuid::nil(),
            name: "Day 1".into(),
            exercises: vec![RecordedExercise {
                exercise_id: "3".into(),
                sets: vec![RecordedSet {
                    weight: None,
                    reps: None,
                    time: Some("0:45".into()),
                    completed: true,
                }],
            }],
            completed_at: DateTime::parse_from_rfc3339("2024-12-02T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["exercises"][0]["exerciseId"], "3");
        assert_eq!(
            json["exercises"][0]["sets"][0],
            serde_json::json!({"time": "0:45", "completed": true})
        );
        assert!(json["completedAt"].as_str().unwrap().starts_with("2024-12-02T10:00:00"));
    }

    #[test]
    fn test_body_part_and_category_names() {
        assert_eq!("core".parse::<BodyPart>().unwrap(), BodyPart::Core);
        assert_eq!(" LEGS ".parse::<BodyPart>().unwrap(), BodyPart::Legs);
        assert_eq!("barbell".parse::<Category>().unwrap(), Category::Barbell);
        for name in ["weighted bodyweight", "Weighted-Bodyweight", "weighted_bodyweight"] {
            assert_eq!(
                name.parse::<Category>().unwrap(),
                Category::WeightedBodyweight
            );
        }
        assert_eq!(Category::WeightedBodyweight.to_string(), "Weighted Bodyweight");

        let err = "neck".parse::<BodyPart>().unwrap_err().to_string();
        assert!(err.contains("Unknown body part 'neck'"));
        assert!(err.contains("Shoulders"));
        assert!("kettlebell".parse::<Category>().is_err());
    }
}
