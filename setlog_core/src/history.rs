//! Aggregates over stored workouts for the history view.
//!
//! Only completed sets count toward any figure here.

use crate::catalog::ExerciseLookup;
use crate::types::{RecordedSet, WorkoutSnapshot};
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Strongest completed set of an exercise
#[derive(Clone, Debug, PartialEq)]
pub enum BestSet {
    Load { weight: f64, reps: u32 },
    Timed { time: String, seconds: u32 },
}

impl fmt::Display for BestSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BestSet::Load { weight, reps } => write!(f, "{} lb × {}", weight, reps),
            BestSet::Timed { time, .. } => f.write_str(time),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExerciseSummary {
    pub exercise_id: String,
    /// Catalog name, or the raw id when the catalog does not know it
    pub name: String,
    pub completed_sets: usize,
    pub best: Option<BestSet>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WorkoutSummary {
    pub id: Uuid,
    pub name: String,
    pub completed_at: DateTime<Utc>,
    /// Σ weight × reps
    pub total_volume: f64,
    pub total_reps: u64,
    pub max_weight: f64,
    pub exercises: Vec<ExerciseSummary>,
}

/// Summarize one stored workout
pub fn summarize(workout: &WorkoutSnapshot, catalog: &dyn ExerciseLookup) -> WorkoutSummary {
    let mut total_volume = 0.0;
    let mut total_reps: u64 = 0;
    let mut max_weight: f64 = 0.0;

    let exercises = workout
        .exercises
        .iter()
        .map(|exercise| {
            let completed: Vec<&RecordedSet> =
                exercise.sets.iter().filter(|s| s.completed).collect();

            for set in &completed {
                if let (Some(weight), Some(reps)) = (set.weight, set.reps) {
                    total_volume += weight * f64::from(reps);
                    total_reps += u64::from(reps);
                    max_weight = max_weight.max(weight);
                }
            }

            let name = catalog
                .find(&exercise.exercise_id)
                .map(|d| d.name.clone())
                .unwrap_or_else(|| exercise.exercise_id.clone());

            ExerciseSummary {
                exercise_id: exercise.exercise_id.clone(),
                name,
                completed_sets: completed.len(),
                best: best_set(&exercise.sets),
            }
        })
        .collect();

    WorkoutSummary {
        id: workout.id,
        name: workout.name.clone(),
        completed_at: workout.completed_at,
        total_volume,
        total_reps,
        max_weight,
        exercises,
    }
}

/// Best completed set: highest weight × reps, or the longest hold.
///
/// Ties keep the earlier set.
pub fn best_set(sets: &[RecordedSet]) -> Option<BestSet> {
    let mut best: Option<BestSet> = None;

    for set in sets.iter().filter(|s| s.completed) {
        let candidate = match (set.weight, set.reps, &set.time) {
            (Some(weight), Some(reps), _) => BestSet::Load { weight, reps },
            (_, _, Some(time)) => match parse_duration(time) {
                Some(seconds) => BestSet::Timed {
                    time: time.clone(),
                    seconds,
                },
                None => continue,
            },
            _ => continue,
        };

        let better = match (&best, &candidate) {
            (None, _) => true,
            (Some(BestSet::Load { weight: bw, reps: br }), BestSet::Load { weight, reps }) => {
                weight * f64::from(*reps) > bw * f64::from(*br)
            }
            (Some(BestSet::Timed { seconds: bs, .. }), BestSet::Timed { seconds, .. }) => {
                seconds > bs
            }
            // A load set always outranks a timed one
            (Some(BestSet::Timed { .. }), BestSet::Load { .. }) => true,
            (Some(BestSet::Load { .. }), BestSet::Timed { .. }) => false,
        };
        if better {
            best = Some(candidate);
        }
    }

    best
}

/// Parse `m:ss`, `h:mm:ss` or plain seconds into seconds
pub fn parse_duration(text: &str) -> Option<u32> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    let nums: Vec<u32> = parts
        .iter()
        .map(|p| p.trim().parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;

    match nums.as_slice() {
        [secs] => Some(*secs),
        [mins, secs] if *secs < 60 => Some(mins * 60 + secs),
        [hours, mins, secs] if *mins < 60 && *secs < 60 => {
            Some(hours * 3600 + mins * 60 + secs)
        }
        _ => None,
    }
}
