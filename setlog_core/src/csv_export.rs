//! CSV export of stored workouts.
//!
//! One row per recorded set. The file is replaced, not appended to, and is
//! fsynced before the export reports success.

use crate::{Result, WorkoutSnapshot};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    workout_id: String,
    workout_name: &'a str,
    completed_at: String,
    exercise_id: &'a str,
    set_number: usize,
    weight: Option<f64>,
    reps: Option<u32>,
    time: Option<&'a str>,
    completed: bool,
}

fn rows(workout: &WorkoutSnapshot) -> impl Iterator<Item = CsvRow<'_>> {
    workout.exercises.iter().flat_map(move |exercise| {
        exercise.sets.iter().enumerate().map(move |(i, set)| CsvRow {
            workout_id: workout.id.to_string(),
            workout_name: &workout.name,
            completed_at: workout.completed_at.to_rfc3339(),
            exercise_id: &exercise.exercise_id,
            set_number: i + 1,
            weight: set.weight,
            reps: set.reps,
            time: set.time.as_deref(),
            completed: set.completed,
        })
    })
}

/// Write every set of `workouts` to `csv_path`
///
/// Returns the number of rows written.
pub fn export_workouts(workouts: &[WorkoutSnapshot], csv_path: &Path) -> Result<usize> {
    // Ensure parent directory exists
    if let Some(parent) = csv_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = File::create(csv_path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    let mut count = 0;
    for workout in workouts {
        for row in rows(workout) {
            writer.serialize(row)?;
            count += 1;
        }
    }

    // Flush and sync to disk
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!(
        "Exported {} sets from {} workouts to {:?}",
        count,
        workouts.len(),
        csv_path
    );
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RecordedExercise, RecordedSet};
    use chrono::Utc;
    use uuid::Uuid;

    fn create_test_workout(name: &str) -> WorkoutSnapshot {
        WorkoutSnapshot {
            id: Uuid::new_v4(),
            name: name.into(),
            exercises: vec![
                RecordedExercise {
                    exercise_id: "1".into(),
                    sets: vec![
                        RecordedSet {
                            weight: Some(95.0),
                            reps: Some(8),
                            time: None,
                            completed: true,
                        },
                        RecordedSet {
                            weight: Some(95.0),
                            reps: None,
                            time: None,
                            completed: false,
                        },
                    ],
                },
                RecordedExercise {
                    exercise_id: "3".into(),
                    sets: vec![RecordedSet {
                        weight: None,
                        reps: None,
                        time: Some("1:00".into()),
                        completed: true,
                    }],
                },
            ],
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_export_one_row_per_set() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("out/workouts.csv");

        let workouts = vec![create_test_workout("Day 1"), create_test_workout("Day 1")];
        let count = export_workouts(&workouts, &csv_path).unwrap();
        assert_eq!(count, 6);

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec![
                "workout_id",
                "workout_name",
                "completed_at",
                "exercise_id",
                "set_number",
                "weight",
                "reps",
                "time",
                "completed"
            ]
        );

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 6);
        assert_eq!(&records[1][4], "2");
        assert_eq!(&records[1][6], "");
        assert_eq!(&records[1][8], "false");
        assert_eq!(&records[2][3], "3");
        assert_eq!(&records[2][7], "1:00");
    }

    #[test]
    fn test_export_replaces_existing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("workouts.csv");

        export_workouts(&[create_test_workout("a")], &csv_path).unwrap();
        export_workouts(&[create_test_workout("b")], &csv_path).unwrap();

        let reader = csv::Reader::from_path(&csv_path).unwrap();
        assert_eq!(reader.into_records().count(), 3);
    }

    #[test]
    fn test_export_empty_history() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("workouts.csv");

        assert_eq!(export_workouts(&[], &csv_path).unwrap(), 0);
        assert!(csv_path.exists());
    }
}
