//! Per-exercise, per-set records of the live session.
//!
//! Exercises are held behind `Arc`. Every mutation swaps in a new
//! `ActiveExercise` and returns it, so a handle obtained earlier keeps
//! showing the values it was taken with. `Arc::ptr_eq` is enough to tell
//! whether an exercise changed.

use crate::catalog::ExerciseLookup;
use crate::types::{ActiveExercise, Entry, SetValues, Template, WorkingSet};
use std::sync::Arc;

/// Fields to merge into an existing set. `None` leaves a field unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetPatch {
    pub weight: Option<Entry>,
    pub reps: Option<Entry>,
    pub time: Option<String>,
    pub completed: Option<bool>,
}

impl SetPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weight(mut self, weight: impl Into<Entry>) -> Self {
        self.weight = Some(weight.into());
        self
    }

    pub fn reps(mut self, reps: impl Into<Entry>) -> Self {
        self.reps = Some(reps.into());
        self
    }

    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, set: &mut WorkingSet) {
        match &mut set.values {
            SetValues::Load { weight, reps } => {
                if let Some(w) = self.weight {
                    *weight = Some(w);
                }
                if let Some(r) = self.reps {
                    *reps = Some(r);
                }
                if self.time.is_some() {
                    tracing::warn!("Ignoring time for a weight/reps set");
                }
            }
            SetValues::Timed { time } => {
                if let Some(t) = self.time {
                    *time = t;
                }
                if self.weight.is_some() || self.reps.is_some() {
                    tracing::warn!("Ignoring weight/reps for a timed set");
                }
            }
        }
        if let Some(completed) = self.completed {
            set.completed = completed;
        }
    }
}

/// Ordered exercises of the live session and their sets
#[derive(Clone, Debug, Default)]
pub struct SetLedger {
    exercises: Vec<Arc<ActiveExercise>>,
}

impl SetLedger {
    /// One empty exercise per template entry, in template order
    pub fn from_template(template: &Template) -> Self {
        Self {
            exercises: template
                .exercises
                .iter()
                .map(|e| Arc::new(ActiveExercise::new(e.exercise_id.clone())))
                .collect(),
        }
    }

    pub fn from_exercises(exercises: Vec<ActiveExercise>) -> Self {
        Self {
            exercises: exercises.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn exercises(&self) -> &[Arc<ActiveExercise>] {
        &self.exercises
    }

    pub fn exercise(&self, exercise_index: usize) -> Option<&Arc<ActiveExercise>> {
        self.exercises.get(exercise_index)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Owned copy of every exercise, e.g. for checkpointing
    pub fn to_vec(&self) -> Vec<ActiveExercise> {
        self.exercises.iter().map(|e| ActiveExercise::clone(e)).collect()
    }

    /// Append a set shaped by the exercise's catalog category.
    ///
    /// Returns `None` when the exercise index is out of range or the
    /// catalog does not know the exercise.
    pub fn add_set(
        &mut self,
        exercise_index: usize,
        catalog: &dyn ExerciseLookup,
    ) -> Option<Arc<ActiveExercise>> {
        let exercise_id = &self.exercises.get(exercise_index)?.exercise_id;
        let Some(definition) = catalog.find(exercise_id) else {
            tracing::warn!("Exercise '{}' not in catalog, cannot add a set", exercise_id);
            return None;
        };
        let set = definition.category.new_set();
        self.replace(exercise_index, |exercise| exercise.sets.push(set))
    }

    /// Merge the supplied fields into one set.
    pub fn update_set(
        &mut self,
        exercise_index: usize,
        set_index: usize,
        patch: SetPatch,
    ) -> Option<Arc<ActiveExercise>> {
        self.set_at(exercise_index, set_index)?;
        self.replace(exercise_index, |exercise| {
            patch.apply(&mut exercise.sets[set_index]);
        })
    }

    /// Remove a set; later sets move up one number. Out of range is a no-op.
    pub fn delete_set(
        &mut self,
        exercise_index: usize,
        set_index: usize,
    ) -> Option<Arc<ActiveExercise>> {
        if self.set_at(exercise_index, set_index).is_none() {
            tracing::debug!(
                "Ignoring delete of missing set {}/{}",
                exercise_index,
                set_index
            );
            return None;
        }
        self.replace(exercise_index, |exercise| {
            exercise.sets.remove(set_index);
        })
    }

    /// Set the completed flag.
    ///
    /// The returned bool is true only for a `false -> true` transition.
    /// Re-setting the current value leaves the exercise untouched.
    pub fn set_completion(
        &mut self,
        exercise_index: usize,
        set_index: usize,
        completed: bool,
    ) -> Option<(Arc<ActiveExercise>, bool)> {
        let was = self.set_at(exercise_index, set_index)?.completed;
        if was == completed {
            return Some((Arc::clone(&self.exercises[exercise_index]), false));
        }
        let exercise = self.replace(exercise_index, |exercise| {
            exercise.sets[set_index].completed = completed;
        })?;
        Some((exercise, completed))
    }

    fn set_at(&self, exercise_index: usize, set_index: usize) -> Option<&WorkingSet> {
        self.exercises.get(exercise_index)?.sets.get(set_index)
    }

    fn replace<F>(&mut self, exercise_index: usize, f: F) -> Option<Arc<ActiveExercise>>
    where
        F: FnOnce(&mut ActiveExercise),
    {
        let slot = self.exercises.get_mut(exercise_index)?;
        let mut next = ActiveExercise::clone(slot);
        f(&mut next);
        *slot = Arc::new(next);
        tracing::debug!(
            "Exercise {} now has {} sets",
            slot.exercise_id,
            slot.sets.len()
        );
        Some(Arc::clone(slot))
    }
}
