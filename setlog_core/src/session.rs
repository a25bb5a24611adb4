//! Active workout session controller.
//!
//! Owns the live ledger and the rest timer, and turns the ledger into a
//! stored workout exactly once.
//!
//! ## Lifecycle
//!
//! ```text
//! Loading ──template──▶ Active ──finish──▶ Finishing ──saved──▶ Completed
//!    │                  ▲  │                   │
//!    └─no template─▶ Aborted ◀─abandon─┘   invalid / store failed
//!                       │                      │
//!                       └──────────◀───────────┘ (back to Active)
//! ```
//!
//! Ledger edits and timer start/cancel never change the state.

use crate::catalog::ExerciseLookup;
use crate::error::ValidationIssue;
use crate::gateway::WorkoutGateway;
use crate::ledger::{SetLedger, SetPatch};
use crate::live::LiveSessionStore;
use crate::templates::TemplateSource;
use crate::timer::{RestTimer, TimerEvent};
use crate::types::*;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Lifecycle state of a workout session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Active,
    Finishing,
    Completed,
    Aborted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Loading => "loading",
            SessionState::Active => "active",
            SessionState::Finishing => "finishing",
            SessionState::Completed => "completed",
            SessionState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Result of changing a set's completed flag
#[derive(Clone, Debug)]
pub struct CompletionOutcome {
    pub exercise: Arc<ActiveExercise>,
    pub timer_started: bool,
}

/// A validated snapshot waiting for the store's answer
///
/// Must be handed back through [`WorkoutSession::complete_finish`].
#[derive(Debug)]
#[must_use]
pub struct PendingFinish {
    snapshot: WorkoutSnapshot,
}

impl PendingFinish {
    pub fn snapshot(&self) -> &WorkoutSnapshot {
        &self.snapshot
    }
}

/// The one live workout
pub struct WorkoutSession<'c> {
    template: Template,
    ledger: SetLedger,
    timer: RestTimer,
    state: SessionState,
    rest_secs: u32,
    started_at: DateTime<Utc>,
    catalog: &'c dyn ExerciseLookup,
}

impl<'c> WorkoutSession<'c> {
    /// Start a session from the staged template.
    ///
    /// Every template entry becomes an exercise with no sets. Fails with
    /// [`Error::MissingSession`] when nothing is staged; that session is
    /// aborted and cannot be retried.
    pub fn start(
        source: &dyn TemplateSource,
        catalog: &'c dyn ExerciseLookup,
        rest_secs: u32,
    ) -> Result<Self> {
        tracing::debug!("Session loading");
        let Some(template) = source.load_active_template() else {
            tracing::warn!("No staged template, session aborted");
            return Err(Error::MissingSession);
        };

        let ledger = SetLedger::from_template(&template);
        let session = Self::activate(template, ledger, Utc::now(), catalog, rest_secs);
        tracing::info!("Session '{}' started", session.template.name);
        Ok(session)
    }

    /// Continue a checkpointed session
    pub fn resume(checkpoint: LiveSession, catalog: &'c dyn ExerciseLookup, rest_secs: u32) -> Self {
        let ledger = if checkpoint.exercises.is_empty() {
            SetLedger::from_template(&checkpoint.template)
        } else {
            SetLedger::from_exercises(checkpoint.exercises)
        };
        let session = Self::activate(
            checkpoint.template,
            ledger,
            checkpoint.started_at,
            catalog,
            rest_secs,
        );
        tracing::info!("Session '{}' resumed", session.template.name);
        session
    }

    fn activate(
        template: Template,
        ledger: SetLedger,
        started_at: DateTime<Utc>,
        catalog: &'c dyn ExerciseLookup,
        rest_secs: u32,
    ) -> Self {
        for exercise in ledger.exercises() {
            if catalog.find(&exercise.exercise_id).is_none() {
                tracing::warn!(
                    "Exercise '{}' in '{}' is not in the catalog, it will be hidden",
                    exercise.exercise_id,
                    template.name
                );
            }
        }
        Self {
            template,
            ledger,
            timer: RestTimer::new(),
            state: SessionState::Active,
            rest_secs,
            started_at,
            catalog,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn name(&self) -> &str {
        &self.template.name
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn ledger(&self) -> &SetLedger {
        &self.ledger
    }

    pub fn timer(&self) -> &RestTimer {
        &self.timer
    }

    pub fn rest_secs(&self) -> u32 {
        self.rest_secs
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Catalog entry for an exercise, `None` if the index or id is unknown
    pub fn definition(&self, exercise_index: usize) -> Option<&ExerciseDefinition> {
        let exercise = self.ledger.exercise(exercise_index)?;
        self.catalog.find(&exercise.exercise_id)
    }

    /// Planned work for an exercise, e.g. `3 × 8 @ 95` or `3 × 1:00`
    ///
    /// Template targets win over catalog defaults.
    pub fn target(&self, exercise_index: usize) -> Option<String> {
        let planned = self.template.exercises.get(exercise_index)?;
        let definition = self.definition(exercise_index)?;

        if definition.category.tracks_time() {
            let duration = planned
                .duration
                .clone()
                .or_else(|| definition.default_duration.clone())?;
            return Some(format!("{} × {}", planned.sets, duration));
        }

        let reps = planned.reps.or(definition.default_reps)?;
        match planned.weight.or(definition.default_weight) {
            Some(weight) => Some(format!("{} × {} @ {}", planned.sets, reps, weight)),
            None => Some(format!("{} × {}", planned.sets, reps)),
        }
    }

    fn ensure_editable(&self) -> Result<()> {
        match self.state {
            SessionState::Active | SessionState::Finishing => Ok(()),
            other => Err(Error::SessionClosed(other)),
        }
    }

    pub fn add_set(&mut self, exercise_index: usize) -> Result<Option<Arc<ActiveExercise>>> {
        self.ensure_editable()?;
        Ok(self.ledger.add_set(exercise_index, self.catalog))
    }

    /// Merge fields into a set. A `completed` field goes through
    /// [`Self::set_completion`] so it can start the rest timer.
    pub fn update_set(
        &mut self,
        exercise_index: usize,
        set_index: usize,
        mut patch: SetPatch,
    ) -> Result<Option<Arc<ActiveExercise>>> {
        self.ensure_editable()?;
        let completed = patch.completed.take();
        let updated = self.ledger.update_set(exercise_index, set_index, patch);
        match (updated, completed) {
            (Some(_), Some(completed)) => Ok(self
                .set_completion(exercise_index, set_index, completed)?
                .map(|outcome| outcome.exercise)),
            (updated, _) => Ok(updated),
        }
    }

    pub fn delete_set(
        &mut self,
        exercise_index: usize,
        set_index: usize,
    ) -> Result<Option<Arc<ActiveExercise>>> {
        self.ensure_editable()?;
        Ok(self.ledger.delete_set(exercise_index, set_index))
    }

    /// Mark a set done or not done.
    ///
    /// Only a `false -> true` change starts the rest timer.
    pub fn set_completion(
        &mut self,
        exercise_index: usize,
        set_index: usize,
        completed: bool,
    ) -> Result<Option<CompletionOutcome>> {
        self.ensure_editable()?;
        let Some((exercise, rose)) =
            self.ledger.set_completion(exercise_index, set_index, completed)
        else {
            return Ok(None);
        };
        if rose {
            self.timer.start(self.rest_secs);
        }
        Ok(Some(CompletionOutcome {
            exercise,
            timer_started: rose,
        }))
    }

    /// Start a rest countdown by hand
    pub fn start_rest(&mut self, duration_secs: u32) -> Result<()> {
        self.ensure_editable()?;
        self.timer.start(duration_secs);
        Ok(())
    }

    pub fn skip_rest(&mut self) {
        self.timer.cancel();
    }

    /// Forward the host's 1 Hz tick to the rest timer
    pub fn tick(&mut self) -> Option<TimerEvent> {
        self.timer.tick()
    }

    /// Current ledger, ready to hand to a [`LiveSessionStore`]
    pub fn checkpoint(&self) -> LiveSession {
        LiveSession {
            template: self.template.clone(),
            exercises: self.ledger.to_vec(),
            started_at: self.started_at,
        }
    }

    /// Validate the ledger and build the snapshot to store.
    ///
    /// On success the session is `Finishing` until the pending finish is
    /// handed back. On invalid entries it stays `Active` and no identity is
    /// generated. Only one finish may be pending at a time.
    pub fn begin_finish(&mut self, now: DateTime<Utc>) -> Result<PendingFinish> {
        match self.state {
            SessionState::Active => {}
            SessionState::Finishing => return Err(Error::FinishInProgress),
            other => return Err(Error::SessionClosed(other)),
        }
        self.state = SessionState::Finishing;

        let exercises = match self.record() {
            Ok(exercises) => exercises,
            Err(issues) => {
                self.state = SessionState::Active;
                tracing::info!("Finish rejected: {} invalid entries", issues.len());
                return Err(Error::Validation(issues));
            }
        };

        let snapshot = WorkoutSnapshot {
            id: Uuid::new_v4(),
            name: self.template.name.clone(),
            exercises,
            completed_at: now,
        };
        tracing::debug!("Finishing '{}' as {}", snapshot.name, snapshot.id);
        Ok(PendingFinish { snapshot })
    }

    /// Apply the store's answer to a pending finish.
    ///
    /// On success the live session is cleared and the stored snapshot is
    /// returned for handoff. On failure the session goes back to `Active`
    /// with the live session untouched, so finishing again loses nothing.
    pub fn complete_finish(
        &mut self,
        pending: PendingFinish,
        saved: Result<Uuid>,
        live: &mut dyn LiveSessionStore,
    ) -> Result<WorkoutSnapshot> {
        let mut snapshot = pending.snapshot;
        match saved {
            Ok(id) => {
                if id != snapshot.id {
                    tracing::debug!("Store assigned {} to workout {}", id, snapshot.id);
                }
                snapshot.id = id;
                self.state = SessionState::Completed;
                self.timer.cancel();
                if let Err(e) = live.clear() {
                    tracing::error!("Workout {} saved but live session not cleared: {}", id, e);
                }
                tracing::info!("Session '{}' completed as {}", snapshot.name, id);
                Ok(snapshot)
            }
            Err(e) => {
                self.state = SessionState::Active;
                tracing::warn!("Saving workout {} failed: {}", snapshot.id, e);
                match e {
                    Error::Storage(msg) => Err(Error::Storage(msg)),
                    other => Err(Error::Storage(other.to_string())),
                }
            }
        }
    }

    /// Finish now: validate, store once, clear the live session
    pub fn finish(
        &mut self,
        gateway: &mut dyn WorkoutGateway,
        live: &mut dyn LiveSessionStore,
    ) -> Result<WorkoutSnapshot> {
        self.finish_at(Utc::now(), gateway, live)
    }

    pub fn finish_at(
        &mut self,
        now: DateTime<Utc>,
        gateway: &mut dyn WorkoutGateway,
        live: &mut dyn LiveSessionStore,
    ) -> Result<WorkoutSnapshot> {
        let pending = self.begin_finish(now)?;
        let saved = gateway.save(pending.snapshot());
        self.complete_finish(pending, saved, live)
    }

    /// Give up on the session and drop the live checkpoint
    pub fn abandon(&mut self, live: &mut dyn LiveSessionStore) -> Result<()> {
        match self.state {
            SessionState::Active => {}
            SessionState::Finishing => return Err(Error::FinishInProgress),
            other => return Err(Error::SessionClosed(other)),
        }
        self.timer.cancel();
        self.state = SessionState::Aborted;
        live.clear()?;
        tracing::info!("Session '{}' abandoned", self.template.name);
        Ok(())
    }

    /// Check every exercise and set, collecting all problems at once
    fn record(&self) -> std::result::Result<Vec<RecordedExercise>, Vec<ValidationIssue>> {
        let mut issues = Vec::new();
        let mut recorded = Vec::with_capacity(self.ledger.len());

        if self.ledger.is_empty() {
            issues.push(ValidationIssue {
                exercise: None,
                set: None,
                message: "workout has no exercises".into(),
            });
        }

        for (i, exercise) in self.ledger.exercises().iter().enumerate() {
            let Some(definition) = self.catalog.find(&exercise.exercise_id) else {
                issues.push(ValidationIssue {
                    exercise: Some(i + 1),
                    set: None,
                    message: format!("unknown exercise '{}'", exercise.exercise_id),
                });
                continue;
            };

            let mut sets = Vec::with_capacity(exercise.sets.len());
            for (j, set) in exercise.sets.iter().enumerate() {
                match record_set(set, definition.category.tracks_time()) {
                    Ok(recorded_set) => sets.push(recorded_set),
                    Err(problems) => {
                        issues.extend(problems.into_iter().map(|message| ValidationIssue {
                            exercise: Some(i + 1),
                            set: Some(j + 1),
                            message,
                        }))
                    }
                }
            }
            recorded.push(RecordedExercise {
                exercise_id: exercise.exercise_id.clone(),
                sets,
            });
        }

        if issues.is_empty() {
            Ok(recorded)
        } else {
            Err(issues)
        }
    }
}

fn record_set(set: &WorkingSet, tracks_time: bool) -> std::result::Result<RecordedSet, Vec<String>> {
    let mut problems = Vec::new();
    let mut recorded = RecordedSet {
        weight: None,
        reps: None,
        time: None,
        completed: set.completed,
    };

    match &set.values {
        SetValues::Load { weight, reps } => {
            if tracks_time {
                problems.push("exercise records time, not weight/reps".to_string());
            }
            if let Some(entry) = weight {
                match entry.as_number() {
                    Ok(Some(w)) if w < 0.0 => problems.push("weight cannot be negative".into()),
                    Ok(w) => recorded.weight = w,
                    Err(text) => problems.push(format!("weight \"{}\" is not a number", text)),
                }
            }
            if let Some(entry) = reps {
                match entry.as_number() {
                    Ok(Some(r)) if r < 0.0 || r.fract() != 0.0 || r > f64::from(u32::MAX) => {
                        problems.push(format!("reps {} is not a whole number", r))
                    }
                    Ok(r) => recorded.reps = r.map(|r| r as u32),
                    Err(text) => problems.push(format!("reps \"{}\" is not a number", text)),
                }
            }
        }
        SetValues::Timed { time } => {
            if !tracks_time {
                problems.push("exercise records weight/reps, not time".to_string());
            }
            let time = time.trim();
            if !time.is_empty() {
                recorded.time = Some(time.to_string());
            }
        }
    }

    if problems.is_empty() {
        Ok(recorded)
    } else {
        Err(problems)
    }
}
