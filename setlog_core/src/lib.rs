#![forbid(unsafe_code)]

//! Core domain model and session engine for setlog.
//!
//! This crate provides:
//! - Domain types (exercises, templates, working sets, snapshots)
//! - Exercise catalog and built-in templates
//! - Active workout engine (rest timer, set ledger, session controller)
//! - Persistence (workout store, live session file, CSV export)
//! - History aggregates and the plate calculator

pub mod types;
pub mod error;
pub mod catalog;
pub mod templates;
pub mod config;
pub mod logging;
pub mod timer;
pub mod ledger;
pub mod session;
pub mod gateway;
pub mod live;
pub mod history;
pub mod csv_export;
pub mod plates;

// Re-export commonly used types
pub use error::{Error, Result, ValidationIssue};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, ExerciseFilter, ExerciseLookup};
pub use templates::{builtin_templates, find_template, TemplateSource};
pub use config::Config;
pub use timer::{RestTimer, TimerEvent};
pub use ledger::{SetLedger, SetPatch};
pub use session::{CompletionOutcome, PendingFinish, SessionState, WorkoutSession};
pub use gateway::{JsonlWorkoutStore, WorkoutGateway};
pub use live::{ActiveSessionFile, LiveSessionStore};
pub use history::{summarize, WorkoutSummary};
pub use plates::{plates_per_side, PlateLoad};
