//! Live session persistence with file locking.
//!
//! The live session file holds the staged template and, once the session
//! is running, a checkpoint of the ledger. It is written atomically and
//! removed only when the workout is stored or abandoned.

use crate::templates::TemplateSource;
use crate::types::{LiveSession, Template};
use crate::{Error, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Transient storage for the one live session
pub trait LiveSessionStore {
    fn checkpoint(&mut self, session: &LiveSession) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// Live session stored as a single JSON file
pub struct ActiveSessionFile {
    path: PathBuf,
}

impl ActiveSessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the live session with shared locking
    ///
    /// Returns `None` if the file doesn't exist.
    /// If the file is corrupted, logs a warning and returns `None`.
    pub fn load(&self) -> Option<LiveSession> {
        if !self.path.exists() {
            tracing::debug!("No live session at {:?}", self.path);
            return None;
        }

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open live session {:?}: {}", self.path, e);
                return None;
            }
        };

        // Acquire shared lock for reading
        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock live session {:?}: {}", self.path, e);
            return None;
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read = reader.read_to_string(&mut contents);
        let _ = file.unlock();
        if let Err(e) = read {
            tracing::warn!("Failed to read live session {:?}: {}", self.path, e);
            return None;
        }

        match serde_json::from_str::<LiveSession>(&contents) {
            Ok(session) => {
                tracing::debug!("Loaded live session from {:?}", self.path);
                Some(session)
            }
            Err(e) => {
                tracing::warn!("Failed to parse live session {:?}: {}", self.path, e);
                None
            }
        }
    }

    /// Stage a template as the next session to start
    pub fn stage(&mut self, template: &Template) -> Result<()> {
        let session = LiveSession::staged(template.clone(), chrono::Utc::now());
        self.write(&session)?;
        tracing::info!("Staged template '{}'", template.name);
        Ok(())
    }

    /// Atomically writes the session by:
    /// 1. Writing to a temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn write(&self, session: &LiveSession) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Create unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "live session path missing parent")
        })?)?;

        // Acquire exclusive lock on the temp file to serialize concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(session)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        // Atomically replace old session file
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved live session to {:?}", self.path);
        Ok(())
    }
}

impl LiveSessionStore for ActiveSessionFile {
    fn checkpoint(&mut self, session: &LiveSession) -> Result<()> {
        self.write(session)
    }

    fn clear(&mut self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("Cleared live session {:?}", self.path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl TemplateSource for ActiveSessionFile {
    fn load_active_template(&self) -> Option<Template> {
        self.load().map(|session| session.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::builtin_templates;
    use crate::types::{ActiveExercise, Category};

    #[test]
    fn test_stage_and_load_template() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut file = ActiveSessionFile::new(temp_dir.path().join("session/active.json"));

        let template = builtin_templates().remove(1);
        file.stage(&template).unwrap();

        assert_eq!(file.load_active_template(), Some(template));
        assert!(file.load().unwrap().exercises.is_empty());
    }

    #[test]
    fn test_checkpoint_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut file = ActiveSessionFile::new(temp_dir.path().join("active.json"));

        let mut session = LiveSession::staged(builtin_templates().remove(0), chrono::Utc::now());
        let mut plank = ActiveExercise::new("3");
        plank.sets.push(Category::Duration.new_set());
        session.exercises = vec![ActiveExercise::new("1"), ActiveExercise::new("2"), plank];
        file.checkpoint(&session).unwrap();

        let loaded = file.load().unwrap();
        assert_eq!(loaded.exercises, session.exercises);
        assert_eq!(loaded.started_at, session.started_at);
    }

    #[test]
    fn test_missing_file_is_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = ActiveSessionFile::new(temp_dir.path().join("nonexistent.json"));
        assert!(file.load().is_none());
        assert!(file.load_active_template().is_none());
    }

    #[test]
    fn test_corrupted_file_is_none() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("active.json");
        std::fs::write(&path, "{ invalid json }").unwrap();

        let file = ActiveSessionFile::new(&path);
        assert!(file.load_active_template().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut file = ActiveSessionFile::new(temp_dir.path().join("active.json"));
        file.stage(&builtin_templates().remove(0)).unwrap();
        assert!(file.exists());

        file.clear().unwrap();
        assert!(!file.exists());
        file.clear().unwrap();
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut file = ActiveSessionFile::new(temp_dir.path().join("active.json"));
        file.stage(&builtin_templates().remove(0)).unwrap();
        file.stage(&builtin_templates().remove(2)).unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != "active.json")
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only active.json, found extras: {:?}",
            extras
        );
    }
}
