//! Persistence for finished workouts.
//!
//! Workouts are appended to a JSONL (JSON Lines) file with file locking
//! to ensure safe concurrent access.

use crate::{Error, Result, WorkoutSnapshot};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Store of finished workouts
///
/// Once a snapshot is accepted the store owns it. `save` returns the
/// identity the workout was stored under.
pub trait WorkoutGateway {
    fn save(&mut self, snapshot: &WorkoutSnapshot) -> Result<Uuid>;
    /// All stored workouts, newest first
    fn list(&self) -> Result<Vec<WorkoutSnapshot>>;
    fn delete(&mut self, id: Uuid) -> Result<()>;
}

/// JSONL-based workout store with file locking
pub struct JsonlWorkoutStore {
    path: PathBuf,
}

impl JsonlWorkoutStore {
    /// Create a new store for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Writer lock shared by append and delete.
    ///
    /// Delete replaces the store file by rename, so a lock on the store
    /// file itself would not stop an appender that already opened the old
    /// one. Every writer takes this lock first.
    fn lock_writers(&self) -> Result<File> {
        self.ensure_parent_dir()?;
        let mut lock_path = self.path.clone().into_os_string();
        lock_path.push(".lock");
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .open(PathBuf::from(lock_path))?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    fn append(&self, snapshot: &WorkoutSnapshot) -> Result<()> {
        let writers = self.lock_writers()?;

        // Open file for appending
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        // Write workout as JSON line
        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(snapshot)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);
        file.sync_all()?;

        file.unlock()?;
        writers.unlock()?;
        Ok(())
    }

    /// Rewrite the file without `id`, atomically.
    ///
    /// Lines are copied byte for byte; only lines whose `id` is `id` are
    /// dropped. Lines that do not parse are kept for manual recovery.
    fn remove(&self, id: Uuid) -> Result<()> {
        let writers = self.lock_writers()?;

        let mut raw = Vec::new();
        match File::open(&self.path) {
            Ok(mut file) => {
                file.read_to_end(&mut raw)?;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut kept: Vec<&[u8]> = Vec::new();
        let mut found = false;
        for line in raw.split(|b| *b == b'\n') {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            if line_id(line) == Some(id) {
                found = true;
            } else {
                kept.push(line);
            }
        }
        if !found {
            return Err(Error::NotFound(id));
        }

        // Create unique temp file in the same directory for atomic rename
        let temp = NamedTempFile::new_in(self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "workout path missing parent")
        })?)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            for line in &kept {
                writer.write_all(line)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        writers.unlock()?;
        Ok(())
    }
}

/// Identity of one stored line, if it has a readable `id`
fn line_id(line: &[u8]) -> Option<Uuid> {
    #[derive(serde::Deserialize)]
    struct IdOnly {
        id: Uuid,
    }
    serde_json::from_slice::<IdOnly>(line).ok().map(|l| l.id)
}

impl WorkoutGateway for JsonlWorkoutStore {
    fn save(&mut self, snapshot: &WorkoutSnapshot) -> Result<Uuid> {
        self.append(snapshot)
            .map_err(|e| Error::Storage(format!("could not write {:?}: {}", self.path, e)))?;
        tracing::debug!("Appended workout {} to {:?}", snapshot.id, self.path);
        Ok(snapshot.id)
    }

    fn list(&self) -> Result<Vec<WorkoutSnapshot>> {
        let mut workouts = read_workouts(&self.path)?;
        workouts.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(workouts)
    }

    fn delete(&mut self, id: Uuid) -> Result<()> {
        match self.remove(id) {
            Ok(()) => {
                tracing::info!("Deleted workout {}", id);
                Ok(())
            }
            Err(Error::NotFound(id)) => Err(Error::NotFound(id)),
            Err(e) => Err(Error::Storage(format!(
                "could not delete {} from {:?}: {}",
                id, self.path, e
            ))),
        }
    }
}

/// Read all workouts from a JSONL file, in file order
pub fn read_workouts(path: &Path) -> Result<Vec<WorkoutSnapshot>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut workouts = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<WorkoutSnapshot>(&line) {
            Ok(workout) => workouts.push(workout),
            Err(e) => {
                tracing::warn!("Failed to parse workout at line {}: {}", line_num + 1, e);
                // Continue reading, don't fail completely
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} workouts from {:?}", workouts.len(), path);
    Ok(workouts)
}
