use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result as AnyResult};
use habit_core::{Habit, HabitError, HabitId, OwnerId, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::repository::HabitRepository;

/// Single JSON document holding every owner's habits. A missing file reads as empty.
#[derive(Debug)]
pub struct JsonFileRepository {
    path: PathBuf,
    write_guard: Mutex<()>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    habits: Vec<Habit>,
}

impl JsonFileRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_guard: Mutex::new(()),
        }
    }

    fn read_document(&self) -> AnyResult<StoreDocument> {
        if !self.path.exists() {
            return Ok(StoreDocument::default());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(StoreDocument::default());
        }
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }

    fn write_document(&self, document: &StoreDocument) -> AnyResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        let mut staged = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut staged, document)?;
        staged.write_all(b"\n")?;
        staged.as_file().sync_all()?;
        staged
            .persist(&self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn modify(&self, change: impl FnOnce(&mut Vec<Habit>)) -> AnyResult<()> {
        let _guard = self.write_guard.lock();
        let mut document = self.read_document()?;
        change(&mut document.habits);
        self.write_document(&document)
    }
}

impl HabitRepository for JsonFileRepository {
    fn load_habits_for_owner(&self, owner: &OwnerId) -> Result<Vec<Habit>> {
        let document = self.read_document().map_err(HabitError::persistence)?;
        Ok(document
            .habits
            .into_iter()
            .filter(|habit| &habit.owner_id == owner)
            .collect())
    }

    fn save(&self, habit: &Habit) -> Result<()> {
        self.modify(|habits| match habits.iter_mut().find(|h| h.id == habit.id) {
            Some(existing) => *existing = habit.clone(),
            None => habits.push(habit.clone()),
        })
        .map_err(HabitError::persistence)?;
        tracing::debug!(habit = %habit.id, path = %self.path.display(), "habit written");
        Ok(())
    }

    fn delete(&self, id: HabitId) -> Result<()> {
        self.modify(|habits| habits.retain(|habit| habit.id != id))
            .map_err(HabitError::persistence)
    }
}
