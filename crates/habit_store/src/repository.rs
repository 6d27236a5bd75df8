use std::collections::BTreeMap;

use habit_core::{Habit, HabitId, OwnerId, Result};
use parking_lot::RwLock;

/// Store of record for habits. Implementations report I/O failures as
/// [`habit_core::HabitError::Persistence`] and never retry.
pub trait HabitRepository: Send + Sync {
    fn load_habits_for_owner(&self, owner: &OwnerId) -> Result<Vec<Habit>>;

    /// Insert or replace the habit with the same id.
    fn save(&self, habit: &Habit) -> Result<()>;

    /// Remove a habit and its entries. Deleting an unknown id is not an error.
    fn delete(&self, id: HabitId) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    habits: RwLock<BTreeMap<HabitId, Habit>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_habits(habits: impl IntoIterator<Item = Habit>) -> Self {
        let repo = Self::new();
        {
            let mut stored = repo.habits.write();
            for habit in habits {
                stored.insert(habit.id, habit);
            }
        }
        repo
    }

    pub fn len(&self) -> usize {
        self.habits.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.read().is_empty()
    }

    pub fn get(&self, id: HabitId) -> Option<Habit> {
        self.habits.read().get(&id).cloned()
    }
}

impl HabitRepository for InMemoryRepository {
    fn load_habits_for_owner(&self, owner: &OwnerId) -> Result<Vec<Habit>> {
        let mut habits: Vec<Habit> = self
            .habits
            .read()
            .values()
            .filter(|habit| &habit.owner_id == owner)
            .cloned()
            .collect();
        habits.sort_by_key(|habit| habit.created_at);
        Ok(habits)
    }

    fn save(&self, habit: &Habit) -> Result<()> {
        self.habits.write().insert(habit.id, habit.clone());
        Ok(())
    }

    fn delete(&self, id: HabitId) -> Result<()> {
        self.habits.write().remove(&id);
        Ok(())
    }
}
