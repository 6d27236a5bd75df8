use chrono::{DateTime, Utc};
use habit_core::adherence::{self, AdherenceSummary};
use habit_core::analytics::{self, ArchiveFilter, DashboardSummary};
use habit_core::{
    ledger, lifecycle, CalendarDay, Habit, HabitDraft, HabitError, HabitId, HabitPatch, OwnerId,
    Result,
};
use parking_lot::RwLock;
use tracing::instrument;

use crate::events::HabitEventSink;
use crate::repository::HabitRepository;

/// One owner's habits, mirrored in memory and kept in step with the repository.
///
/// Mutations validate locally, then persist, and only then replace the in-memory copy. If
/// any step fails the snapshot is left exactly as it was.
///
/// The snapshot only ever holds habits owned by `owner`, so an id belonging to someone else
/// resolves to `NotFound`.
pub struct HabitService {
    owner: OwnerId,
    repository: Box<dyn HabitRepository>,
    habits: RwLock<Vec<Habit>>,
    event_sink: Option<Box<dyn HabitEventSink>>,
    clock: fn() -> DateTime<Utc>,
}

pub struct HabitServiceBuilder {
    owner: OwnerId,
    repository: Box<dyn HabitRepository>,
    event_sink: Option<Box<dyn HabitEventSink>>,
    clock: fn() -> DateTime<Utc>,
}

impl HabitServiceBuilder {
    pub fn new(owner: OwnerId, repository: Box<dyn HabitRepository>) -> Self {
        Self {
            owner,
            repository,
            event_sink: None,
            clock: Utc::now,
        }
    }

    pub fn with_event_sink(mut self, sink: Box<dyn HabitEventSink>) -> Self {
        self.event_sink = Some(sink);
        self
    }

    /// Source of `created_at`/`updated_at` stamps.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Result<HabitService> {
        let service = HabitService {
            owner: self.owner,
            repository: self.repository,
            habits: RwLock::new(Vec::new()),
            event_sink: self.event_sink,
            clock: self.clock,
        };
        service.reload()?;
        Ok(service)
    }
}

impl HabitService {
    pub fn builder(owner: OwnerId, repository: Box<dyn HabitRepository>) -> HabitServiceBuilder {
        HabitServiceBuilder::new(owner, repository)
    }

    /// Replace the snapshot with the repository's current view of this owner's habits.
    pub fn reload(&self) -> Result<()> {
        let loaded = self.repository.load_habits_for_owner(&self.owner)?;
        let mut habits = Vec::with_capacity(loaded.len());
        for habit in loaded {
            if habit.owner_id != self.owner {
                tracing::warn!(
                    habit = %habit.id,
                    owner = %habit.owner_id,
                    "skipping habit owned by someone else"
                );
                continue;
            }
            if let Err(err) = lifecycle::validate(&habit) {
                tracing::warn!(habit = %habit.id, %err, "stored habit violates invariants");
            }
            habits.push(habit);
        }
        tracing::debug!(owner = %self.owner, count = habits.len(), "habit snapshot loaded");
        *self.habits.write() = habits;
        Ok(())
    }

    pub fn habits(&self) -> Vec<Habit> {
        self.habits.read().clone()
    }

    pub fn habit(&self, id: HabitId) -> Result<Habit> {
        self.habits
            .read()
            .iter()
            .find(|habit| habit.id == id)
            .cloned()
            .ok_or_else(|| HabitError::habit_not_found(id))
    }

    #[instrument(skip(self, draft), fields(owner = %self.owner))]
    pub fn create(&self, draft: HabitDraft) -> Result<Habit> {
        if draft.owner_id != self.owner {
            return Err(HabitError::Permission {
                caller: self.owner.clone(),
                owner: draft.owner_id,
            });
        }
        let habit = lifecycle::create_habit(draft, (self.clock)())?;
        let mut habits = self.habits.write();
        self.repository.save(&habit)?;
        habits.push(habit.clone());
        drop(habits);

        self.notify_saved(&habit);
        tracing::info!(habit = %habit.id, name = %habit.name, "habit created");
        Ok(habit)
    }

    #[instrument(skip(self, patch), fields(owner = %self.owner))]
    pub fn update(&self, id: HabitId, patch: HabitPatch) -> Result<Habit> {
        let now = (self.clock)();
        self.commit(id, |habit| lifecycle::apply_patch(habit, patch, now))
    }

    #[instrument(skip(self), fields(owner = %self.owner))]
    pub fn archive(&self, id: HabitId) -> Result<Habit> {
        let now = (self.clock)();
        self.commit(id, |habit| Ok(lifecycle::archive(habit, now)))
    }

    #[instrument(skip(self), fields(owner = %self.owner))]
    pub fn unarchive(&self, id: HabitId) -> Result<Habit> {
        let now = (self.clock)();
        self.commit(id, |habit| Ok(lifecycle::unarchive(habit, now)))
    }

    #[instrument(skip(self), fields(owner = %self.owner))]
    pub fn lock(&self, id: HabitId) -> Result<Habit> {
        let now = (self.clock)();
        self.commit(id, |habit| lifecycle::lock(habit, now))
    }

    #[instrument(skip(self), fields(owner = %self.owner))]
    pub fn delete(&self, id: HabitId) -> Result<()> {
        let mut habits = self.habits.write();
        lifecycle::ensure_deletable(Self::find(&habits, id)?)?;
        self.repository.delete(id)?;
        let removed = lifecycle::delete(&mut habits, id)?;
        drop(habits);

        if let Some(sink) = &self.event_sink {
            sink.habit_deleted(removed.id);
        }
        tracing::info!(habit = %id, entries = removed.entries.len(), "habit deleted");
        Ok(())
    }

    #[instrument(skip(self, note), fields(owner = %self.owner))]
    pub fn set_completion(
        &self,
        id: HabitId,
        day: CalendarDay,
        completed: bool,
        note: Option<String>,
    ) -> Result<Habit> {
        let now = (self.clock)();
        self.commit(id, |habit| {
            let mut updated = ledger::set_completion(habit, day, completed, note);
            updated.updated_at = now;
            Ok(updated)
        })
    }

    /// Flip the completion for `day` based on the snapshot's current state.
    ///
    /// Not idempotent: a retried call flips the day back. Prefer
    /// [`HabitService::set_completion`] wherever the intended state is known.
    pub fn toggle_completion(&self, id: HabitId, day: CalendarDay) -> Result<Habit> {
        let current = ledger::completed_on(&self.habit(id)?, day);
        self.set_completion(id, day, !current, None)
    }

    pub fn due_on(&self, day: CalendarDay) -> Vec<Habit> {
        let habits = self.habits.read();
        analytics::due_on(&habits, day)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn summary(
        &self,
        id: HabitId,
        window_days: u32,
        today: CalendarDay,
    ) -> Result<AdherenceSummary> {
        let habits = self.habits.read();
        let habit = Self::find(&habits, id)?;
        Ok(adherence::summarize(habit, window_days, today))
    }

    pub fn dashboard(
        &self,
        window_days: u32,
        today: CalendarDay,
        top_n: usize,
        filter: ArchiveFilter,
    ) -> DashboardSummary {
        let habits = self.habits.read();
        analytics::dashboard(&habits, window_days, today, top_n, filter)
    }
}

impl HabitService {
    /// Apply `change` to one habit and persist it before touching the snapshot.
    fn commit(
        &self,
        id: HabitId,
        change: impl FnOnce(&Habit) -> Result<Habit>,
    ) -> Result<Habit> {
        let mut habits = self.habits.write();
        let index = habits
            .iter()
            .position(|habit| habit.id == id)
            .ok_or_else(|| HabitError::habit_not_found(id))?;

        let updated = change(&habits[index])?;
        self.repository.save(&updated)?;
        habits[index] = updated.clone();
        drop(habits);

        self.notify_saved(&updated);
        tracing::debug!(habit = %id, "habit saved");
        Ok(updated)
    }

    fn find(habits: &[Habit], id: HabitId) -> Result<&Habit> {
        habits
            .iter()
            .find(|habit| habit.id == id)
            .ok_or_else(|| HabitError::habit_not_found(id))
    }

    fn notify_saved(&self, habit: &Habit) {
        if let Some(sink) = &self.event_sink {
            sink.habit_saved(habit);
        }
    }
}
