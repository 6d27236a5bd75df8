use habit_core::{Habit, HabitId};

/// Collaborators that hold references to habits (goals, notes, tasks) implement this to
/// drop dangling ids. Called only after the store has confirmed the change.
pub trait HabitEventSink: Send + Sync {
    fn habit_deleted(&self, id: HabitId);

    fn habit_saved(&self, _habit: &Habit) {}
}
