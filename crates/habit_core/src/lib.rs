pub mod adherence;
pub mod analytics;
pub mod calendar;
pub mod error;
pub mod habit;
pub mod ledger;
pub mod lifecycle;
pub mod schedule;

#[cfg(test)]
mod testing;

pub use crate::calendar::CalendarDay;
pub use crate::error::{HabitError, Result, ValidationFailure};
pub use crate::habit::{
    EntryId, Habit, HabitDraft, HabitEntry, HabitId, HabitPatch, OwnerId, WeekdayMask,
};
