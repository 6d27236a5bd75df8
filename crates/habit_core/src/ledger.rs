use crate::calendar::CalendarDay;
use crate::habit::{EntryId, Habit, HabitEntry};

/// Record `completed` for `day`, creating the entry if needed.
///
/// Repeating the call with the same arguments yields the same ledger. A `None` note keeps
/// whatever note the day already carried.
pub fn set_completion(
    habit: &Habit,
    day: CalendarDay,
    completed: bool,
    note: Option<String>,
) -> Habit {
    let mut updated = habit.clone();
    match updated.entries.iter_mut().find(|entry| entry.date == day) {
        Some(entry) => {
            entry.completed = completed;
            if note.is_some() {
                entry.note = note;
            }
        }
        None => {
            let position = updated.entries.partition_point(|entry| entry.date < day);
            updated.entries.insert(
                position,
                HabitEntry {
                    id: EntryId::new(),
                    date: day,
                    completed,
                    note,
                },
            );
        }
    }
    updated
}

pub fn entry_on(habit: &Habit, day: CalendarDay) -> Option<&HabitEntry> {
    habit.entries.iter().find(|entry| entry.date == day)
}

pub fn completed_on(habit: &Habit, day: CalendarDay) -> bool {
    entry_on(habit, day).is_some_and(|entry| entry.completed)
}

/// Distinct days with a completed entry, ascending.
pub fn completed_days(habit: &Habit) -> Vec<CalendarDay> {
    let mut days: Vec<CalendarDay> = habit
        .entries
        .iter()
        .filter(|entry| entry.completed)
        .map(|entry| entry.date)
        .collect();
    days.sort_unstable();
    days.dedup();
    days
}

pub fn completion_count(habit: &Habit) -> usize {
    habit.entries.iter().filter(|entry| entry.completed).count()
}
