use chrono::Days;

use crate::calendar::{self, days_between, weekday_of, CalendarDay};
use crate::habit::Habit;

/// Whether `habit` should be shown as due on `day`. Archived habits are never due.
pub fn is_due(habit: &Habit, day: CalendarDay) -> bool {
    !habit.archived && is_scheduled(habit, day)
}

/// Weekday and active-range check without the archive short-circuit.
pub fn is_scheduled(habit: &Habit, day: CalendarDay) -> bool {
    is_active_on(habit, day) && habit.frequency.is_set(weekday_of(day))
}

pub fn is_active_on(habit: &Habit, day: CalendarDay) -> bool {
    if day < habit.start_date {
        return false;
    }
    match habit.end_date {
        Some(end) => day <= end,
        None => true,
    }
}

/// The part of the trailing window ending at `today` that lies inside the active range.
pub fn active_window(
    habit: &Habit,
    window_days: u32,
    today: CalendarDay,
) -> Option<(CalendarDay, CalendarDay)> {
    let (first, last) = calendar::window_bounds(today, window_days)?;
    let first = first.max(habit.start_date);
    let last = match habit.end_date {
        Some(end) => last.min(end),
        None => last,
    };
    (first <= last).then_some((first, last))
}

/// Counted by whole weeks, so the cost does not grow with the window.
pub fn scheduled_days_in_window(habit: &Habit, window_days: u32, today: CalendarDay) -> usize {
    let Some((first, last)) = active_window(habit, window_days, today) else {
        return 0;
    };
    let span = days_between(last, first).unsigned_abs() + 1;
    let per_week = habit.frequency.scheduled_days().len() as u64;
    let tail = (0..span % 7)
        .filter_map(|offset| last.checked_sub_days(Days::new(offset)))
        .filter(|day| habit.frequency.is_set(weekday_of(*day)))
        .count() as u64;
    (span / 7 * per_week + tail) as usize
}
