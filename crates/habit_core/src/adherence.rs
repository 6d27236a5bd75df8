//! Streak and completion-rate calculators.
//!
//! All functions take `today` from the caller and never consult a clock. They are total:
//! an empty ledger or a window without scheduled days yields zero.
//!
//! Streaks count consecutive calendar days that carry a completed entry. Days the habit
//! was not scheduled on are not skipped over, so a Mon/Wed/Fri habit never builds a
//! streak longer than one.

use serde::{Deserialize, Serialize};

use crate::calendar::{days_between, CalendarDay};
use crate::habit::Habit;
use crate::ledger;
use crate::schedule;

/// Consecutive completed days ending at the most recent completion, provided that
/// completion is no older than yesterday.
pub fn current_streak(habit: &Habit, today: CalendarDay) -> u32 {
    let days = ledger::completed_days(habit);
    let Some(&most_recent) = days.last() else {
        return 0;
    };
    if days_between(today, most_recent) > 1 {
        return 0;
    }

    let mut streak = 1;
    let mut previous = most_recent;
    for &day in days.iter().rev().skip(1) {
        if days_between(previous, day) != 1 {
            break;
        }
        streak += 1;
        previous = day;
    }
    streak
}

pub fn longest_streak(habit: &Habit) -> u32 {
    let days = ledger::completed_days(habit);
    if days.is_empty() {
        return 0;
    }

    let mut run = 1;
    let mut best = 1;
    for pair in days.windows(2) {
        if days_between(pair[1], pair[0]) == 1 {
            run += 1;
            best = best.max(run);
        } else {
            run = 1;
        }
    }
    best
}

/// Percentage of scheduled days in the trailing window that were completed, rounded.
///
/// Completions on unscheduled days or outside the active range are not counted.
pub fn completion_rate(habit: &Habit, window_days: u32, today: CalendarDay) -> u8 {
    let Some((first, last)) = schedule::active_window(habit, window_days, today) else {
        return 0;
    };
    let scheduled = schedule::scheduled_days_in_window(habit, window_days, today);
    if scheduled == 0 {
        return 0;
    }

    let completed = ledger::completed_days(habit)
        .into_iter()
        .filter(|day| (first..=last).contains(day) && schedule::is_scheduled(habit, *day))
        .count();

    (100.0 * completed as f64 / scheduled as f64).round() as u8
}

/// Everything a streak badge needs for one habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdherenceSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub completion_rate: u8,
    pub total_completions: usize,
}

pub fn summarize(habit: &Habit, window_days: u32, today: CalendarDay) -> AdherenceSummary {
    AdherenceSummary {
        current_streak: current_streak(habit, today),
        longest_streak: longest_streak(habit),
        completion_rate: completion_rate(habit, window_days, today),
        total_completions: ledger::completion_count(habit),
    }
}
