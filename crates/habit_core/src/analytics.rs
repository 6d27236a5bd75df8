//! Cross-habit aggregates for dashboards and leaderboards.
//!
//! Archived habits are left out unless the caller passes [`ArchiveFilter::IncludeArchived`].

use serde::{Deserialize, Serialize};

use crate::adherence;
use crate::calendar::CalendarDay;
use crate::habit::{Habit, HabitId};
use crate::ledger;
use crate::schedule;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveFilter {
    #[default]
    ActiveOnly,
    IncludeArchived,
}

impl ArchiveFilter {
    fn admits(self, habit: &Habit) -> bool {
        match self {
            ArchiveFilter::ActiveOnly => !habit.archived,
            ArchiveFilter::IncludeArchived => true,
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedHabit {
    pub habit_id: HabitId,
    pub name: String,
    pub score: u32,
}

pub fn select(habits: &[Habit], filter: ArchiveFilter) -> impl Iterator<Item = &Habit> {
    habits.iter().filter(move |habit| filter.admits(habit))
}

/// Habits due on `day`, in collection order.
pub fn due_on(habits: &[Habit], day: CalendarDay) -> Vec<&Habit> {
    habits
        .iter()
        .filter(|habit| schedule::is_due(habit, day))
        .collect()
}

pub fn top_by_streak(
    habits: &[Habit],
    today: CalendarDay,
    n: usize,
    filter: ArchiveFilter,
) -> Vec<RankedHabit> {
    rank(habits, n, filter, |habit| {
        adherence::current_streak(habit, today)
    })
}

pub fn top_by_completion_rate(
    habits: &[Habit],
    window_days: u32,
    today: CalendarDay,
    n: usize,
    filter: ArchiveFilter,
) -> Vec<RankedHabit> {
    rank(habits, n, filter, |habit| {
        u32::from(adherence::completion_rate(habit, window_days, today))
    })
}

fn rank(
    habits: &[Habit],
    n: usize,
    filter: ArchiveFilter,
    score: impl Fn(&Habit) -> u32,
) -> Vec<RankedHabit> {
    let mut rows: Vec<RankedHabit> = select(habits, filter)
        .map(|habit| RankedHabit {
            habit_id: habit.id,
            name: habit.name.clone(),
            score: score(habit),
        })
        .collect();
    // `sort_by` is stable, so ties keep collection order.
    rows.sort_by(|a, b| b.score.cmp(&a.score));
    rows.truncate(n);
    rows
}

pub fn average_completion_rate(
    habits: &[Habit],
    window_days: u32,
    today: CalendarDay,
    filter: ArchiveFilter,
) -> f64 {
    let rates: Vec<f64> = select(habits, filter)
        .map(|habit| f64::from(adherence::completion_rate(habit, window_days, today)))
        .collect();
    if rates.is_empty() {
        return 0.0;
    }
    rates.iter().sum::<f64>() / rates.len() as f64
}

pub fn total_completions(habits: &[Habit], filter: ArchiveFilter) -> usize {
    select(habits, filter).map(ledger::completion_count).sum()
}

/// Best *current* streak in the collection.
pub fn longest_streak_across_all(
    habits: &[Habit],
    today: CalendarDay,
    filter: ArchiveFilter,
) -> u32 {
    select(habits, filter)
        .map(|habit| adherence::current_streak(habit, today))
        .max()
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub today: CalendarDay,
    pub window_days: u32,
    pub habit_count: usize,
    pub due_today: Vec<HabitId>,
    pub top_by_streak: Vec<RankedHabit>,
    pub top_by_completion_rate: Vec<RankedHabit>,
    pub average_completion_rate: f64,
    pub total_completions: usize,
    pub best_current_streak: u32,
}

pub fn dashboard(
    habits: &[Habit],
    window_days: u32,
    today: CalendarDay,
    n: usize,
    filter: ArchiveFilter,
) -> DashboardSummary {
    DashboardSummary {
        today,
        window_days,
        habit_count: select(habits, filter).count(),
        due_today: due_on(habits, today).iter().map(|habit| habit.id).collect(),
        top_by_streak: top_by_streak(habits, today, n, filter),
        top_by_completion_rate: top_by_completion_rate(habits, window_days, today, n, filter),
        average_completion_rate: average_completion_rate(habits, window_days, today, filter),
        total_completions: total_completions(habits, filter),
        best_current_streak: longest_streak_across_all(habits, today, filter),
    }
}
