use std::fmt::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use habit_core::analytics::{self, ArchiveFilter, RankedHabit};
use habit_core::{adherence, calendar, ledger, CalendarDay, Habit, OwnerId};
use habit_store::{HabitService, JsonFileRepository};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub(crate) store_path: PathBuf,
    pub(crate) owner: OwnerId,
    pub(crate) rate_window_days: u32,
    pub(crate) leaderboard_size: usize,
    pub(crate) timezone: Option<Tz>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup("HABIT_STORE_PATH") {
            if !path.trim().is_empty() {
                config.store_path = PathBuf::from(path);
            }
        }
        if let Some(owner) = lookup("HABIT_OWNER") {
            if !owner.trim().is_empty() {
                config.owner = OwnerId::new(owner.trim());
            }
        }
        if let Some(window) = lookup("HABIT_RATE_WINDOW_DAYS") {
            match window.trim().parse::<u32>() {
                Ok(value) if value > 0 => config.rate_window_days = value,
                _ => warn!(value = %window, "ignoring invalid HABIT_RATE_WINDOW_DAYS"),
            }
        }
        if let Some(size) = lookup("HABIT_LEADERBOARD_SIZE") {
            match size.trim().parse::<usize>() {
                Ok(value) if value > 0 => config.leaderboard_size = value,
                _ => warn!(value = %size, "ignoring invalid HABIT_LEADERBOARD_SIZE"),
            }
        }
        if let Some(zone) = lookup("HABIT_TIMEZONE") {
            match zone.trim().parse::<Tz>() {
                Ok(tz) => config.timezone = Some(tz),
                Err(err) => warn!(value = %zone, %err, "ignoring unknown HABIT_TIMEZONE"),
            }
        }
        config
    }

    /// Calendar day of `instant` in the configured zone, or the system zone if unset.
    pub fn today(&self, instant: DateTime<Utc>) -> CalendarDay {
        match &self.timezone {
            Some(tz) => calendar::normalize(&instant, tz),
            None => calendar::normalize_local(&instant),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("habits.json"),
            owner: OwnerId::from("default"),
            rate_window_days: 30,
            leaderboard_size: 5,
            timezone: None,
        }
    }
}

pub fn run(config: AppConfig) -> Result<()> {
    info!(
        path = %config.store_path.display(),
        owner = %config.owner,
        "loading habits"
    );
    let repository = JsonFileRepository::new(&config.store_path);
    let service = HabitService::builder(config.owner.clone(), Box::new(repository))
        .build()
        .with_context(|| format!("failed to load habits from {}", config.store_path.display()))?;

    let today = config.today(Utc::now());
    let mut text = String::new();
    render_dashboard(&mut text, &service.habits(), today, &config)?;
    print!("{text}");
    Ok(())
}

pub fn render_dashboard(
    out: &mut impl Write,
    habits: &[Habit],
    today: CalendarDay,
    config: &AppConfig,
) -> fmt::Result {
    let window = config.rate_window_days;
    let top_n = config.leaderboard_size;

    writeln!(out, "Habits for {} on {}", config.owner, today.format("%a %Y-%m-%d"))?;
    writeln!(out)?;

    let due = analytics::due_on(habits, today);
    if due.is_empty() {
        writeln!(out, "Nothing due today.")?;
    } else {
        writeln!(out, "Due today:")?;
        for habit in due {
            let mark = if ledger::completed_on(habit, today) { "x" } else { " " };
            writeln!(
                out,
                "  [{mark}] {:<24} streak {:>3}",
                habit.name,
                adherence::current_streak(habit, today)
            )?;
        }
    }
    writeln!(out)?;

    let summary = analytics::dashboard(habits, window, today, top_n, ArchiveFilter::ActiveOnly);
    write_leaderboard(out, "Top streaks", &summary.top_by_streak, "d")?;
    write_leaderboard(
        out,
        &format!("Top completion ({window}d)"),
        &summary.top_by_completion_rate,
        "%",
    )?;
    writeln!(
        out,
        "Average completion: {:.1}%  Completions: {}  Best streak: {}",
        summary.average_completion_rate, summary.total_completions, summary.best_current_streak
    )
}

fn write_leaderboard(
    out: &mut impl Write,
    title: &str,
    rows: &[RankedHabit],
    unit: &str,
) -> fmt::Result {
    writeln!(out, "{title}:")?;
    if rows.is_empty() {
        writeln!(out, "  (no active habits)")?;
    }
    for (rank, row) in rows.iter().enumerate() {
        writeln!(out, "  {}. {:<24} {}{unit}", rank + 1, row.name, row.score)?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Weekday};
    use habit_core::{lifecycle, HabitDraft, WeekdayMask};
    use std::collections::HashMap;

    fn day(y: i32, m: u32, d: u32) -> CalendarDay {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn habit(name: &str, mask: WeekdayMask, done: &[u32]) -> Habit {
        let draft = HabitDraft::new(OwnerId::from("default"), name, mask, day(2024, 1, 1));
        let mut habit =
            lifecycle::create_habit(draft, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
                .unwrap();
        for d in done {
            habit = ledger::set_completion(&habit, day(2024, 1, *d), true, None);
        }
        habit
    }

    fn render(habits: &[Habit], today: CalendarDay, config: &AppConfig) -> String {
        let mut out = String::new();
        render_dashboard(&mut out, habits, today, config).unwrap();
        out
    }

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn config_reads_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HABIT_STORE_PATH", "/tmp/h.json"),
            ("HABIT_OWNER", "robin"),
            ("HABIT_RATE_WINDOW_DAYS", "7"),
            ("HABIT_LEADERBOARD_SIZE", "3"),
            ("HABIT_TIMEZONE", "Europe/Berlin"),
        ]));
        assert_eq!(config.store_path, PathBuf::from("/tmp/h.json"));
        assert_eq!(config.owner, OwnerId::from("robin"));
        assert_eq!(config.rate_window_days, 7);
        assert_eq!(config.leaderboard_size, 3);
        assert_eq!(config.timezone, Some(chrono_tz::Europe::Berlin));
    }

    #[test]
    fn config_keeps_defaults_for_bad_values() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HABIT_RATE_WINDOW_DAYS", "0"),
            ("HABIT_LEADERBOARD_SIZE", "many"),
            ("HABIT_TIMEZONE", "Mars/Olympus"),
        ]));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn today_follows_the_configured_zone() {
        let config = AppConfig {
            timezone: Some(chrono_tz::Asia::Tokyo),
            ..AppConfig::default()
        };
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 20, 0, 0).unwrap();
        assert_eq!(config.today(instant), day(2024, 1, 2));
    }

    #[test]
    fn renders_due_list_and_leaderboards() {
        let habits = vec![
            habit("Walk", WeekdayMask::every_day(), &[5, 6, 7]),
            habit("Gym", WeekdayMask::from_days(&[Weekday::Mon]), &[1]),
        ];
        let config = AppConfig {
            rate_window_days: 7,
            leaderboard_size: 2,
            ..AppConfig::default()
        };
        let rendered = render(&habits, day(2024, 1, 7), &config);

        assert!(rendered.contains("Habits for default on Sun 2024-01-07"));
        assert!(rendered.contains("[x] Walk"));
        assert!(!rendered.contains("] Gym"));
        assert!(rendered.contains("1. Walk"));
        assert!(rendered.contains("Top completion (7d):"));
        assert!(rendered.contains("Best streak: 3"));
    }

    #[test]
    fn renders_with_the_largest_configured_window() {
        let habits = vec![habit("Walk", WeekdayMask::every_day(), &[7])];
        let config = AppConfig::from_lookup(lookup(&[(
            "HABIT_RATE_WINDOW_DAYS",
            u32::MAX.to_string().as_str(),
        )]));
        assert_eq!(config.rate_window_days, u32::MAX);
        let rendered = render(&habits, day(2024, 1, 7), &config);
        assert!(rendered.contains("Average completion: 14.0%"));
    }

    #[test]
    fn renders_empty_collections() {
        let rendered = render(&[], day(2024, 1, 7), &AppConfig::default());
        assert!(rendered.contains("Nothing due today."));
        assert!(rendered.contains("(no active habits)"));
        assert!(rendered.contains("Average completion: 0.0%"));
    }
}
