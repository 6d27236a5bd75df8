use std::fmt;

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_COLOR: &str = "#3b82f6";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(Uuid);

impl HabitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HabitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque identity of the user owning a habit collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OwnerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which weekdays a habit is due on, indexed Monday first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "WeekdayFlags", into = "WeekdayFlags")]
pub struct WeekdayMask([bool; 7]);

impl WeekdayMask {
    pub fn every_day() -> Self {
        Self([true; 7])
    }

    pub fn from_days(days: &[Weekday]) -> Self {
        let mut mask = Self::default();
        for day in days {
            mask.set(*day, true);
        }
        mask
    }

    pub fn is_set(&self, weekday: Weekday) -> bool {
        self.0[weekday.num_days_from_monday() as usize]
    }

    pub fn set(&mut self, weekday: Weekday, due: bool) {
        self.0[weekday.num_days_from_monday() as usize] = due;
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|due| *due)
    }

    pub fn scheduled_days(&self) -> Vec<Weekday> {
        ALL_WEEKDAYS
            .iter()
            .copied()
            .filter(|day| self.is_set(*day))
            .collect()
    }
}

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
struct WeekdayFlags {
    monday: bool,
    tuesday: bool,
    wednesday: bool,
    thursday: bool,
    friday: bool,
    saturday: bool,
    sunday: bool,
}

impl From<WeekdayFlags> for WeekdayMask {
    fn from(flags: WeekdayFlags) -> Self {
        Self([
            flags.monday,
            flags.tuesday,
            flags.wednesday,
            flags.thursday,
            flags.friday,
            flags.saturday,
            flags.sunday,
        ])
    }
}

impl From<WeekdayMask> for WeekdayFlags {
    fn from(mask: WeekdayMask) -> Self {
        let [monday, tuesday, wednesday, thursday, friday, saturday, sunday] = mask.0;
        Self {
            monday,
            tuesday,
            wednesday,
            thursday,
            friday,
            saturday,
            sunday,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HabitEntry {
    pub id: EntryId,
    pub date: NaiveDate,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Habit {
    pub id: HabitId,
    pub owner_id: OwnerId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub frequency: WeekdayMask,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub locked: bool,
    /// Completion ledger, kept in ascending date order with at most one entry per day.
    #[serde(default)]
    pub entries: Vec<HabitEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for a new habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDraft {
    pub owner_id: OwnerId,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: Option<String>,
    pub frequency: WeekdayMask,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl HabitDraft {
    pub fn new(
        owner_id: OwnerId,
        name: impl Into<String>,
        frequency: WeekdayMask,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            owner_id,
            name: name.into(),
            description: None,
            color: DEFAULT_COLOR.to_string(),
            icon: None,
            frequency,
            start_date,
            end_date: None,
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Partial field update. `None` leaves a field untouched; `end_date: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub color: Option<String>,
    pub icon: Option<Option<String>>,
    pub frequency: Option<WeekdayMask>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_reports_scheduled_days_in_week_order() {
        let mask = WeekdayMask::from_days(&[Weekday::Fri, Weekday::Mon, Weekday::Wed]);
        assert_eq!(
            mask.scheduled_days(),
            vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]
        );
        assert!(mask.is_set(Weekday::Wed));
        assert!(!mask.is_set(Weekday::Sun));
        assert!(!mask.is_empty());
        assert!(WeekdayMask::default().is_empty());
    }

    #[test]
    fn mask_serializes_as_named_weekdays() {
        let mask = WeekdayMask::from_days(&[Weekday::Tue, Weekday::Sun]);
        let json = serde_json::to_value(mask).unwrap();
        assert_eq!(json["tuesday"], true);
        assert_eq!(json["sunday"], true);
        assert_eq!(json["monday"], false);

        let parsed: WeekdayMask =
            serde_json::from_str(r#"{"saturday": true, "sunday": true}"#).unwrap();
        assert_eq!(
            parsed.scheduled_days(),
            vec![Weekday::Sat, Weekday::Sun]
        );
    }

    #[test]
    fn draft_defaults_display_metadata() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let draft = HabitDraft::new("owner".into(), "Read", WeekdayMask::every_day(), start)
            .with_icon("book");
        assert_eq!(draft.color, DEFAULT_COLOR);
        assert_eq!(draft.icon.as_deref(), Some("book"));
        assert!(draft.end_date.is_none());
    }
}
