//! State transitions that guard mutation: creation, field edits, archive, lock and delete.
//!
//! Every function checks its preconditions before producing a new value, so a failure never
//! leaves a half-applied change behind.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{HabitError, Result, ValidationFailure};
use crate::habit::{Habit, HabitDraft, HabitId, HabitPatch, WeekdayMask};

pub fn create_habit(draft: HabitDraft, now: DateTime<Utc>) -> Result<Habit> {
    validate_fields(&draft.name, &draft.frequency, draft.start_date, draft.end_date)?;
    Ok(Habit {
        id: HabitId::new(),
        owner_id: draft.owner_id,
        name: draft.name.trim().to_string(),
        description: draft.description,
        color: draft.color,
        icon: draft.icon,
        frequency: draft.frequency,
        start_date: draft.start_date,
        end_date: draft.end_date,
        archived: false,
        locked: false,
        entries: Vec::new(),
        created_at: now,
        updated_at: now,
    })
}

pub fn apply_patch(habit: &Habit, patch: HabitPatch, now: DateTime<Utc>) -> Result<Habit> {
    let mut updated = habit.clone();
    if let Some(name) = patch.name {
        updated.name = name.trim().to_string();
    }
    if let Some(description) = patch.description {
        updated.description = description;
    }
    if let Some(color) = patch.color {
        updated.color = color;
    }
    if let Some(icon) = patch.icon {
        updated.icon = icon;
    }
    if let Some(frequency) = patch.frequency {
        updated.frequency = frequency;
    }
    if let Some(start_date) = patch.start_date {
        updated.start_date = start_date;
    }
    if let Some(end_date) = patch.end_date {
        updated.end_date = end_date;
    }
    validate_fields(
        &updated.name,
        &updated.frequency,
        updated.start_date,
        updated.end_date,
    )?;
    updated.updated_at = now;
    Ok(updated)
}

/// Check the invariants every persisted habit must satisfy.
pub fn validate(habit: &Habit) -> Result<()> {
    validate_fields(&habit.name, &habit.frequency, habit.start_date, habit.end_date)
}

fn validate_fields(
    name: &str,
    frequency: &WeekdayMask,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ValidationFailure::BlankName.into());
    }
    if frequency.is_empty() {
        return Err(ValidationFailure::EmptyFrequency.into());
    }
    if let Some(end) = end_date {
        if end < start_date {
            return Err(ValidationFailure::EndBeforeStart {
                start: start_date,
                end,
            }
            .into());
        }
    }
    Ok(())
}

pub fn archive(habit: &Habit, now: DateTime<Utc>) -> Habit {
    set_archived(habit, true, now)
}

pub fn unarchive(habit: &Habit, now: DateTime<Utc>) -> Habit {
    set_archived(habit, false, now)
}

fn set_archived(habit: &Habit, archived: bool, now: DateTime<Utc>) -> Habit {
    let mut updated = habit.clone();
    updated.archived = archived;
    updated.updated_at = now;
    updated
}

/// One-way lock. Locking twice is a caller error.
pub fn lock(habit: &Habit, now: DateTime<Utc>) -> Result<Habit> {
    if habit.locked {
        return Err(ValidationFailure::AlreadyLocked(habit.id).into());
    }
    let mut updated = habit.clone();
    updated.locked = true;
    updated.updated_at = now;
    Ok(updated)
}

pub fn ensure_deletable(habit: &Habit) -> Result<()> {
    if habit.locked {
        return Err(ValidationFailure::Locked(habit.id).into());
    }
    Ok(())
}

/// Remove `id` from `habits` together with its ledger. The collection is untouched on error.
pub fn delete(habits: &mut Vec<Habit>, id: HabitId) -> Result<Habit> {
    let index = habits
        .iter()
        .position(|habit| habit.id == id)
        .ok_or_else(|| HabitError::habit_not_found(id))?;
    ensure_deletable(&habits[index])?;
    Ok(habits.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::OwnerId;
    use crate::ledger;
    use crate::testing::day;
    use chrono::{TimeZone, Weekday};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    fn later() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 9, 0, 0).unwrap()
    }

    fn draft(frequency: WeekdayMask) -> HabitDraft {
        HabitDraft::new(OwnerId::from("owner"), "Meditate", frequency, day(2024, 1, 1))
    }

    #[test]
    fn creates_active_unlocked_habit() {
        let habit = create_habit(draft(WeekdayMask::every_day()), now()).unwrap();
        assert!(!habit.archived);
        assert!(!habit.locked);
        assert!(habit.entries.is_empty());
        assert_eq!(habit.created_at, now());
        assert_eq!(habit.updated_at, now());
    }

    #[test]
    fn create_carries_display_metadata() {
        let habit = create_habit(
            draft(WeekdayMask::every_day())
                .with_description("Ten minutes after lunch")
                .with_color("#10b981")
                .with_icon("lotus"),
            now(),
        )
        .unwrap();
        assert_eq!(habit.description.as_deref(), Some("Ten minutes after lunch"));
        assert_eq!(habit.color, "#10b981");
        assert_eq!(habit.icon.as_deref(), Some("lotus"));
    }

    #[test]
    fn rejects_empty_frequency() {
        let err = create_habit(draft(WeekdayMask::default()), now()).unwrap_err();
        assert!(matches!(
            err,
            HabitError::Validation(ValidationFailure::EmptyFrequency)
        ));
    }

    #[test]
    fn rejects_end_before_start() {
        let err = create_habit(
            draft(WeekdayMask::every_day()).with_end_date(day(2023, 12, 31)),
            now(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            HabitError::Validation(ValidationFailure::EndBeforeStart { .. })
        ));

        let same_day = create_habit(
            draft(WeekdayMask::every_day()).with_end_date(day(2024, 1, 1)),
            now(),
        );
        assert!(same_day.is_ok());
    }

    #[test]
    fn rejects_blank_name() {
        let mut blank = draft(WeekdayMask::every_day());
        blank.name = "   ".into();
        let err = create_habit(blank, now()).unwrap_err();
        assert!(matches!(
            err,
            HabitError::Validation(ValidationFailure::BlankName)
        ));
    }

    #[test]
    fn patch_validates_the_merged_result() {
        let habit = create_habit(draft(WeekdayMask::every_day()), now()).unwrap();

        let clearing_mask = HabitPatch {
            frequency: Some(WeekdayMask::default()),
            ..HabitPatch::default()
        };
        assert!(apply_patch(&habit, clearing_mask, later())
            .unwrap_err()
            .is_validation());

        let moving_start_past_end = HabitPatch {
            start_date: Some(day(2024, 3, 1)),
            end_date: Some(Some(day(2024, 2, 1))),
            ..HabitPatch::default()
        };
        assert!(apply_patch(&habit, moving_start_past_end, later())
            .unwrap_err()
            .is_validation());

        let renamed = apply_patch(
            &habit,
            HabitPatch {
                name: Some("Breathe".into()),
                frequency: Some(WeekdayMask::from_days(&[Weekday::Sat])),
                ..HabitPatch::default()
            },
            later(),
        )
        .unwrap();
        assert_eq!(renamed.name, "Breathe");
        assert_eq!(renamed.frequency.scheduled_days(), vec![Weekday::Sat]);
        assert_eq!(renamed.updated_at, later());
        assert_eq!(renamed.created_at, now());
    }

    #[test]
    fn patch_can_clear_the_end_date() {
        let habit = create_habit(
            draft(WeekdayMask::every_day()).with_end_date(day(2024, 6, 1)),
            now(),
        )
        .unwrap();
        let open_ended = apply_patch(
            &habit,
            HabitPatch {
                end_date: Some(None),
                ..HabitPatch::default()
            },
            later(),
        )
        .unwrap();
        assert!(open_ended.end_date.is_none());
    }

    #[test]
    fn archive_round_trip_preserves_history() {
        let habit = create_habit(draft(WeekdayMask::every_day()), now()).unwrap();
        let habit = ledger::set_completion(&habit, day(2024, 1, 1), true, None);
        let archived = archive(&habit, later());
        assert!(archived.archived);
        assert_eq!(archived.entries, habit.entries);
        let restored = unarchive(&archived, later());
        assert!(!restored.archived);
        assert_eq!(restored.entries, habit.entries);
    }

    #[test]
    fn lock_is_one_shot() {
        let habit = create_habit(draft(WeekdayMask::every_day()), now()).unwrap();
        let locked = lock(&habit, later()).unwrap();
        assert!(locked.locked);
        let err = lock(&locked, later()).unwrap_err();
        assert!(matches!(
            err,
            HabitError::Validation(ValidationFailure::AlreadyLocked(id)) if id == habit.id
        ));
    }

    #[test]
    fn delete_refuses_locked_habits() {
        let habit = create_habit(draft(WeekdayMask::every_day()), now()).unwrap();
        let locked = lock(&habit, later()).unwrap();
        let mut habits = vec![locked.clone()];
        let err = delete(&mut habits, locked.id).unwrap_err();
        assert!(matches!(
            err,
            HabitError::Validation(ValidationFailure::Locked(_))
        ));
        assert_eq!(habits, vec![locked]);
    }

    #[test]
    fn delete_removes_habit_and_entries() {
        let keep = create_habit(draft(WeekdayMask::every_day()), now()).unwrap();
        let gone = create_habit(draft(WeekdayMask::every_day()), now()).unwrap();
        let gone = ledger::set_completion(&gone, day(2024, 1, 1), true, None);
        let mut habits = vec![keep.clone(), gone.clone()];

        let removed = delete(&mut habits, gone.id).unwrap();
        assert_eq!(removed.entries.len(), 1);
        assert_eq!(habits, vec![keep]);

        assert!(delete(&mut habits, gone.id).unwrap_err().is_not_found());
    }
}
