use chrono::{NaiveDate, TimeZone, Utc};

use crate::calendar::CalendarDay;
use crate::habit::{Habit, HabitId, OwnerId, WeekdayMask};
use crate::ledger;

pub(crate) fn day(y: i32, m: u32, d: u32) -> CalendarDay {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn habit(frequency: WeekdayMask, start_date: CalendarDay) -> Habit {
    let stamp = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    Habit {
        id: HabitId::new(),
        owner_id: OwnerId::from("owner"),
        name: "Habit".into(),
        description: None,
        color: "#3b82f6".into(),
        icon: None,
        frequency,
        start_date,
        end_date: None,
        archived: false,
        locked: false,
        entries: Vec::new(),
        created_at: stamp,
        updated_at: stamp,
    }
}

pub(crate) fn completed(mut habit: Habit, days: &[CalendarDay]) -> Habit {
    for d in days {
        habit = ledger::set_completion(&habit, *d, true, None);
    }
    habit
}
