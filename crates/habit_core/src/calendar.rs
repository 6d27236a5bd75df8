use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone, Weekday};

/// A timezone-free calendar date. Every day comparison in the engine uses this type.
pub type CalendarDay = NaiveDate;

/// Strip the time of day from `instant` as observed in `tz`.
pub fn normalize<Tz: TimeZone, Z: TimeZone>(instant: &DateTime<Tz>, tz: &Z) -> CalendarDay {
    instant.with_timezone(tz).date_naive()
}

pub fn normalize_local<Tz: TimeZone>(instant: &DateTime<Tz>) -> CalendarDay {
    normalize(instant, &Local)
}

/// Signed whole-day difference `a - b`.
pub fn days_between(a: CalendarDay, b: CalendarDay) -> i64 {
    a.signed_duration_since(b).num_days()
}

pub fn weekday_of(day: CalendarDay) -> Weekday {
    day.weekday()
}

/// Inclusive bounds of the `window_days` calendar days ending at `today`, or `None` for an
/// empty window. The first day saturates at the earliest representable date.
pub fn window_bounds(today: CalendarDay, window_days: u32) -> Option<(CalendarDay, CalendarDay)> {
    let span = u64::from(window_days).checked_sub(1)?;
    let first = today
        .checked_sub_days(Days::new(span))
        .unwrap_or(NaiveDate::MIN);
    Some((first, today))
}
