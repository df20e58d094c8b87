use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::{Asia::Kolkata, Tz};

/// Studio timezone. Every class time is normalized to it before persistence
/// and rendered in it for display.
pub const STUDIO_TZ: Tz = Kolkata;

/// `DD Mon YYYY hh:mm AM/PM`, e.g. `05 Mar 2025 07:30 PM`.
pub const DISPLAY_FORMAT: &str = "%d %b %Y %I:%M %p";

/// A class time as supplied by seed tooling: either wall-clock time without
/// an offset, or an instant with one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClassTime {
    Naive(NaiveDateTime),
    Aware(DateTime<Utc>),
}

impl From<NaiveDateTime> for ClassTime {
    fn from(value: NaiveDateTime) -> Self {
        ClassTime::Naive(value)
    }
}

impl<T: TimeZone> From<DateTime<T>> for ClassTime {
    fn from(value: DateTime<T>) -> Self {
        ClassTime::Aware(value.with_timezone(&Utc))
    }
}

/// Naive values are read as IST wall-clock time, aware values are converted.
///
/// IST has no DST, so every wall-clock time maps to exactly one instant; the
/// `Ambiguous`/`None` arms only exist to satisfy the `TimeZone` API.
pub fn normalize_to_ist(time: impl Into<ClassTime>) -> DateTime<Tz> {
    match time.into() {
        ClassTime::Aware(instant) => instant.with_timezone(&STUDIO_TZ),
        ClassTime::Naive(naive) => match STUDIO_TZ.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
            LocalResult::None => Utc.from_utc_datetime(&naive).with_timezone(&STUDIO_TZ),
        },
    }
}

pub fn to_studio_time(instant: DateTime<Utc>) -> DateTime<Tz> {
    instant.with_timezone(&STUDIO_TZ)
}

pub fn format_display(instant: DateTime<Utc>) -> String {
    to_studio_time(instant).format(DISPLAY_FORMAT).to_string()
}
