//! Time types and parsing helpers.
//!
//! This module provides [`Interval`], the half-open `[start, end)` range the
//! availability sweep works on, [`EventTime`] for calendar event boundaries
//! (a timed instant or an all-day date), and the parsers used for user input.

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, AvailabilityResult};

/// Time zone used when neither the command line nor the config names one.
pub const DEFAULT_TIMEZONE: &str = "Europe/London";

/// Accepted layouts for user-supplied datetimes, tried in order.
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M",
];

/// Looks up an IANA time zone by name.
pub fn parse_timezone(name: &str) -> AvailabilityResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| AvailabilityError::UnknownTimezone(name.to_string()))
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> AvailabilityResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| AvailabilityError::InvalidDateTime(format!("{s} (expected YYYY-MM-DD)")))
}

/// Parses a wall-clock datetime in one of [`DATETIME_FORMATS`] and pins it to `tz`.
pub fn parse_local_datetime(s: &str, tz: Tz) -> AvailabilityResult<DateTime<Tz>> {
    let s = s.trim();
    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| AvailabilityError::InvalidDateTime(s.to_string()))?;
    localize(naive, tz)
}

/// Resolves a wall-clock time in `tz`.
///
/// Ambiguous times (clocks going back) resolve to the earlier instant.
/// Times skipped by a DST jump are an error.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> AvailabilityResult<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(AvailabilityError::InvalidDateTime(format!(
            "{naive} does not exist in {tz}"
        ))),
    }
}

/// A half-open time range `[start, end)` in a single IANA zone.
///
/// `start <= end` always holds; zero-length intervals are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
}

impl Interval {
    /// Creates an interval, failing with `InvalidInterval` when `start > end`.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> AvailabilityResult<Self> {
        if start > end {
            return Err(AvailabilityError::InvalidInterval {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// Builds an interval the caller has already ordered.
    pub(crate) fn between(start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Creates an interval from a start and a non-negative length.
    pub fn from_duration(start: DateTime<Tz>, duration: Duration) -> AvailabilityResult<Self> {
        Self::new(start, start + duration)
    }

    /// Inclusive start.
    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    /// Exclusive end.
    pub fn end(&self) -> DateTime<Tz> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Length in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// Returns `true` for a zero-length interval.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Checks whether `dt` lies in `[start, end)`.
    pub fn contains(&self, dt: DateTime<Tz>) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Checks whether `other` lies entirely inside this interval.
    pub fn encloses(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The overlap of two intervals, if it is non-empty.
    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Interval { start, end })
    }
}

/// The start or end of a calendar event.
///
/// Google Calendar reports timed events as an RFC 3339 instant and all-day
/// events as a bare date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    /// A specific instant with the offset it was reported in.
    DateTime(DateTime<FixedOffset>),
    /// An all-day event date.
    AllDay(NaiveDate),
}

impl EventTime {
    /// Parses an RFC 3339 instant (`Z` or numeric offset).
    pub fn parse_rfc3339(s: &str) -> AvailabilityResult<Self> {
        DateTime::parse_from_rfc3339(s)
            .map(Self::DateTime)
            .map_err(|_| AvailabilityError::InvalidDateTime(s.to_string()))
    }

    /// Parses a `YYYY-MM-DD` all-day date.
    pub fn parse_date(s: &str) -> AvailabilityResult<Self> {
        parse_date(s).map(Self::AllDay)
    }

    /// Returns `true` if this is an all-day date.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::AllDay(_))
    }

    /// The instant in `tz`, or `None` for all-day dates.
    pub fn in_timezone(&self, tz: Tz) -> Option<DateTime<Tz>> {
        match self {
            Self::DateTime(dt) => Some(dt.with_timezone(&tz)),
            Self::AllDay(_) => None,
        }
    }

    /// The calendar date as seen from `tz`.
    pub fn date_in(&self, tz: Tz) -> NaiveDate {
        match self {
            Self::DateTime(dt) => dt.with_timezone(&tz).date_naive(),
            Self::AllDay(date) => *date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, Timelike};
    use chrono_tz::Europe::London;

    fn at(h: u32, m: u32) -> DateTime<Tz> {
        London.with_ymd_and_hms(2024, 3, 15, h, m, 0).unwrap()
    }

    mod parsing {
        use super::*;

        #[test]
        fn timezone_known_and_unknown() {
            assert_eq!(parse_timezone("America/New_York").unwrap(), chrono_tz::America::New_York);
            assert_eq!(parse_timezone(" Europe/London ").unwrap(), London);
            assert_eq!(
                parse_timezone("Mars/Olympus"),
                Err(AvailabilityError::UnknownTimezone("Mars/Olympus".to_string()))
            );
        }

        #[test]
        fn every_accepted_datetime_format() {
            for input in [
                "2024-03-15 14:30",
                "2024-03-15 14:30:00",
                "2024-03-15T14:30",
                "2024-03-15T14:30:00",
                "15/03/2024 14:30",
                "15-03-2024 14:30",
            ] {
                let dt = parse_local_datetime(input, London).unwrap();
                assert_eq!(dt, at(14, 30), "input {input}");
            }
        }

        #[test]
        fn garbage_datetime_rejected() {
            let err = parse_local_datetime("tomorrow at noon", London).unwrap_err();
            assert!(matches!(err, AvailabilityError::InvalidDateTime(_)));
        }

        #[test]
        fn skipped_local_time_rejected() {
            // Clocks jump from 01:00 to 02:00 on 2024-03-31 in London.
            let err = parse_local_datetime("2024-03-31 01:30", London).unwrap_err();
            assert!(err.to_string().contains("does not exist"));
        }

        #[test]
        fn ambiguous_local_time_takes_earliest() {
            // 01:30 happens twice on 2024-10-27 in London (BST then GMT).
            let dt = parse_local_datetime("2024-10-27 01:30", London).unwrap();
            assert_eq!(dt.offset().fix().local_minus_utc(), 3600);
            assert_eq!(dt.hour(), 1);
        }

        #[test]
        fn date_parsing() {
            assert_eq!(
                parse_date("2024-03-15").unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
            );
            assert!(parse_date("15/03/2024").is_err());
        }
    }

    mod interval {
        use super::*;

        #[test]
        fn creation_and_accessors() {
            let iv = Interval::new(at(9, 0), at(10, 30)).unwrap();
            assert_eq!(iv.start(), at(9, 0));
            assert_eq!(iv.end(), at(10, 30));
            assert_eq!(iv.duration_minutes(), 90);
            assert!(!iv.is_empty());
        }

        #[test]
        fn zero_length_allowed() {
            let iv = Interval::new(at(9, 0), at(9, 0)).unwrap();
            assert!(iv.is_empty());
            assert!(!iv.contains(at(9, 0)));
        }

        #[test]
        fn start_after_end_rejected() {
            let err = Interval::new(at(11, 0), at(10, 0)).unwrap_err();
            assert!(matches!(err, AvailabilityError::InvalidInterval { .. }));
        }

        #[test]
        fn contains_is_half_open() {
            let iv = Interval::new(at(9, 0), at(10, 0)).unwrap();
            assert!(iv.contains(at(9, 0)));
            assert!(iv.contains(at(9, 59)));
            assert!(!iv.contains(at(10, 0)));
        }

        #[test]
        fn intersect_and_encloses() {
            let a = Interval::new(at(9, 0), at(12, 0)).unwrap();
            let b = Interval::new(at(11, 0), at(13, 0)).unwrap();
            let c = Interval::new(at(12, 0), at(13, 0)).unwrap();

            assert_eq!(a.intersect(&b), Some(Interval::new(at(11, 0), at(12, 0)).unwrap()));
            assert_eq!(a.intersect(&c), None);
            assert!(a.encloses(&Interval::new(at(10, 0), at(11, 0)).unwrap()));
            assert!(!a.encloses(&b));
        }

        #[test]
        fn from_duration() {
            let iv = Interval::from_duration(at(9, 0), Duration::minutes(45)).unwrap();
            assert_eq!(iv.end(), at(9, 45));
            assert!(Interval::from_duration(at(9, 0), Duration::minutes(-5)).is_err());
        }
    }

    mod event_time {
        use super::*;

        #[test]
        fn timed_event_converts_zone() {
            let et = EventTime::parse_rfc3339("2024-03-15T14:00:00Z").unwrap();
            assert!(!et.is_all_day());
            let ny = et.in_timezone(chrono_tz::America::New_York).unwrap();
            assert_eq!(ny.hour(), 10);
        }

        #[test]
        fn all_day_has_no_instant() {
            let et = EventTime::parse_date("2024-03-15").unwrap();
            assert!(et.is_all_day());
            assert!(et.in_timezone(London).is_none());
            assert_eq!(et.date_in(London), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        }

        #[test]
        fn date_depends_on_zone() {
            let et = EventTime::parse_rfc3339("2024-03-15T23:30:00-04:00").unwrap();
            assert_eq!(et.date_in(London), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
            assert_eq!(
                et.date_in(chrono_tz::America::New_York),
                NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
            );
        }

        #[test]
        fn serde_roundtrip() {
            let et = EventTime::parse_date("2024-03-15").unwrap();
            let json = serde_json::to_string(&et).unwrap();
            let back: EventTime = serde_json::from_str(&json).unwrap();
            assert_eq!(et, back);
        }
    }
}
