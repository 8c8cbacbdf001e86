//! Free/busy computation over a working-hours window.
//!
//! Given a [`WorkWindow`](work_window) and an unordered set of busy slots,
//! [`compute_free_busy`] produces the complementary free intervals with a
//! single sweep:
//!
//! ```text
//! window   |=========================================|
//! busy          [xxxx]   [xxxxxx]
//!                          [xx]        [xxxxxxxxxxxxxx]-->
//! free     [---]      [-]        [----]
//! ```
//!
//! The cursor only ever moves forward (`cursor = max(cursor, busy.end)`), so
//! nested or overlapping slots never re-open time that is already covered.

use chrono::{Duration, NaiveDate};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::{AvailabilityError, AvailabilityResult};
use crate::time::{Interval, localize};

/// Default start of working hours.
pub const DEFAULT_START_HOUR: u32 = 9;

/// Default end of working hours.
pub const DEFAULT_END_HOUR: u32 = 17;

/// A busy interval, optionally labelled with the title of the event behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusySlot {
    pub interval: Interval,
    pub label: Option<String>,
}

impl BusySlot {
    pub fn new(interval: Interval) -> Self {
        Self {
            interval,
            label: None,
        }
    }

    /// Attaches a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Result of [`compute_free_busy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    /// The window the free list was computed against.
    pub window: Interval,
    /// Busy slots sorted by `(start, end)`, unclipped.
    pub busy: Vec<BusySlot>,
    /// Maximal free intervals inside the window, sorted by start.
    pub free: Vec<Interval>,
}

/// Builds the `[start_hour:00, end_hour:00)` window of `date` in `tz`.
///
/// `end_hour` may be 24 to mean midnight at the end of the day.
pub fn work_window(
    date: NaiveDate,
    start_hour: u32,
    end_hour: u32,
    tz: Tz,
) -> AvailabilityResult<Interval> {
    if start_hour > 24 || end_hour > 24 {
        return Err(AvailabilityError::InvalidWorkWindow(format!(
            "hours must be between 0 and 24 (got {start_hour}-{end_hour})"
        )));
    }
    if start_hour > end_hour {
        return Err(AvailabilityError::InvalidWorkWindow(format!(
            "start hour {start_hour} is after end hour {end_hour}"
        )));
    }

    let start = localize(at_hour(date, start_hour)?, tz)
        .map_err(|e| AvailabilityError::InvalidWorkWindow(e.to_string()))?;
    let end = localize(at_hour(date, end_hour)?, tz)
        .map_err(|e| AvailabilityError::InvalidWorkWindow(e.to_string()))?;

    Interval::new(start, end)
        .map_err(|e| AvailabilityError::InvalidWorkWindow(e.to_string()))
}

fn at_hour(date: NaiveDate, hour: u32) -> AvailabilityResult<chrono::NaiveDateTime> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AvailabilityError::InvalidWorkWindow(format!("invalid date {date}")))?;
    Ok(midnight + Duration::hours(i64::from(hour)))
}

/// Computes the free intervals of `window` not covered by `busy`.
///
/// Busy slots may be unsorted, overlapping or duplicated, and may lie partly
/// or wholly outside the window. Zero-length slots are kept in the busy list
/// but do not split free time. Free intervals never extend past `window.end()`.
pub fn compute_free_busy(window: &Interval, mut busy: Vec<BusySlot>) -> Availability {
    // sort_by is stable, so equal slots keep their input order.
    busy.sort_by(|a, b| {
        (a.interval.start(), a.interval.end()).cmp(&(b.interval.start(), b.interval.end()))
    });

    let mut free = Vec::new();
    let mut cursor = window.start();

    for slot in busy.iter().filter(|slot| !slot.interval.is_empty()) {
        let gap_end = slot.interval.start().min(window.end());
        if cursor < gap_end {
            free.push(Interval::between(cursor, gap_end));
        }
        cursor = cursor.max(slot.interval.end());
    }

    if cursor < window.end() {
        free.push(Interval::between(cursor, window.end()));
    }

    debug!(busy = busy.len(), free = free.len(), "computed availability");

    Availability {
        window: *window,
        busy,
        free,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use chrono_tz::Europe::London;

    fn at(h: u32, m: u32) -> DateTime<Tz> {
        London.with_ymd_and_hms(2024, 3, 15, h, m, 0).unwrap()
    }

    fn iv(sh: u32, sm: u32, eh: u32, em: u32) -> Interval {
        Interval::new(at(sh, sm), at(eh, em)).unwrap()
    }

    fn busy(sh: u32, sm: u32, eh: u32, em: u32) -> BusySlot {
        BusySlot::new(iv(sh, sm, eh, em))
    }

    fn nine_to_five() -> Interval {
        iv(9, 0, 17, 0)
    }

    mod sweep {
        use super::*;

        #[test]
        fn empty_busy_frees_whole_window() {
            let result = compute_free_busy(&nine_to_five(), vec![]);
            assert_eq!(result.free, vec![nine_to_five()]);
            assert!(result.busy.is_empty());
        }

        #[test]
        fn exact_cover_leaves_nothing_free() {
            let result = compute_free_busy(&nine_to_five(), vec![busy(9, 0, 17, 0)]);
            assert!(result.free.is_empty());
        }

        #[test]
        fn overlapping_busy_slots() {
            let result = compute_free_busy(
                &nine_to_five(),
                vec![busy(10, 30, 12, 0), busy(10, 0, 11, 0)],
            );
            assert_eq!(result.free, vec![iv(9, 0, 10, 0), iv(12, 0, 17, 0)]);
            assert_eq!(result.busy, vec![busy(10, 0, 11, 0), busy(10, 30, 12, 0)]);
        }

        #[test]
        fn busy_past_window_end() {
            let result = compute_free_busy(&nine_to_five(), vec![busy(16, 0, 18, 0)]);
            assert_eq!(result.free, vec![iv(9, 0, 16, 0)]);
        }

        #[test]
        fn busy_before_window_start() {
            let result = compute_free_busy(&nine_to_five(), vec![busy(8, 0, 9, 30)]);
            assert_eq!(result.free, vec![iv(9, 30, 17, 0)]);
        }

        #[test]
        fn back_to_back_slots_have_no_gap() {
            let result = compute_free_busy(
                &nine_to_five(),
                vec![busy(10, 0, 11, 0), busy(11, 0, 12, 0)],
            );
            assert_eq!(result.free, vec![iv(9, 0, 10, 0), iv(12, 0, 17, 0)]);
            assert!(result.free.iter().all(|f| !f.is_empty()));
        }

        #[test]
        fn duplicates_behave_like_one() {
            let once = compute_free_busy(&nine_to_five(), vec![busy(13, 0, 14, 0)]);
            let thrice = compute_free_busy(
                &nine_to_five(),
                vec![busy(13, 0, 14, 0), busy(13, 0, 14, 0), busy(13, 0, 14, 0)],
            );
            assert_eq!(once.free, thrice.free);
            assert_eq!(thrice.busy.len(), 3);
        }

        #[test]
        fn nested_slot_does_not_reopen_time() {
            let result = compute_free_busy(
                &nine_to_five(),
                vec![busy(10, 0, 15, 0), busy(11, 0, 12, 0)],
            );
            assert_eq!(result.free, vec![iv(9, 0, 10, 0), iv(15, 0, 17, 0)]);
        }

        #[test]
        fn zero_length_slot_is_noop() {
            let result = compute_free_busy(&nine_to_five(), vec![busy(12, 0, 12, 0)]);
            assert_eq!(result.free, vec![nine_to_five()]);
            assert_eq!(result.busy.len(), 1);
        }

        #[test]
        fn slot_entirely_after_window() {
            let result = compute_free_busy(&nine_to_five(), vec![busy(18, 0, 19, 0)]);
            assert_eq!(result.free, vec![nine_to_five()]);
        }

        #[test]
        fn slot_entirely_before_window() {
            let result = compute_free_busy(&nine_to_five(), vec![busy(7, 0, 8, 0)]);
            assert_eq!(result.free, vec![nine_to_five()]);
        }

        #[test]
        fn labels_survive_sorting() {
            let result = compute_free_busy(
                &nine_to_five(),
                vec![
                    busy(14, 0, 15, 0).with_label("Review"),
                    busy(10, 0, 11, 0).with_label("Standup"),
                ],
            );
            let labels: Vec<_> = result.busy.iter().map(|b| b.label.as_deref()).collect();
            assert_eq!(labels, vec![Some("Standup"), Some("Review")]);
        }

        #[test]
        fn ties_broken_by_end() {
            let result = compute_free_busy(
                &nine_to_five(),
                vec![busy(10, 0, 12, 0), busy(10, 0, 11, 0)],
            );
            assert_eq!(result.busy, vec![busy(10, 0, 11, 0), busy(10, 0, 12, 0)]);
        }
    }

    mod window {
        use super::*;

        fn day() -> NaiveDate {
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        }

        #[test]
        fn default_hours() {
            let w = work_window(day(), DEFAULT_START_HOUR, DEFAULT_END_HOUR, London).unwrap();
            assert_eq!(w, nine_to_five());
        }

        #[test]
        fn end_hour_24_is_next_midnight() {
            let w = work_window(day(), 0, 24, London).unwrap();
            assert_eq!(w.duration_minutes(), 24 * 60);
            assert_eq!(w.end(), London.with_ymd_and_hms(2024, 3, 16, 0, 0, 0).unwrap());
        }

        #[test]
        fn reversed_hours_rejected() {
            let err = work_window(day(), 17, 9, London).unwrap_err();
            assert!(matches!(err, AvailabilityError::InvalidWorkWindow(_)));
        }

        #[test]
        fn out_of_range_hour_rejected() {
            assert!(work_window(day(), 9, 25, London).is_err());
        }

        #[test]
        fn dst_gap_rejected() {
            // 01:00 local does not exist in London on 2024-03-31.
            let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
            assert!(work_window(date, 1, 9, London).is_err());
        }

        #[test]
        fn short_dst_day_window_length() {
            let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
            let w = work_window(date, 0, 24, London).unwrap();
            assert_eq!(w.duration_minutes(), 23 * 60);
        }
    }
}
