//! Golden tests for console and JSON output.
//!
//! Console blocks are compared verbatim; the JSON report uses an insta
//! inline snapshot. Run `cargo insta review` after intentional changes.

use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Europe::London;
use chrono_tz::Tz;

use crate::availability::{BusySlot, compute_free_busy, work_window};
use crate::event::{CalendarEvent, EventSummary};
use crate::format::{AvailabilityReport, render_availability, render_event_list};
use crate::time::{EventTime, Interval};

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 5).unwrap()
}

fn at(h: u32, m: u32) -> DateTime<Tz> {
    London.with_ymd_and_hms(2025, 2, 5, h, m, 0).unwrap()
}

fn slot(sh: u32, sm: u32, eh: u32, em: u32, label: &str) -> BusySlot {
    BusySlot::new(Interval::new(at(sh, sm), at(eh, em)).unwrap()).with_label(label)
}

fn window() -> Interval {
    work_window(reference_date(), 9, 17, London).unwrap()
}

#[test]
fn golden_availability_empty_day() {
    let availability = compute_free_busy(&window(), vec![]);
    assert_eq!(
        render_availability(&availability),
        "\n  Available:\n    09:00 - 17:00 (480 min)\n"
    );
}

#[test]
fn golden_availability_busy_morning() {
    let availability = compute_free_busy(
        &window(),
        vec![
            slot(10, 30, 12, 0, "Investor call"),
            slot(10, 0, 11, 0, "Standup"),
        ],
    );
    assert_eq!(
        render_availability(&availability),
        "\n  Busy:\n\
         \x20   10:00 - 11:00  Standup\n\
         \x20   10:30 - 12:00  Investor call\n\
         \n  Available:\n\
         \x20   09:00 - 10:00 (60 min)\n\
         \x20   12:00 - 17:00 (300 min)\n"
    );
}

#[test]
fn golden_availability_fully_booked() {
    let availability = compute_free_busy(&window(), vec![slot(8, 0, 18, 0, "Offsite")]);
    assert_eq!(
        render_availability(&availability),
        "\n  Busy:\n    08:00 - 18:00  Offsite\n\n  No availability in this time range.\n"
    );
}

#[test]
fn golden_event_list_grouped_by_date() {
    let events = [
        CalendarEvent::new(
            "a",
            EventTime::parse_rfc3339("2025-02-05T09:00:00Z").unwrap(),
            EventTime::parse_rfc3339("2025-02-05T09:30:00Z").unwrap(),
        )
        .with_summary("Standup"),
        CalendarEvent::new(
            "b",
            EventTime::parse_rfc3339("2025-02-05T14:00:00Z").unwrap(),
            EventTime::parse_rfc3339("2025-02-05T15:00:00Z").unwrap(),
        )
        .with_summary("Board prep")
        .with_attendee("cfo@example.com")
        .with_attendee("ceo@example.com"),
        CalendarEvent::new(
            "c",
            EventTime::parse_date("2025-02-06").unwrap(),
            EventTime::parse_date("2025-02-07").unwrap(),
        )
        .with_summary("Conference"),
    ];
    let summaries: Vec<EventSummary> = events
        .iter()
        .map(|e| EventSummary::from_event(e, London))
        .collect();

    assert_eq!(
        render_event_list(&summaries),
        "\n  2025-02-05\n\
         \x20   09:00 - 09:30  Standup\n\
         \x20   14:00 - 15:00  Board prep (2 attendees)\n\
         \n  2025-02-06\n\
         \x20   All day  Conference\n"
    );
}

#[test]
fn golden_availability_json() {
    let availability = compute_free_busy(&window(), vec![slot(13, 0, 14, 0, "Lunch")]);
    let report = AvailabilityReport::new(&availability, reference_date(), London);

    insta::assert_json_snapshot!(report, @r#"
    {
      "date": "2025-02-05",
      "timezone": "Europe/London",
      "work_hours": {
        "start": "2025-02-05T09:00:00+00:00",
        "end": "2025-02-05T17:00:00+00:00"
      },
      "busy": [
        {
          "start": "2025-02-05T13:00:00+00:00",
          "end": "2025-02-05T14:00:00+00:00",
          "summary": "Lunch"
        }
      ],
      "free": [
        {
          "start": "2025-02-05T09:00:00+00:00",
          "end": "2025-02-05T13:00:00+00:00",
          "duration_minutes": 240
        },
        {
          "start": "2025-02-05T14:00:00+00:00",
          "end": "2025-02-05T17:00:00+00:00",
          "duration_minutes": 180
        }
      ]
    }
    "#);
}
