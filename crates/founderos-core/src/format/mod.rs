//! Console and JSON rendering for availability and event listings.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::availability::{Availability, BusySlot};
use crate::event::EventSummary;
use crate::time::Interval;

#[cfg(test)]
mod golden_tests;

/// Printed when the free list is empty.
pub const NO_AVAILABILITY_TEXT: &str = "No availability in this time range.";

/// Formats an instant as `HH:MM`.
pub fn format_hm(dt: &DateTime<Tz>) -> String {
    dt.format("%H:%M").to_string()
}

/// `HH:MM - HH:MM (N min)`
pub fn format_free_line(interval: &Interval) -> String {
    format!(
        "{} - {} ({} min)",
        format_hm(&interval.start()),
        format_hm(&interval.end()),
        interval.duration_minutes()
    )
}

/// `HH:MM - HH:MM  label`
pub fn format_busy_line(slot: &BusySlot) -> String {
    let range = format!(
        "{} - {}",
        format_hm(&slot.interval.start()),
        format_hm(&slot.interval.end())
    );
    match slot.label.as_deref() {
        Some(label) => format!("{range}  {label}"),
        None => range,
    }
}

/// Renders the "Busy" and "Available" groups printed by the availability command.
pub fn render_availability(availability: &Availability) -> String {
    let mut out = String::new();

    if !availability.busy.is_empty() {
        out.push_str("\n  Busy:\n");
        for slot in &availability.busy {
            out.push_str(&format!("    {}\n", format_busy_line(slot)));
        }
    }

    if availability.free.is_empty() {
        out.push_str(&format!("\n  {NO_AVAILABILITY_TEXT}\n"));
    } else {
        out.push_str("\n  Available:\n");
        for interval in &availability.free {
            out.push_str(&format!("    {}\n", format_free_line(interval)));
        }
    }

    out
}

/// Renders events grouped under date headings.
pub fn render_event_list(events: &[EventSummary]) -> String {
    let mut out = String::new();
    let mut current_date: Option<&str> = None;

    for event in events {
        if current_date != Some(event.date.as_str()) {
            current_date = Some(event.date.as_str());
            out.push_str(&format!("\n  {}\n", event.date));
        }

        let attendees = match event.attendees.len() {
            0 => String::new(),
            n => format!(" ({n} attendees)"),
        };
        out.push_str(&format!("    {}  {}{}\n", event.time, event.summary, attendees));
    }

    out
}

/// Truncates to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// JSON form of an [`Availability`].
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityReport {
    pub date: String,
    pub timezone: String,
    pub work_hours: ReportInterval,
    pub busy: Vec<ReportBusy>,
    pub free: Vec<ReportFree>,
}

/// A plain `[start, end)` pair in RFC 3339.
#[derive(Debug, Clone, Serialize)]
pub struct ReportInterval {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportBusy {
    pub start: String,
    pub end: String,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportFree {
    pub start: String,
    pub end: String,
    pub duration_minutes: i64,
}

impl AvailabilityReport {
    pub fn new(availability: &Availability, date: NaiveDate, tz: Tz) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            timezone: tz.name().to_string(),
            work_hours: ReportInterval {
                start: availability.window.start().to_rfc3339(),
                end: availability.window.end().to_rfc3339(),
            },
            busy: availability
                .busy
                .iter()
                .map(|slot| ReportBusy {
                    start: slot.interval.start().to_rfc3339(),
                    end: slot.interval.end().to_rfc3339(),
                    summary: slot.label.clone(),
                })
                .collect(),
            free: availability
                .free
                .iter()
                .map(|iv| ReportFree {
                    start: iv.start().to_rfc3339(),
                    end: iv.end().to_rfc3339(),
                    duration_minutes: iv.duration_minutes(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_ascii() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
        assert_eq!(truncate_chars("hi", 5), "hi");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn truncate_multibyte() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
    }
}
