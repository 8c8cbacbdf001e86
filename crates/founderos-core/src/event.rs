//! Calendar event types.
//!
//! - [`CalendarEvent`]: an event as fetched from the calendar API
//! - [`EventSummary`]: the flattened, display-ready record written to JSON

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::availability::BusySlot;
use crate::error::AvailabilityResult;
use crate::time::{EventTime, Interval};

/// Title shown for events without a summary.
pub const UNTITLED_EVENT: &str = "(No title)";

/// Label given to busy slots whose event has no summary.
pub const UNLABELLED_BUSY: &str = "(busy)";

/// A calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub location: Option<String>,
    pub description: Option<String>,
    /// Attendee email addresses.
    pub attendees: Vec<String>,
    /// Link to the event in the Google Calendar web UI.
    pub html_link: Option<String>,
}

impl CalendarEvent {
    pub fn new(id: impl Into<String>, start: EventTime, end: EventTime) -> Self {
        Self {
            id: id.into(),
            summary: None,
            start,
            end,
            location: None,
            description: None,
            attendees: Vec::new(),
            html_link: None,
        }
    }

    /// Builder method to set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Builder method to add an attendee.
    pub fn with_attendee(mut self, email: impl Into<String>) -> Self {
        self.attendees.push(email.into());
        self
    }

    /// The summary, or [`UNTITLED_EVENT`].
    pub fn title(&self) -> &str {
        self.summary.as_deref().unwrap_or(UNTITLED_EVENT)
    }

    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }

    /// Converts a timed event into a busy slot in `tz`.
    ///
    /// All-day events yield `Ok(None)`: they do not block working hours.
    /// An event ending before it starts is an `InvalidInterval` error.
    pub fn busy_slot(&self, tz: Tz) -> AvailabilityResult<Option<BusySlot>> {
        let (Some(start), Some(end)) = (self.start.in_timezone(tz), self.end.in_timezone(tz))
        else {
            return Ok(None);
        };
        let label = self.summary.as_deref().unwrap_or(UNLABELLED_BUSY);
        Ok(Some(BusySlot::new(Interval::new(start, end)?).with_label(label)))
    }
}

/// Flattened view of a [`CalendarEvent`] for listing and JSON export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: String,
    pub summary: String,
    /// `YYYY-MM-DD` in the display zone.
    pub date: String,
    /// `HH:MM - HH:MM`, or `All day`.
    pub time: String,
    pub location: String,
    pub description: String,
    pub attendees: Vec<String>,
    pub link: String,
}

impl EventSummary {
    /// Formats an event for display in `tz`.
    pub fn from_event(event: &CalendarEvent, tz: Tz) -> Self {
        let time = match (event.start.in_timezone(tz), event.end.in_timezone(tz)) {
            (Some(start), Some(end)) => {
                format!("{} - {}", start.format("%H:%M"), end.format("%H:%M"))
            }
            _ => "All day".to_string(),
        };

        Self {
            id: event.id.clone(),
            summary: event.title().to_string(),
            date: event.start.date_in(tz).format("%Y-%m-%d").to_string(),
            time,
            location: event.location.clone().unwrap_or_default(),
            description: event.description.clone().unwrap_or_default(),
            attendees: event.attendees.clone(),
            link: event.html_link.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::London;

    fn timed(start: &str, end: &str) -> CalendarEvent {
        CalendarEvent::new(
            "evt1",
            EventTime::parse_rfc3339(start).unwrap(),
            EventTime::parse_rfc3339(end).unwrap(),
        )
    }

    #[test]
    fn busy_slot_from_timed_event() {
        let event = timed("2024-03-15T10:00:00Z", "2024-03-15T11:00:00Z").with_summary("Standup");
        let slot = event.busy_slot(London).unwrap().unwrap();
        assert_eq!(slot.interval.duration_minutes(), 60);
        assert_eq!(slot.label.as_deref(), Some("Standup"));
    }

    #[test]
    fn busy_slot_default_label() {
        let event = timed("2024-03-15T10:00:00Z", "2024-03-15T11:00:00Z");
        let slot = event.busy_slot(London).unwrap().unwrap();
        assert_eq!(slot.label.as_deref(), Some(UNLABELLED_BUSY));
    }

    #[test]
    fn all_day_event_is_not_busy() {
        let event = CalendarEvent::new(
            "evt2",
            EventTime::parse_date("2024-03-15").unwrap(),
            EventTime::parse_date("2024-03-16").unwrap(),
        );
        assert!(event.is_all_day());
        assert_eq!(event.busy_slot(London).unwrap(), None);
    }

    #[test]
    fn inverted_event_is_an_error() {
        let event = timed("2024-03-15T11:00:00Z", "2024-03-15T10:00:00Z");
        assert!(event.busy_slot(London).is_err());
    }

    #[test]
    fn summary_of_timed_event_uses_display_zone() {
        let event = timed("2024-07-01T09:00:00Z", "2024-07-01T09:30:00Z")
            .with_summary("Sync")
            .with_attendee("a@example.com")
            .with_attendee("b@example.com");
        let summary = EventSummary::from_event(&event, London);
        // London is on BST (UTC+1) in July.
        assert_eq!(summary.time, "10:00 - 10:30");
        assert_eq!(summary.date, "2024-07-01");
        assert_eq!(summary.summary, "Sync");
        assert_eq!(summary.attendees.len(), 2);
        assert_eq!(summary.location, "");
    }

    #[test]
    fn summary_of_all_day_event() {
        let event = CalendarEvent::new(
            "evt3",
            EventTime::parse_date("2024-03-15").unwrap(),
            EventTime::parse_date("2024-03-16").unwrap(),
        );
        let summary = EventSummary::from_event(&event, London);
        assert_eq!(summary.time, "All day");
        assert_eq!(summary.date, "2024-03-15");
        assert_eq!(summary.summary, UNTITLED_EVENT);
    }
}
