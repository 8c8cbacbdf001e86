//! Calendar API v3 wire types and their conversion to core events.

use chrono::DateTime;
use chrono_tz::Tz;
use founderos_core::{CalendarEvent, EventTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Response from `events.list`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
    pub html_link: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub attendees: Vec<ApiAttendee>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date: Option<String>,
    pub date_time: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAttendee {
    pub email: Option<String>,
}

impl ApiEventTime {
    fn to_event_time(&self) -> Option<EventTime> {
        match (&self.date_time, &self.date) {
            (Some(dt), _) => EventTime::parse_rfc3339(dt)
                .map_err(|e| warn!("skipping unparseable dateTime {:?}: {}", dt, e))
                .ok(),
            (None, Some(date)) => EventTime::parse_date(date)
                .map_err(|e| warn!("skipping unparseable date {:?}: {}", date, e))
                .ok(),
            (None, None) => None,
        }
    }
}

impl ApiEvent {
    /// Converts to a [`CalendarEvent`]. Cancelled events and events with
    /// missing or unparseable times yield `None`.
    pub fn into_calendar_event(self) -> Option<CalendarEvent> {
        if self.status.as_deref() == Some("cancelled") {
            return None;
        }
        let id = self.id?;
        let (Some(start), Some(end)) = (
            self.start.as_ref().and_then(ApiEventTime::to_event_time),
            self.end.as_ref().and_then(ApiEventTime::to_event_time),
        ) else {
            warn!("event {} has no usable start/end, skipping", id);
            return None;
        };

        let mut event = CalendarEvent::new(id, start, end);
        event.summary = self.summary;
        event.description = self.description;
        event.location = self.location;
        event.html_link = self.html_link;
        event.attendees = self.attendees.into_iter().filter_map(|a| a.email).collect();
        Some(event)
    }
}

/// Body of `events.insert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub summary: String,
    pub start: NewEventTime,
    pub end: NewEventTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<NewAttendee>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEventTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAttendee {
    pub email: String,
}

impl NewEvent {
    /// A timed event between `start` and `end`, both in the same zone.
    pub fn new(summary: impl Into<String>, start: DateTime<Tz>, end: DateTime<Tz>) -> Self {
        let time = |dt: DateTime<Tz>| NewEventTime {
            date_time: dt.to_rfc3339(),
            time_zone: dt.timezone().name().to_string(),
        };
        Self {
            summary: summary.into(),
            start: time(start),
            end: time(end),
            description: None,
            location: None,
            attendees: Vec::new(),
        }
    }

    /// Empty strings are treated as absent.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into()).filter(|d| !d.is_empty());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into()).filter(|l| !l.is_empty());
        self
    }

    pub fn with_attendees<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attendees
            .extend(emails.into_iter().map(|email| NewAttendee { email: email.into() }));
        self
    }

    pub fn has_attendees(&self) -> bool {
        !self.attendees.is_empty()
    }
}
