//! Google Calendar API v3 client.

use chrono::{DateTime, TimeZone};
use founderos_core::CalendarEvent;
use serde::Deserialize;
use tracing::debug;

use crate::api::ApiClient;
use crate::error::GoogleResult;

use super::types::{EventListResponse, NewEvent};

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Upper bound on `maxResults` per page accepted by `events.list`.
const MAX_PAGE_SIZE: usize = 2500;

/// Query for [`CalendarClient::list_events`].
#[derive(Debug, Clone)]
pub struct EventQuery {
    pub time_min: String,
    pub time_max: String,
    /// Stop after this many events. `None` fetches every page.
    pub max_results: Option<usize>,
}

impl EventQuery {
    pub fn between<Z: TimeZone>(time_min: DateTime<Z>, time_max: DateTime<Z>) -> Self
    where
        Z::Offset: std::fmt::Display,
    {
        Self {
            time_min: time_min.to_rfc3339(),
            time_max: time_max.to_rfc3339(),
            max_results: None,
        }
    }

    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }
}

/// A created event as returned by `events.insert`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    pub id: String,
    pub html_link: Option<String>,
}

/// Calendar operations on one calendar (usually `primary`).
#[derive(Debug, Clone)]
pub struct CalendarClient {
    api: ApiClient,
    calendar_id: String,
}

impl CalendarClient {
    pub fn new(api: ApiClient, calendar_id: impl Into<String>) -> Self {
        Self {
            api,
            calendar_id: calendar_id.into(),
        }
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            CALENDAR_API_BASE,
            urlencoding::encode(&self.calendar_id)
        )
    }

    /// Events overlapping the query window, recurring events expanded, ordered
    /// by start time. Follows `nextPageToken` until `max_results` is reached.
    pub async fn list_events(&self, query: &EventQuery) -> GoogleResult<Vec<CalendarEvent>> {
        if query.max_results == Some(0) {
            return Ok(Vec::new());
        }
        let url = self.events_url();
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page_size = query
                .max_results
                .map_or(MAX_PAGE_SIZE, |max| (max - events.len()).min(MAX_PAGE_SIZE));

            let mut request = self.api.get(&url).query(&[
                ("timeMin", query.time_min.as_str()),
                ("timeMax", query.time_max.as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
            ]);
            request = request.query(&[("maxResults", page_size.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: EventListResponse = self.api.send_json(request).await?;
            events.extend(page.items.into_iter().filter_map(|e| e.into_calendar_event()));

            if query.max_results.is_some_and(|max| events.len() >= max) {
                break;
            }
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        if let Some(max) = query.max_results {
            events.truncate(max);
        }
        debug!(count = events.len(), calendar = %self.calendar_id, "listed events");
        Ok(events)
    }

    /// Inserts an event. Attendees are emailed invitations.
    pub async fn insert_event(&self, event: &NewEvent) -> GoogleResult<CreatedEvent> {
        let send_updates = if event.has_attendees() { "all" } else { "none" };
        let request = self
            .api
            .post(&self.events_url())
            .query(&[("sendUpdates", send_updates)])
            .json(event);

        let created: CreatedEvent = self.api.send_json(request).await?;
        debug!(id = %created.id, "created event");
        Ok(created)
    }

    pub async fn delete_event(&self, event_id: &str) -> GoogleResult<()> {
        let url = format!("{}/{}", self.events_url(), urlencoding::encode(event_id));
        self.api.send_empty(self.api.delete(&url)).await?;
        debug!(id = %event_id, "deleted event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Service;
    use chrono::TimeZone;
    use chrono_tz::Europe::London;
    use std::time::Duration;

    fn client(calendar_id: &str) -> CalendarClient {
        let api = ApiClient::new(Service::Calendar, "token", Duration::from_secs(5)).unwrap();
        CalendarClient::new(api, calendar_id)
    }

    #[test]
    fn events_url_encodes_calendar_id() {
        assert_eq!(
            client("primary").events_url(),
            "https://www.googleapis.com/calendar/v3/calendars/primary/events"
        );
        assert_eq!(
            client("team@group.calendar.google.com").events_url(),
            "https://www.googleapis.com/calendar/v3/calendars/team%40group.calendar.google.com/events"
        );
    }

    #[test]
    fn query_uses_rfc3339_with_offset() {
        let start = London.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).unwrap();
        let end = London.with_ymd_and_hms(2025, 7, 1, 17, 0, 0).unwrap();
        let query = EventQuery::between(start, end).with_max_results(20);
        assert_eq!(query.time_min, "2025-07-01T09:00:00+01:00");
        assert_eq!(query.time_max, "2025-07-01T17:00:00+01:00");
        assert_eq!(query.max_results, Some(20));
    }

    #[test]
    fn created_event_parses() {
        let created: CreatedEvent = serde_json::from_str(
            r#"{"kind": "calendar#event", "id": "abc123", "htmlLink": "https://calendar.google.com/e/abc"}"#,
        )
        .unwrap();
        assert_eq!(created.id, "abc123");
        assert!(created.html_link.is_some());
    }
}
