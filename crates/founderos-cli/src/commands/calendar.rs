//! Google Calendar commands.

use std::path::PathBuf;

use chrono::{Duration, Utc};
use chrono_tz::Tz;
use founderos_core::{
    AvailabilityReport, BusySlot, CalendarEvent, EventSummary, Interval, compute_free_busy,
    parse_date, parse_local_datetime, render_availability, render_event_list, work_window,
};
use founderos_google::{CalendarClient, EventQuery, NewEvent, Service};
use tracing::{debug, warn};

use super::auth::connect;
use super::write_json;
use crate::config::ClientConfig;
use crate::error::ClientResult;

async fn client(config: &ClientConfig) -> ClientResult<CalendarClient> {
    let api = connect(config, Service::Calendar).await?;
    Ok(CalendarClient::new(api, config.google.calendar_id.clone()))
}

/// List events from now until `days` ahead.
pub async fn list(
    config: &ClientConfig,
    tz: Tz,
    days: u32,
    max: usize,
    output: Option<PathBuf>,
) -> ClientResult<()> {
    let calendar = client(config).await?;

    println!("Fetching events for the next {days} days...");
    let now = Utc::now();
    let query = EventQuery::between(now, now + Duration::days(i64::from(days))).with_max_results(max);
    let events = calendar.list_events(&query).await?;

    if events.is_empty() {
        println!("No upcoming events found.");
        return Ok(());
    }

    let summaries: Vec<EventSummary> = events
        .iter()
        .map(|event| EventSummary::from_event(event, tz))
        .collect();
    print!("{}", render_event_list(&summaries));

    if let Some(file) = output {
        let path = write_json(&config.inbox_dir(), &file, &summaries)?;
        println!();
        println!("Saved {} events to {}", summaries.len(), path.display());
    }
    Ok(())
}

/// Options for [`create`] beyond the title and times.
#[derive(Debug, Default)]
pub struct EventDetails {
    pub description: String,
    pub location: String,
    pub attendees: Vec<String>,
}

pub async fn create(
    config: &ClientConfig,
    tz: Tz,
    title: &str,
    start: &str,
    end: Option<&str>,
    duration_minutes: i64,
    details: EventDetails,
) -> ClientResult<()> {
    let when = event_interval(start, end, duration_minutes, tz)?;
    let event = NewEvent::new(title, when.start(), when.end())
        .with_description(details.description)
        .with_location(details.location)
        .with_attendees(details.attendees.iter().cloned());

    let calendar = client(config).await?;
    let created = calendar.insert_event(&event).await?;

    println!("Event created: {title}");
    println!("  When: {}", format_when(&when, tz));
    if !details.attendees.is_empty() {
        println!("  Invites sent to: {}", details.attendees.join(", "));
    }
    if let Some(link) = created.html_link {
        println!("  Link: {link}");
    }
    Ok(())
}

/// Working-hours availability for `date`.
pub async fn availability(
    config: &ClientConfig,
    tz: Tz,
    date: &str,
    start_hour: Option<u32>,
    end_hour: Option<u32>,
    json: bool,
    output: Option<PathBuf>,
) -> ClientResult<()> {
    let date = parse_date(date)?;
    let start_hour = start_hour.unwrap_or(config.availability.start_hour);
    let end_hour = end_hour.unwrap_or(config.availability.end_hour);
    let window = work_window(date, start_hour, end_hour, tz)?;

    let calendar = client(config).await?;
    let events = calendar
        .list_events(&EventQuery::between(window.start(), window.end()))
        .await?;

    let availability = compute_free_busy(&window, busy_slots(&events, tz));
    let report = AvailabilityReport::new(&availability, date, tz);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Availability for {} ({:02}:00 - {:02}:00 {}):",
            date.format("%Y-%m-%d"),
            start_hour,
            end_hour,
            tz.name()
        );
        print!("{}", render_availability(&availability));
    }

    if let Some(file) = output {
        let path = write_json(&config.inbox_dir(), &file, &report)?;
        if !json {
            println!();
            println!("Saved to {}", path.display());
        }
    }
    Ok(())
}

pub async fn delete(config: &ClientConfig, event_id: &str) -> ClientResult<()> {
    let calendar = client(config).await?;
    calendar.delete_event(event_id).await?;
    println!("Event deleted: {event_id}");
    Ok(())
}

/// Busy slots for timed events. All-day events are left out, and so is
/// any event Google returns with its end before its start.
fn busy_slots(events: &[CalendarEvent], tz: Tz) -> Vec<BusySlot> {
    events
        .iter()
        .filter_map(|event| match event.busy_slot(tz) {
            Ok(Some(slot)) => Some(slot),
            Ok(None) => {
                debug!(id = %event.id, "ignoring all-day event");
                None
            }
            Err(e) => {
                warn!(id = %event.id, "ignoring event: {}", e);
                None
            }
        })
        .collect()
}

/// The event span from user input: `end` if given, else `start` plus
/// `duration_minutes`.
fn event_interval(
    start: &str,
    end: Option<&str>,
    duration_minutes: i64,
    tz: Tz,
) -> ClientResult<Interval> {
    let start = parse_local_datetime(start, tz)?;
    let interval = match end {
        Some(end) => Interval::new(start, parse_local_datetime(end, tz)?)?,
        None => Interval::from_duration(start, Duration::minutes(duration_minutes))?,
    };
    Ok(interval)
}

/// `YYYY-MM-DD HH:MM - HH:MM (Zone)`.
fn format_when(interval: &Interval, tz: Tz) -> String {
    format!(
        "{} - {} ({})",
        interval.start().format("%Y-%m-%d %H:%M"),
        interval.end().format("%H:%M"),
        tz.name()
    )
}
