//! Google Calendar: listing, creating and deleting events.

mod client;
mod types;

pub use client::{CalendarClient, CreatedEvent, EventQuery};
pub use types::{ApiAttendee, ApiEvent, ApiEventTime, NewAttendee, NewEvent, NewEventTime};
