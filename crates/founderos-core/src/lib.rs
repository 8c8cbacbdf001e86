//! Core types: availability sweep, time parsing, event summaries, formatting

pub mod availability;
pub mod error;
pub mod event;
pub mod format;
pub mod time;
pub mod tracing;

pub use availability::{
    Availability, BusySlot, DEFAULT_END_HOUR, DEFAULT_START_HOUR, compute_free_busy, work_window,
};
pub use error::{AvailabilityError, AvailabilityResult};
pub use event::{CalendarEvent, EventSummary};
pub use format::{
    AvailabilityReport, format_busy_line, format_free_line, render_availability,
    render_event_list, truncate_chars,
};
pub use time::{
    DEFAULT_TIMEZONE, EventTime, Interval, parse_date, parse_local_datetime, parse_timezone,
};
pub use crate::tracing::{TracingConfig, TracingError, init_tracing};
