//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// founderos - Gmail and Google Calendar from the terminal
#[derive(Debug, Parser)]
#[command(name = "founderos")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "FOUNDEROS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Time zone for calendar commands (IANA name, e.g. Europe/London)
    #[arg(long, global = true, env = "FOUNDEROS_TIMEZONE")]
    pub tz: Option<String>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch, draft and archive email
    Gmail {
        #[command(subcommand)]
        action: GmailAction,
    },

    /// List, create and delete events, and find free time
    Calendar {
        #[command(subcommand)]
        action: CalendarAction,
    },

    /// Interactive first-time setup
    Setup,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum GmailAction {
    /// Save matching emails as JSON in the inbox directory
    Fetch {
        /// Maximum number of emails
        #[arg(long = "max", short = 'n', default_value_t = 20)]
        max: u32,

        /// Gmail search query
        #[arg(long, short, default_value = "is:unread")]
        query: String,

        /// Output file name (default: YYYY-MM-DD-emails.json)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Create a draft
    Draft {
        /// Recipient address(es)
        #[arg(long)]
        to: String,

        #[arg(long)]
        subject: String,

        /// Plain text body, blank lines separate paragraphs
        #[arg(long)]
        body: String,

        /// Message id to reply to; the draft joins its thread
        #[arg(long)]
        reply_to: Option<String>,

        /// Comma-separated Cc addresses
        #[arg(long)]
        cc: Option<String>,
    },

    /// Remove messages from the inbox and mark them read
    Archive {
        /// Message ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Download every attachment of a message
    Attachments {
        /// Message id
        id: String,

        /// Output directory (default: <inbox>/attachments)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Sign in to Gmail
    Auth {
        /// Re-authenticate even if a valid token exists
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum CalendarAction {
    /// List upcoming events
    List {
        /// Days ahead to look
        #[arg(long, short, default_value_t = 7)]
        days: u32,

        /// Maximum number of events
        #[arg(long = "max", short = 'n', default_value_t = 20)]
        max: usize,

        /// Also write the events as JSON to this file in the inbox directory
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Create an event
    Create {
        #[arg(long)]
        title: String,

        /// Start, e.g. "2025-03-14 15:00" or "14/03/2025 15:00"
        #[arg(long)]
        start: String,

        /// End (default: start + duration)
        #[arg(long)]
        end: Option<String>,

        /// Duration in minutes when --end is not given
        #[arg(long, default_value_t = 60)]
        duration: i64,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        location: String,

        /// Attendee email addresses; they receive invitations
        #[arg(long, num_args = 1..)]
        attendees: Vec<String>,
    },

    /// Show busy and free time on a day
    Availability {
        /// Date (YYYY-MM-DD)
        date: String,

        /// First working hour (default from config, 9)
        #[arg(long)]
        start_hour: Option<u32>,

        /// Last working hour (default from config, 17)
        #[arg(long)]
        end_hour: Option<u32>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Also write the JSON result to this file in the inbox directory
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Delete an event
    Delete {
        event_id: String,
    },

    /// Sign in to Google Calendar
    Auth {
        /// Re-authenticate even if a valid token exists
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Dump,
    /// Check the configuration for errors
    Validate,
    /// Show configuration and data paths
    Path,
}
