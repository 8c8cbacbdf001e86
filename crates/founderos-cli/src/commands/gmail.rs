//! Gmail commands.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use founderos_core::truncate_chars;
use founderos_google::gmail::AttachmentRef;
use founderos_google::{DraftMessage, EmailRecord, GmailClient, Service};
use tracing::{info, warn};

use super::auth::connect;
use super::write_json;
use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Subjects are cut to this many characters in progress output.
const SUBJECT_DISPLAY_CHARS: usize = 50;

async fn client(config: &ClientConfig) -> ClientResult<GmailClient> {
    Ok(GmailClient::new(connect(config, Service::Gmail).await?))
}

/// Fetch messages matching `query` and save them to the inbox directory.
pub async fn fetch(
    config: &ClientConfig,
    tz: Tz,
    max: u32,
    query: &str,
    output: Option<PathBuf>,
) -> ClientResult<()> {
    let gmail = client(config).await?;

    println!("Fetching emails (query: {query})...");
    let refs = gmail.list_messages(query, max).await?;
    if refs.is_empty() {
        println!("No emails found.");
        return Ok(());
    }

    let mut records = Vec::with_capacity(refs.len());
    for message_ref in &refs {
        let record = EmailRecord::from(gmail.get_message(&message_ref.id).await?);
        println!("  - {}", subject_line(&record));
        records.push(record);
    }

    let today = Utc::now().with_timezone(&tz).date_naive();
    let file = output.unwrap_or_else(|| default_email_file(today));
    let path = write_json(&config.inbox_dir(), &file, &records)?;

    info!(count = records.len(), "saved emails");
    println!();
    println!("Saved {} emails to {}", records.len(), path.display());
    Ok(())
}

/// Save a draft, threaded under `reply_to` when given.
pub async fn draft(
    config: &ClientConfig,
    to: &str,
    subject: &str,
    body: &str,
    reply_to: Option<&str>,
    cc: Option<&str>,
) -> ClientResult<()> {
    let gmail = client(config).await?;

    let thread_id = match reply_to {
        Some(id) => Some(gmail.get_message(id).await?.thread_id),
        None => None,
    };

    let mut message = DraftMessage::new(to, subject, body);
    if let Some(cc) = cc {
        message = message.with_cc(cc);
    }

    let draft = gmail.create_draft(&message, thread_id.as_deref()).await?;
    println!("Draft created: {}", message.subject);
    println!("  Draft ID: {}", draft.id);
    if let Some(thread_id) = thread_id {
        println!("  Thread: {thread_id}");
    }
    Ok(())
}

pub async fn archive(config: &ClientConfig, ids: &[String]) -> ClientResult<()> {
    let gmail = client(config).await?;

    println!("Archiving {} email(s)...", ids.len());
    for id in ids {
        gmail.archive(id).await?;
        println!("  - Archived {id}");
    }
    println!();
    println!("Archived {} email(s).", ids.len());
    Ok(())
}

/// Download every attachment of message `id` into `output`, or
/// `<inbox>/attachments`.
pub async fn attachments(
    config: &ClientConfig,
    id: &str,
    output: Option<PathBuf>,
) -> ClientResult<()> {
    let gmail = client(config).await?;
    let dir = output.unwrap_or_else(|| config.inbox_dir().join("attachments"));

    println!("Fetching attachments for message {id}...");
    let message = gmail.get_message(id).await?;
    let found = message.payload.attachments();
    if found.is_empty() {
        println!("  No attachments found.");
        return Ok(());
    }

    std::fs::create_dir_all(&dir)?;
    let mut saved = 0;
    for attachment in &found {
        let Some(path) = attachment_path(&dir, attachment) else {
            warn!(filename = %attachment.filename, "skipping attachment without a usable name");
            continue;
        };
        let data = gmail.get_attachment(id, &attachment.attachment_id).await?;
        std::fs::write(&path, &data)?;
        println!("  - Saved: {} ({} bytes)", path.display(), data.len());
        saved += 1;
    }

    println!();
    println!("Downloaded {saved} attachment(s) to {}", dir.display());
    Ok(())
}

/// `YYYY-MM-DD-emails.json`.
fn default_email_file(date: NaiveDate) -> PathBuf {
    PathBuf::from(format!("{}-emails.json", date.format("%Y-%m-%d")))
}

fn subject_line(record: &EmailRecord) -> &str {
    let subject = if record.subject.is_empty() {
        "(no subject)"
    } else {
        record.subject.as_str()
    };
    truncate_chars(subject, SUBJECT_DISPLAY_CHARS)
}

/// Where an attachment is written: its bare file name inside `dir`.
fn attachment_path(dir: &Path, attachment: &AttachmentRef) -> Option<PathBuf> {
    attachment.safe_filename().map(|name| dir.join(name))
}
