//! Gmail message resources and the records written to the inbox.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::mime::decode_base64url;

/// Plain-text bodies are cut to this many characters in [`EmailRecord`].
pub const MAX_BODY_CHARS: usize = 5000;

/// Response from `messages.list`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessageList {
    #[serde(default)]
    pub messages: Vec<MessageRef>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
}

/// A message in `format=full`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub label_ids: Vec<String>,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub payload: MessagePart,
}

/// A node of the MIME tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePart {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: PartBody,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartBody {
    pub data: Option<String>,
    pub attachment_id: Option<String>,
    #[serde(default)]
    pub size: u64,
}

/// Reference to a downloadable attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub filename: String,
    pub attachment_id: String,
    pub mime_type: String,
    pub size: u64,
}

impl AttachmentRef {
    /// The filename without any directory components, or `None` if
    /// nothing safe remains.
    pub fn safe_filename(&self) -> Option<&str> {
        let name = self
            .filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();
        (!name.is_empty() && name != "." && name != "..").then_some(name)
    }
}

impl MessagePart {
    /// First header named `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    fn decoded_data(&self) -> Option<String> {
        let data = self.body.data.as_deref().filter(|d| !d.is_empty())?;
        match decode_base64url(data) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                warn!("skipping undecodable {} body: {}", self.mime_type, e);
                None
            }
        }
    }

    /// The top-level body when present, else the first `text/plain` part
    /// found depth-first.
    pub fn plain_text_body(&self) -> Option<String> {
        self.decoded_data().or_else(|| self.find_text_plain())
    }

    fn find_text_plain(&self) -> Option<String> {
        self.parts.iter().find_map(|part| {
            if part.mime_type.eq_ignore_ascii_case("text/plain")
                && let Some(text) = part.decoded_data()
            {
                return Some(text);
            }
            part.find_text_plain()
        })
    }

    /// Every part below this one carrying a filename and attachment id.
    pub fn attachments(&self) -> Vec<AttachmentRef> {
        let mut found = Vec::new();
        self.collect_attachments(&mut found);
        found
    }

    fn collect_attachments(&self, found: &mut Vec<AttachmentRef>) {
        for part in &self.parts {
            if !part.filename.is_empty()
                && let Some(id) = &part.body.attachment_id
            {
                found.push(AttachmentRef {
                    filename: part.filename.clone(),
                    attachment_id: id.clone(),
                    mime_type: part.mime_type.clone(),
                    size: part.body.size,
                });
            }
            part.collect_attachments(found);
        }
    }
}

/// Response from `messages.attachments.get`.
#[derive(Debug, Deserialize)]
pub(crate) struct AttachmentBody {
    pub data: String,
}

/// Response from `drafts.create`.
#[derive(Debug, Clone, Deserialize)]
pub struct Draft {
    pub id: String,
    #[serde(default)]
    pub message: Option<MessageRef>,
}

/// Flattened message as saved to the inbox JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    pub id: String,
    pub thread_id: String,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: String,
    pub snippet: String,
    pub body: String,
    pub labels: Vec<String>,
}

impl From<Message> for EmailRecord {
    fn from(message: Message) -> Self {
        let header = |name| message.payload.header(name).unwrap_or_default().to_string();
        let body = message.payload.plain_text_body().unwrap_or_default();

        Self {
            from: header("From"),
            to: header("To"),
            subject: header("Subject"),
            date: header("Date"),
            body: founderos_core::truncate_chars(&body, MAX_BODY_CHARS).to_string(),
            id: message.id,
            thread_id: message.thread_id,
            snippet: message.snippet,
            labels: message.label_ids,
        }
    }
}
