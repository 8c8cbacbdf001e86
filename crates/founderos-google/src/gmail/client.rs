//! Gmail API v1 client for the signed-in user (`users/me`).

use serde_json::json;
use tracing::debug;

use crate::api::ApiClient;
use crate::error::GoogleResult;

use super::message::{AttachmentBody, Draft, Message, MessageList, MessageRef};
use super::mime::{DraftMessage, decode_base64url};

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// Largest page `messages.list` returns.
const MAX_PAGE_SIZE: u32 = 500;

/// Labels removed when archiving.
pub const ARCHIVE_LABELS: &[&str] = &["INBOX", "UNREAD"];

#[derive(Debug, Clone)]
pub struct GmailClient {
    api: ApiClient,
}

impl GmailClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Ids of up to `max_results` messages matching a Gmail search query.
    pub async fn list_messages(&self, query: &str, max_results: u32) -> GoogleResult<Vec<MessageRef>> {
        let url = format!("{GMAIL_API_BASE}/messages");
        let mut found = Vec::new();
        let mut page_token: Option<String> = None;

        while (found.len() as u32) < max_results {
            let page_size = (max_results - found.len() as u32).min(MAX_PAGE_SIZE);
            let mut request = self
                .api
                .get(&url)
                .query(&[("q", query)])
                .query(&[("maxResults", page_size)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let page: MessageList = self.api.send_json(request).await?;
            found.extend(page.messages);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        found.truncate(max_results as usize);
        debug!(count = found.len(), query, "listed messages");
        Ok(found)
    }

    /// A message with its full MIME tree.
    pub async fn get_message(&self, id: &str) -> GoogleResult<Message> {
        let url = format!("{GMAIL_API_BASE}/messages/{}", urlencoding::encode(id));
        let request = self.api.get(&url).query(&[("format", "full")]);
        self.api.send_json(request).await
    }

    /// Saves a draft, threaded under `thread_id` when replying.
    pub async fn create_draft(
        &self,
        message: &DraftMessage,
        thread_id: Option<&str>,
    ) -> GoogleResult<Draft> {
        let url = format!("{GMAIL_API_BASE}/drafts");
        let request = self.api.post(&url).json(&draft_body(message, thread_id));
        let draft: Draft = self.api.send_json(request).await?;
        debug!(id = %draft.id, "created draft");
        Ok(draft)
    }

    pub async fn modify_labels(
        &self,
        id: &str,
        add: &[&str],
        remove: &[&str],
    ) -> GoogleResult<()> {
        let url = format!("{GMAIL_API_BASE}/messages/{}/modify", urlencoding::encode(id));
        let body = json!({ "addLabelIds": add, "removeLabelIds": remove });
        self.api.send_empty(self.api.post(&url).json(&body)).await
    }

    /// Removes [`ARCHIVE_LABELS`] from a message.
    pub async fn archive(&self, id: &str) -> GoogleResult<()> {
        self.modify_labels(id, &[], ARCHIVE_LABELS).await
    }

    /// Downloads and decodes one attachment.
    pub async fn get_attachment(&self, message_id: &str, attachment_id: &str) -> GoogleResult<Vec<u8>> {
        let url = format!(
            "{GMAIL_API_BASE}/messages/{}/attachments/{}",
            urlencoding::encode(message_id),
            urlencoding::encode(attachment_id)
        );
        let body: AttachmentBody = self.api.send_json(self.api.get(&url)).await?;
        decode_base64url(&body.data)
    }
}

fn draft_body(message: &DraftMessage, thread_id: Option<&str>) -> serde_json::Value {
    let mut inner = json!({ "raw": message.to_raw() });
    if let Some(thread_id) = thread_id {
        inner["threadId"] = json!(thread_id);
    }
    json!({ "message": inner })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_body_without_thread() {
        let message = DraftMessage::new("a@example.com", "Hi", "Hello");
        let body = draft_body(&message, None);
        assert_eq!(body["message"]["raw"], json!(message.to_raw()));
        assert!(body["message"].get("threadId").is_none());
    }

    #[test]
    fn draft_body_in_thread() {
        let message = DraftMessage::new("a@example.com", "Re: Hi", "Hello");
        let body = draft_body(&message, Some("18c0"));
        assert_eq!(body["message"]["threadId"], json!("18c0"));
    }
}
