//! Gmail: fetching, drafting, archiving and attachment download.

mod client;
mod message;
mod mime;

pub use client::{ARCHIVE_LABELS, GmailClient};
pub use message::{
    AttachmentRef, Draft, EmailRecord, Header, MAX_BODY_CHARS, Message, MessagePart, MessageRef,
    PartBody,
};
pub use mime::{DraftMessage, decode_base64url, encode_base64url, html_escape, text_to_html};
