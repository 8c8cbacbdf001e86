//! Base64url and RFC 822 helpers for Gmail `raw` payloads.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};

use crate::error::{GoogleError, GoogleResult};

/// Decodes Gmail body or attachment data. Gmail sends base64url, sometimes
/// padded; standard base64 is accepted as well.
pub fn decode_base64url(data: &str) -> GoogleResult<Vec<u8>> {
    let trimmed = data.trim().trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD.decode(data.trim()))
        .map_err(|e| GoogleError::invalid_response("invalid base64 data from Gmail").with_source(e))
}

pub fn encode_base64url(data: &[u8]) -> String {
    URL_SAFE.encode(data)
}

/// Escapes `& < > " '` for HTML text and attribute content.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Plain text to HTML: blank-line separated blocks become paragraphs,
/// remaining newlines become `<br>`.
pub fn text_to_html(text: &str) -> String {
    html_escape(text)
        .split("\n\n")
        .map(|p| format!("<p style=\"margin: 0 0 1em 0;\">{}</p>", p.replace('\n', "<br>\n")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Longest UTF-8 payload per encoded word; keeps each word under 75 chars.
const ENCODED_WORD_BYTES: usize = 45;

/// Strips CR and LF so a value cannot start a new header line.
pub fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// RFC 2047 `B` encoding for non-ASCII header text.
///
/// ASCII text is returned as-is. Otherwise the text is split on character
/// boundaries into `=?UTF-8?B?...?=` words joined by folding whitespace.
pub fn encode_header_text(value: &str) -> String {
    let value = header_value(value);
    if value.is_ascii() {
        return value;
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    for c in value.chars() {
        if chunk.len() + c.len_utf8() > ENCODED_WORD_BYTES {
            words.push(format!("=?UTF-8?B?{}?=", STANDARD.encode(&chunk)));
            chunk.clear();
        }
        chunk.push(c);
    }
    if !chunk.is_empty() {
        words.push(format!("=?UTF-8?B?{}?=", STANDARD.encode(&chunk)));
    }
    words.join("\r\n ")
}

/// An outgoing HTML message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftMessage {
    pub to: String,
    pub cc: Option<String>,
    pub subject: String,
    /// Plain text, converted with [`text_to_html`].
    pub body: String,
}

impl DraftMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            cc: None,
            subject: subject.into(),
            body: body.into(),
        }
    }

    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = Some(cc.into()).filter(|c| !c.is_empty());
        self
    }

    /// The RFC 822 text: headers, blank line, HTML body.
    pub fn to_rfc822(&self) -> String {
        let mut headers = format!("To: {}\r\n", header_value(&self.to));
        if let Some(cc) = &self.cc {
            headers.push_str(&format!("Cc: {}\r\n", header_value(cc)));
        }
        headers.push_str(&format!(
            "Subject: {}\r\nContent-Type: text/html; charset=UTF-8\r\n",
            encode_header_text(&self.subject)
        ));
        format!("{headers}\r\n{}", text_to_html(&self.body))
    }

    /// The base64url `raw` field expected by `drafts.create`.
    pub fn to_raw(&self) -> String {
        encode_base64url(self.to_rfc822().as_bytes())
    }
}
