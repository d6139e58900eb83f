//! Reply prefill: quoted body, subject prefix and address swap

use crate::message::Message;
use crate::services::MailchainService;
use crate::state::ComposeState;

const RE_PREFIX: &str = "Re: ";

/// Prefix `"Re: "` unless the subject already starts with it
pub fn add_re_prefix(subject: &str) -> String {
    if subject.starts_with(RE_PREFIX) {
        subject.to_string()
    } else {
        format!("{}{}", RE_PREFIX, subject)
    }
}

/// Quote the headers and body of `message` for a reply.
///
/// Absent headers contribute nothing. Every body line is prefixed with `>`.
pub fn quote_body(message: &Message) -> String {
    let mut quoted = String::new();

    if let Some(headers) = &message.headers {
        if let Some(from) = headers.from.as_deref().filter(|v| !v.is_empty()) {
            quoted.push_str(&format!("\r\n\r\n>From: {}\r\n", from));
        }
        if let Some(reply_to) = headers.reply_to.as_deref().filter(|v| !v.is_empty()) {
            quoted.push_str(&format!(">Reply To: {}\r\n", reply_to));
        }
        if let Some(date) = headers.date.as_deref().filter(|v| !v.is_empty()) {
            quoted.push_str(&format!(">Date: {}\r\n", date));
        }
        if let Some(to) = headers.to.as_deref().filter(|v| !v.is_empty()) {
            quoted.push_str(&format!(">To: {}\r\n", to));
        }
    }

    if let Some(subject) = message.subject.as_deref().filter(|v| !v.is_empty()) {
        quoted.push_str(&format!(">Subject: {}\r\n>\r\n", subject));
    }

    if let Some(body) = message.body.as_deref().filter(|v| !v.is_empty()) {
        quoted.push('>');
        quoted.push_str(&body.replace("\r\n", "\r\n>"));
    }

    quoted
}

/// Prefill the draft from the message being replied to.
///
/// Does nothing unless the message carries headers. Returns whether the
/// draft was prefilled.
pub(crate) fn apply_reply_fields(
    state: &mut ComposeState,
    message: &Message,
    mailchain: &dyn MailchainService,
) -> bool {
    let Some(headers) = &message.headers else {
        return false;
    };

    state.draft.body = quote_body(message);

    let to = mailchain.parse_address_from_mailchain(headers.from.as_deref().unwrap_or_default());
    state.message_to_field = to.clone();
    state.current_recipient_value = to.clone();
    state.draft.to = to;

    state.draft.from = mailchain.parse_address_from_mailchain(headers.to.as_deref().unwrap_or_default());
    state.draft.subject = add_re_prefix(message.subject.as_deref().unwrap_or_default());
    true
}
