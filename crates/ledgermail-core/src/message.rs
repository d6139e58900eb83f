//! Message types shared by the compose flow

use serde::{Deserialize, Serialize};

/// The in-progress outgoing message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDraft {
    /// Recipient address, empty until resolved
    pub to: String,
    /// Sender address
    pub from: String,
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub body: String,
    /// Recipient public key, attached right before sending
    pub public_key: Option<String>,
}

impl MessageDraft {
    /// Reset every field to empty
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.to.is_empty() && self.from.is_empty() && self.subject.is_empty() && self.body.is_empty()
    }
}

/// Headers of a received message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeaders {
    /// Encoded sender, e.g. `<0x...@ropsten.ethereum>`
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default, rename = "reply-to")]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    /// Encoded recipient
    #[serde(default)]
    pub to: Option<String>,
}

/// A received message, used as the source of a reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub headers: Option<MessageHeaders>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Headers of an outbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundHeaders {
    pub from: String,
    #[serde(rename = "reply-to")]
    pub reply_to: String,
    pub to: String,
}

/// Message part of an outbound mail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub headers: OutboundHeaders,
    pub subject: String,
    pub body: String,
    #[serde(rename = "public-key")]
    pub public_key: String,
}

/// Sendable representation of a draft, encrypted by the sending service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMail {
    pub message: OutboundMessage,
    pub envelope: String,
    #[serde(rename = "encryption-method-name")]
    pub encryption_method_name: String,
    #[serde(rename = "content-type")]
    pub content_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_inbox_json() {
        let json = r#"{
            "headers": {
                "from": "<0x92d8f10248c6a3953cc3692a894655ad05d61efb@ropsten.ethereum>",
                "to": "<0xd5ab4ce3605cd590db609b6b5c8901fdb2ef7fe6@ropsten.ethereum>",
                "date": "2019-06-07T14:53:36Z",
                "message-id": "47eca011e32b52c71005ad8a8f75e1b44c92c99fd12e43bccfe571e3c2d13d2e9a826a550f5ff63b247af471@mailchain"
            },
            "subject": "Hello",
            "body": "hi there",
            "read": false
        }"#;

        let message: Message = serde_json::from_str(json).unwrap();
        let headers = message.headers.unwrap();
        assert!(headers.reply_to.is_none());
        assert_eq!(headers.date.as_deref(), Some("2019-06-07T14:53:36Z"));
        assert_eq!(message.subject.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_outbound_field_names() {
        let mail = OutboundMail {
            message: OutboundMessage {
                headers: OutboundHeaders {
                    from: "0xa".into(),
                    reply_to: "0xa".into(),
                    to: "0xb".into(),
                },
                subject: "s".into(),
                body: "b".into(),
                public_key: "0xkey".into(),
            },
            envelope: "0x01".into(),
            encryption_method_name: "aes256cbc".into(),
            content_type: "text/plain".into(),
        };

        let value = serde_json::to_value(&mail).unwrap();
        assert_eq!(value["message"]["headers"]["reply-to"], "0xa");
        assert_eq!(value["message"]["public-key"], "0xkey");
        assert_eq!(value["encryption-method-name"], "aes256cbc");
        assert_eq!(value["content-type"], "text/plain");
    }
}
