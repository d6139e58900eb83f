//! Default address helpers and outbound mail generation

use crate::identicon;
use crate::message::{MessageDraft, OutboundHeaders, OutboundMail, OutboundMessage};
use crate::services::MailchainService;
use regex::Regex;
use std::sync::OnceLock;

/// Envelope version understood by the sending service
pub const ENVELOPE: &str = "0x01";

/// Encryption applied by the sending service
pub const ENCRYPTION_METHOD: &str = "aes256cbc";

pub const CONTENT_TYPE: &str = "text/plain; charset=\"UTF-8\"";

fn eth_address_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid address pattern"))
}

fn ens_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?\.)+(?:eth|xyz|luxe|kred|art|club|test)$")
            .expect("valid name pattern")
    })
}

/// Extract the address from `"Name <0xabc@ropsten.ethereum>"` or `"0xabc@ropsten.ethereum"`
pub fn parse_address_from_mailchain(encoded: &str) -> String {
    let inner = match (encoded.find('<'), encoded.rfind('>')) {
        (Some(start), Some(end)) if start < end => &encoded[start + 1..end],
        _ => encoded,
    };
    let inner = inner.trim();
    inner
        .split_once('@')
        .map_or(inner, |(address, _)| address)
        .trim()
        .to_string()
}

/// Built-in [`MailchainService`] for Ethereum addresses and ENS names
#[derive(Debug, Clone, Default)]
pub struct DefaultMailchain;

impl DefaultMailchain {
    pub fn new() -> Self {
        Self
    }
}

impl MailchainService for DefaultMailchain {
    fn generate_mail(&self, draft: &MessageDraft) -> OutboundMail {
        OutboundMail {
            message: OutboundMessage {
                headers: OutboundHeaders {
                    from: draft.from.clone(),
                    reply_to: draft.from.clone(),
                    to: draft.to.clone(),
                },
                subject: draft.subject.clone(),
                body: draft.body.clone(),
                public_key: draft.public_key.clone().unwrap_or_default(),
            },
            envelope: ENVELOPE.to_string(),
            encryption_method_name: ENCRYPTION_METHOD.to_string(),
            content_type: CONTENT_TYPE.to_string(),
        }
    }

    fn generate_identicon(&self, address: &str) -> String {
        if !self.validate_eth_address(address) {
            return String::new();
        }
        identicon::data_uri(address)
    }

    fn validate_ens_name(&self, value: &str) -> bool {
        ens_name_regex().is_match(value)
    }

    fn validate_eth_address(&self, value: &str) -> bool {
        eth_address_regex().is_match(value)
    }

    fn parse_address_from_mailchain(&self, encoded: &str) -> String {
        parse_address_from_mailchain(encoded)
    }
}
