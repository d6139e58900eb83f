//! Compose configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Quiet period before a typed recipient is resolved
pub const DEFAULT_RECIPIENT_DEBOUNCE: Duration = Duration::from_millis(1500);

/// Troubleshooting page linked from send errors
pub const DEFAULT_HELP_URL: &str = "https://docs.mailchain.xyz/troubleshooting/common-inbox-errors";

/// Icon shown when no identicon can be generated for an address
pub const DEFAULT_FALLBACK_IDENTICON: &str = "assets/question-circle-regular.svg";

/// Compose behaviour configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Debounce window for recipient resolution
    #[serde(with = "millis")]
    pub recipient_debounce: Duration,
    /// Help link appended to send error messages
    pub help_url: String,
    /// Icon path used when the identicon generator returns nothing
    pub fallback_identicon: String,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            recipient_debounce: DEFAULT_RECIPIENT_DEBOUNCE,
            help_url: DEFAULT_HELP_URL.to_string(),
            fallback_identicon: DEFAULT_FALLBACK_IDENTICON.to_string(),
        }
    }
}

impl ComposeConfig {
    /// Override the debounce window
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.recipient_debounce = debounce;
        self
    }
}

/// Serialize durations as whole milliseconds
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ComposeConfig::default();
        assert_eq!(config.recipient_debounce, Duration::from_millis(1500));
        assert!(config.help_url.ends_with("common-inbox-errors"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ComposeConfig =
            serde_json::from_str(r#"{ "recipient_debounce": 250 }"#).unwrap();
        assert_eq!(config.recipient_debounce, Duration::from_millis(250));
        assert_eq!(config.fallback_identicon, DEFAULT_FALLBACK_IDENTICON);
    }
}
