//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::{DEFAULT_RELAY_URL, DEFAULT_TIMEOUT};
use crate::error::Error;
use crate::types::ProtocolVariant;

/// Command-line arguments for the relaychat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the relay.
    #[arrrg(optional, "Relay base URL (default: $RELAYCHAT_URL or http://127.0.0.1:8000/)", "URL")]
    pub url: Option<String>,

    /// Wire protocol variant.
    #[arrrg(optional, "Protocol: stateful (replay history) or stateless (query only)", "PROTOCOL")]
    pub protocol: Option<String>,

    /// Request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Relay base URL; `None` defers to `RELAYCHAT_URL`.
    pub base_url: Option<String>,

    /// How conversation state travels to the relay.
    pub protocol: ProtocolVariant,

    /// Per-request timeout enforced by the HTTP client.
    pub timeout: Duration,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Base URL: from the environment
    /// - Protocol: stateful
    /// - Timeout: 60 seconds
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            base_url: None,
            protocol: ProtocolVariant::default(),
            timeout: DEFAULT_TIMEOUT,
            use_color: true,
        }
    }

    /// Sets the relay base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the protocol variant.
    pub fn with_protocol(mut self, protocol: ProtocolVariant) -> Self {
        self.protocol = protocol;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// The base URL requests will resolve against, for display.
    pub fn describe_base_url(&self) -> String {
        self.base_url.clone().unwrap_or_else(|| {
            std::env::var("RELAYCHAT_URL").unwrap_or_else(|_| DEFAULT_RELAY_URL.to_string())
        })
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = Error;

    fn try_from(args: ChatArgs) -> Result<Self, Self::Error> {
        let protocol = match args.protocol {
            Some(protocol) => protocol.parse()?,
            None => ProtocolVariant::default(),
        };
        let timeout = match args.timeout_secs {
            Some(0) => {
                return Err(Error::validation(
                    "timeout must be at least one second",
                    Some("timeout-secs".to_string()),
                ));
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };
        Ok(ChatConfig {
            base_url: args.url,
            protocol,
            timeout,
            use_color: !args.no_color,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert!(config.base_url.is_none());
        assert_eq!(config.protocol, ProtocolVariant::Stateful);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.use_color);
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::try_from(ChatArgs::default()).unwrap();
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            url: Some("http://relay.internal:9000/".to_string()),
            protocol: Some("stateless".to_string()),
            timeout_secs: Some(5),
            no_color: true,
        };
        let config = ChatConfig::try_from(args).unwrap();
        assert_eq!(
            config.base_url.as_deref(),
            Some("http://relay.internal:9000/")
        );
        assert_eq!(config.protocol, ProtocolVariant::Stateless);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.use_color);
    }

    #[test]
    fn config_from_args_rejects_bad_values() {
        let args = ChatArgs {
            protocol: Some("carrier-pigeon".to_string()),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::try_from(args).unwrap_err().is_validation());

        let args = ChatArgs {
            timeout_secs: Some(0),
            ..ChatArgs::default()
        };
        assert!(ChatConfig::try_from(args).unwrap_err().is_validation());
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_base_url("http://localhost:3000/")
            .with_protocol(ProtocolVariant::Stateless)
            .with_timeout(Duration::from_secs(10))
            .without_color();

        assert_eq!(config.base_url.as_deref(), Some("http://localhost:3000/"));
        assert_eq!(config.describe_base_url(), "http://localhost:3000/");
        assert_eq!(config.protocol, ProtocolVariant::Stateless);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(!config.use_color);
    }
}
