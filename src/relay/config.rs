//! Configuration for the relay server.

use std::net::SocketAddr;

use arrrg_derive::CommandLine;

use crate::error::Error;

/// Address the relay listens on when none is given.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Command-line arguments for the relaychat-server tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct RelayArgs {
    /// Address to listen on.
    #[arrrg(optional, "Address to listen on (default: 127.0.0.1:8000)", "ADDR")]
    pub bind: Option<String>,
}

/// Resolved relay configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Socket address to bind.
    pub bind: SocketAddr,
}

impl RelayConfig {
    pub fn new() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
        }
    }

    /// Sets the bind address.
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<RelayArgs> for RelayConfig {
    type Error = Error;

    fn try_from(args: RelayArgs) -> Result<Self, Self::Error> {
        let bind = args.bind.as_deref().unwrap_or(DEFAULT_BIND);
        let bind = bind.parse::<SocketAddr>().map_err(|e| {
            Error::validation(
                format!("invalid bind address {bind:?}: {e}"),
                Some("bind".to_string()),
            )
        })?;
        Ok(RelayConfig { bind })
    }
}
