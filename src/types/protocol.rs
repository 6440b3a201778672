use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The wire contract used to carry conversation state to the relay.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum ProtocolVariant {
    /// Send only the latest user message as `{"query": ...}`.
    Stateless,

    /// Replay the whole transcript as `{"history": [...]}` on every request.
    #[default]
    Stateful,
}

impl fmt::Display for ProtocolVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVariant::Stateless => write!(f, "stateless"),
            ProtocolVariant::Stateful => write!(f, "stateful"),
        }
    }
}

impl FromStr for ProtocolVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stateless" | "query" => Ok(ProtocolVariant::Stateless),
            "stateful" | "history" => Ok(ProtocolVariant::Stateful),
            _ => Err(Error::validation(
                format!("unknown protocol variant {s:?}; expected stateless or stateful"),
                Some("protocol".to_string()),
            )),
        }
    }
}
