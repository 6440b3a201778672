// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod history;
pub mod observability;
pub mod relay;
pub mod types;

// Re-exports
pub use chat::{ChatClient, ChatView, SessionState, TurnOutcome};
pub use client::{ChatTransport, RelayClient};
pub use error::{Error, ErrorKind, FALLBACK_ERROR_MESSAGE, Result};
pub use history::HistoryStore;
pub use observability::register_biometrics;
pub use types::*;
