// Public modules
pub mod envelope;
pub mod protocol;
pub mod turn;

// Re-exports
pub use envelope::{ChatRequest, ChatResponse, ErrorResponse, Part, WireRole, WireTurn};
pub use protocol::ProtocolVariant;
pub use turn::{Role, Turn};
