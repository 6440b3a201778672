//! Producing answers from a conversation.

use crate::error::{Error, Result};
use crate::types::{Role, Turn};

/// Computes the reply to a conversation whose last turn is from the user.
///
/// The relay hands over everything it knows about the conversation on every
/// call; implementations must not rely on state from earlier calls.
#[async_trait::async_trait]
pub trait Answerer: Send + Sync {
    async fn answer(&self, history: &[Turn]) -> Result<String>;
}

#[async_trait::async_trait]
impl<F> Answerer for F
where
    F: Fn(&[Turn]) -> Result<String> + Send + Sync,
{
    async fn answer(&self, history: &[Turn]) -> Result<String> {
        self(history)
    }
}

/// Confirms connectivity by echoing the newest user message back.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoAnswerer;

#[async_trait::async_trait]
impl Answerer for EchoAnswerer {
    async fn answer(&self, history: &[Turn]) -> Result<String> {
        let Some(latest) = history.last().filter(|t| t.role() == Role::User) else {
            return Err(Error::validation(
                "the conversation must end with a user turn",
                Some("history".to_string()),
            ));
        };
        tracing::debug!(transcript = %format_transcript(history), "echoing");
        Ok(format!(
            "Success! The backend is connected and received: '{}'",
            latest.text()
        ))
    }
}

/// Renders a conversation as `User: ...` / `Assistant: ...` lines.
pub fn format_transcript(history: &[Turn]) -> String {
    history
        .iter()
        .map(|turn| {
            let speaker = match turn.role() {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            format!("{speaker}: {}", turn.text())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
