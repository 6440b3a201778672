use serde::{Deserialize, Serialize};

use crate::types::{Role, Turn};

/// Speaker labels as they appear on the wire.
///
/// The relay speaks of the assistant as the `model`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    /// User role.
    User,

    /// Model role.
    Model,
}

impl From<Role> for WireRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => WireRole::User,
            Role::Assistant => WireRole::Model,
        }
    }
}

impl From<WireRole> for Role {
    fn from(role: WireRole) -> Self {
        match role {
            WireRole::User => Role::User,
            WireRole::Model => Role::Assistant,
        }
    }
}

/// A text fragment of a wire turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// A turn as carried in the `history` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTurn {
    pub role: WireRole,
    pub parts: Vec<Part>,
}

impl WireTurn {
    /// The text of all parts, concatenated in order.
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

impl From<&Turn> for WireTurn {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role().into(),
            parts: vec![Part {
                text: turn.text().to_string(),
            }],
        }
    }
}

impl From<&WireTurn> for Turn {
    fn from(turn: &WireTurn) -> Self {
        Turn::new(turn.role.into(), turn.text())
    }
}

/// Body of `POST /api/chat`.
///
/// Clients fill exactly one of the two fields.  The relay also accepts both,
/// treating `history` as context and `query` as the newest user message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The latest user message (stateless variant).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// The full transcript (stateful variant).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<WireTurn>>,
}

impl ChatRequest {
    /// Create a stateless request carrying only `query`.
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            history: None,
        }
    }

    /// Create a stateful request replaying `turns`.
    pub fn history(turns: &[Turn]) -> Self {
        Self {
            query: None,
            history: Some(turns.iter().map(WireTurn::from).collect()),
        }
    }

    /// The conversation this request describes, oldest first.
    pub fn turns(&self) -> Vec<Turn> {
        let mut turns: Vec<Turn> = self
            .history
            .iter()
            .flatten()
            .map(Turn::from)
            .collect();
        if let Some(query) = &self.query {
            turns.push(Turn::user(query.trim()));
        }
        turns
    }
}

/// Body of a 2xx reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
}

impl ChatResponse {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }
}

/// Body of a non-2xx reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn stateless_request_wire_shape() {
        let request = ChatRequest::query("Hello");
        assert_eq!(to_value(&request).unwrap(), json!({"query": "Hello"}));
    }

    #[test]
    fn stateful_request_wire_shape() {
        let turns = vec![
            Turn::user("Hello"),
            Turn::assistant("Hi there"),
            Turn::user("How are you?"),
        ];
        let request = ChatRequest::history(&turns);
        assert_eq!(
            to_value(&request).unwrap(),
            json!({
                "history": [
                    {"role": "user", "parts": [{"text": "Hello"}]},
                    {"role": "model", "parts": [{"text": "Hi there"}]},
                    {"role": "user", "parts": [{"text": "How are you?"}]}
                ]
            })
        );
        assert_eq!(request.turns(), turns);
    }

    #[test]
    fn combined_request_appends_query() {
        let request: ChatRequest = serde_json::from_value(json!({
            "query": "  and now?  ",
            "history": [
                {"role": "user", "parts": [{"text": "first"}]},
                {"role": "model", "parts": [{"text": "one"}, {"text": " two"}]}
            ]
        }))
        .unwrap();
        assert_eq!(
            request.turns(),
            vec![
                Turn::user("first"),
                Turn::assistant("one two"),
                Turn::user("and now?"),
            ]
        );
    }

    #[test]
    fn unknown_wire_role_is_rejected() {
        let result = serde_json::from_value::<ChatRequest>(json!({
            "history": [{"role": "assistant", "parts": [{"text": "x"}]}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn error_response_without_detail() {
        let body: ErrorResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(body.detail, None);

        let body: ErrorResponse =
            serde_json::from_str(r#"{"detail": "model unavailable"}"#).unwrap();
        assert_eq!(body.detail.as_deref(), Some("model unavailable"));
    }
}
