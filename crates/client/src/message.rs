//! Control messages from foreground pages.

use serde::{Deserialize, Serialize};

/// A recognised control command.
///
/// Payloads are JSON objects with a `type` field; anything else is not a
/// command and is ignored by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Leave WAITING now instead of waiting for old clients to close.
    SkipWaiting,
}

impl ControlMessage {
    /// Parse a message payload, returning `None` for anything unrecognised.
    pub fn parse(payload: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(payload.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_skip_waiting() {
        assert_eq!(ControlMessage::parse(&json!({"type": "SKIP_WAITING"})), Some(ControlMessage::SkipWaiting));
    }

    #[test]
    fn test_parse_ignores_extra_fields() {
        let payload = json!({"type": "SKIP_WAITING", "from": "/vendas"});
        assert_eq!(ControlMessage::parse(&payload), Some(ControlMessage::SkipWaiting));
    }

    #[test]
    fn test_parse_unrecognised() {
        assert_eq!(ControlMessage::parse(&json!({"type": "CLEAR_CACHE"})), None);
        assert_eq!(ControlMessage::parse(&json!({"kind": "SKIP_WAITING"})), None);
        assert_eq!(ControlMessage::parse(&json!("SKIP_WAITING")), None);
        assert_eq!(ControlMessage::parse(&serde_json::Value::Null), None);
    }

    #[test]
    fn test_serialize() {
        assert_eq!(serde_json::to_value(ControlMessage::SkipWaiting).unwrap(), json!({"type": "SKIP_WAITING"}));
    }
}
