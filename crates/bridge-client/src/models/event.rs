use serde::{Deserialize, Serialize};

/// One unit of a push-delivered completion stream.
///
/// A stream is a sequence of `Text` fragments closed by exactly one `End` or
/// `Error`; nothing follows the terminal event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Incremental fragment of the generated text.
    Text(String),
    /// Generation finished normally.
    End,
    /// Generation failed; carries the server- or client-side cause.
    Error(String),
}

impl StreamEvent {
    /// Get the text fragment if this is a Text event
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StreamEvent::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this event terminates the stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::End | StreamEvent::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_wire_shape() -> Result<()> {
        assert_eq!(
            serde_json::to_string(&StreamEvent::Text("a".to_string()))?,
            r#"{"type":"text","value":"a"}"#
        );
        assert_eq!(serde_json::to_string(&StreamEvent::End)?, r#"{"type":"end"}"#);
        assert_eq!(
            serde_json::to_string(&StreamEvent::Error("boom".to_string()))?,
            r#"{"type":"error","value":"boom"}"#
        );
        Ok(())
    }

    #[test]
    fn test_decodes_from_wire() -> Result<()> {
        let event: StreamEvent = serde_json::from_str(r#"{"type":"text","value":"a"}"#)?;
        assert_eq!(event, StreamEvent::Text("a".to_string()));
        assert!(!event.is_terminal());
        assert_eq!(event.as_text(), Some("a"));

        let event: StreamEvent = serde_json::from_str(r#"{"type":"end"}"#)?;
        assert_eq!(event, StreamEvent::End);
        assert!(event.is_terminal());
        assert_eq!(event.as_text(), None);

        let event: StreamEvent = serde_json::from_str(r#"{"type":"error","value":"boom"}"#)?;
        assert_eq!(event, StreamEvent::Error("boom".to_string()));
        assert!(event.is_terminal());
        Ok(())
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(serde_json::from_str::<StreamEvent>(r#"{"type":"usage","value":3}"#).is_err());
    }
}
