use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Speaker of one conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn in a conversation. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub message: String,
    /// File references attached to this turn, in upload order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_ids: Vec<String>,
}

impl Message {
    pub fn new<S: Into<String>>(role: Role, text: S) -> Self {
        Message {
            role,
            message: text.into(),
            file_ids: Vec::new(),
        }
    }

    /// Create a system message
    pub fn system<S: Into<String>>(text: S) -> Self {
        Message::new(Role::System, text)
    }

    /// Create a user message
    pub fn user<S: Into<String>>(text: S) -> Self {
        Message::new(Role::User, text)
    }

    /// Create an assistant message
    pub fn assistant<S: Into<String>>(text: S) -> Self {
        Message::new(Role::Assistant, text)
    }

    /// Attach file references to the message
    pub fn with_file_ids(mut self, file_ids: Vec<String>) -> Self {
        self.file_ids = file_ids;
        self
    }
}

/// A completion request: the conversation history, oldest turn first, plus
/// optional generation bounds and identity hints.
///
/// The identity hints are advisory. When present the server checks what the
/// named user (and channel) may access; when absent no identity-based check
/// is applied beyond the caller's own credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_generated_tokens: Option<u32>,
    /// JSON schema the completion should conform to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_output_format: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Channel context for the permission check; only meaningful together
    /// with `user_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        CompletionRequest {
            messages,
            ..CompletionRequest::default()
        }
    }

    /// Cap the number of tokens the service may generate
    pub fn with_max_generated_tokens(mut self, limit: u32) -> Self {
        self.max_generated_tokens = Some(limit);
        self
    }

    /// Request structured output matching the given JSON schema
    pub fn with_json_output_format(mut self, format: Map<String, Value>) -> Self {
        self.json_output_format = Some(format);
        self
    }

    /// Name the end user the request is made on behalf of
    pub fn with_user_id<S: Into<String>>(mut self, user_id: S) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Name the channel context the request originates from
    pub fn with_channel_id<S: Into<String>>(mut self, channel_id: S) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }
}

/// Body of a successful non-streaming completion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub completion: String,
}

/// Body the bridge returns alongside non-success statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use serde_json::json;

    #[test]
    fn test_request_round_trip_preserves_order_and_options() -> Result<()> {
        let request = CompletionRequest::new(vec![
            Message::system("be terse"),
            Message::user("hello").with_file_ids(vec!["f1".to_string(), "f2".to_string()]),
            Message::assistant("hi"),
            Message::user("and now?"),
        ])
        .with_max_generated_tokens(256)
        .with_user_id("u42")
        .with_channel_id("c7");

        let serialized = serde_json::to_string(&request)?;
        let deserialized: CompletionRequest = serde_json::from_str(&serialized)?;

        assert_eq!(request, deserialized);
        assert_eq!(
            deserialized
                .messages
                .iter()
                .map(|m| m.message.as_str())
                .collect::<Vec<_>>(),
            vec!["be terse", "hello", "hi", "and now?"]
        );
        assert_eq!(deserialized.messages[1].file_ids, vec!["f1", "f2"]);

        Ok(())
    }

    #[test]
    fn test_unset_options_are_absent_from_json() -> Result<()> {
        let request = CompletionRequest::new(vec![Message::user("hello")]);
        let value: Value = serde_json::from_str(&serde_json::to_string(&request)?)?;

        assert_eq!(
            value,
            json!({
                "messages": [{"role": "user", "message": "hello"}]
            })
        );

        Ok(())
    }

    #[test]
    fn test_roles_serialize_lowercase() -> Result<()> {
        let value = serde_json::to_value(Message::system("s"))?;
        assert_eq!(value["role"], json!("system"));
        let value = serde_json::to_value(Message::assistant("a"))?;
        assert_eq!(value["role"], json!("assistant"));
        Ok(())
    }

    #[test]
    fn test_json_output_format_round_trip() -> Result<()> {
        let schema = json!({"type": "object", "required": ["answer"]});
        let Value::Object(schema) = schema else {
            unreachable!()
        };

        let request =
            CompletionRequest::new(vec![Message::user("hello")]).with_json_output_format(schema);
        let deserialized: CompletionRequest =
            serde_json::from_str(&serde_json::to_string(&request)?)?;

        assert_eq!(request, deserialized);
        Ok(())
    }
}
