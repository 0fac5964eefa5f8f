//! Wire types exchanged with the host frame.
//!
//! Outbound messages are what the embedded UI posts to its host; inbound
//! messages are what the host delivers back. Both are tagged by a `type`
//! field, and field names use the host's camelCase spelling.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque token linking one outbound request to its one inbound response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Mint a fresh, process-unique ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Current extents of the displayed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentExtent {
    pub height: u32,
    pub width: u32,
}

impl ContentExtent {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }
}

/// Payload of a `tool` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub tool_name: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

/// Payload of a `prompt` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

/// Payload of a `link` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRequest {
    pub url: String,
}

/// Request kinds that expect a correlated response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Tool,
    Prompt,
    Link,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Tool => f.write_str("tool"),
            RequestKind::Prompt => f.write_str("prompt"),
            RequestKind::Link => f.write_str("link"),
        }
    }
}

/// A typed outbound request, before a correlation ID is attached.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Tool(ToolCall),
    Prompt(PromptRequest),
    Link(LinkRequest),
}

impl Request {
    /// Ask the host to invoke a tool.
    pub fn tool(tool_name: impl Into<String>, params: Map<String, Value>) -> Self {
        Self::Tool(ToolCall {
            tool_name: tool_name.into(),
            params,
        })
    }

    /// Send a natural-language prompt to the host.
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self::Prompt(PromptRequest {
            prompt: prompt.into(),
        })
    }

    /// Ask the host to open a link.
    pub fn link(url: impl Into<String>) -> Self {
        Self::Link(LinkRequest { url: url.into() })
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Tool(_) => RequestKind::Tool,
            Request::Prompt(_) => RequestKind::Prompt,
            Request::Link(_) => RequestKind::Link,
        }
    }
}

/// Messages posted from the UI to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    /// The UI surface has initialized.
    #[serde(rename = "ui-lifecycle-iframe-ready")]
    Ready,
    /// The displayed content changed size.
    #[serde(rename = "ui-size-change")]
    SizeChange { payload: ContentExtent },
    #[serde(rename = "tool")]
    Tool {
        #[serde(rename = "messageId")]
        message_id: CorrelationId,
        payload: ToolCall,
    },
    #[serde(rename = "prompt")]
    Prompt {
        #[serde(rename = "messageId")]
        message_id: CorrelationId,
        payload: PromptRequest,
    },
    #[serde(rename = "link")]
    Link {
        #[serde(rename = "messageId")]
        message_id: CorrelationId,
        payload: LinkRequest,
    },
}

impl OutboundMessage {
    /// Attach a correlation ID to a request.
    pub fn request(message_id: CorrelationId, request: Request) -> Self {
        match request {
            Request::Tool(payload) => Self::Tool {
                message_id,
                payload,
            },
            Request::Prompt(payload) => Self::Prompt {
                message_id,
                payload,
            },
            Request::Link(payload) => Self::Link {
                message_id,
                payload,
            },
        }
    }

    /// Correlation ID, present only on request messages.
    pub fn message_id(&self) -> Option<&CorrelationId> {
        match self {
            Self::Ready | Self::SizeChange { .. } => None,
            Self::Tool { message_id, .. }
            | Self::Prompt { message_id, .. }
            | Self::Link { message_id, .. } => Some(message_id),
        }
    }

    /// Whether this is a one-way lifecycle notification.
    pub fn is_lifecycle(&self) -> bool {
        self.message_id().is_none()
    }
}

/// Body of a `ui-message-response`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResponsePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponsePayload {
    pub fn success(response: Value) -> Self {
        Self {
            response: Some(response),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            response: None,
            error: Some(error.into()),
        }
    }

    /// Split into the host's result or the host's error message.
    ///
    /// An empty error string is not an error. A missing response is `null`.
    pub fn into_outcome(self) -> Result<Value, String> {
        match self.error {
            Some(error) if !error.is_empty() => Err(error),
            _ => Ok(self.response.unwrap_or(Value::Null)),
        }
    }
}

/// Body of a `ui-lifecycle-iframe-render-data` push.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderDataPayload {
    #[serde(default)]
    pub render_data: Value,
}

/// Messages delivered from the host to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    /// Correlated answer to an earlier request.
    #[serde(rename = "ui-message-response")]
    Response {
        #[serde(rename = "messageId")]
        message_id: CorrelationId,
        #[serde(default)]
        payload: ResponsePayload,
    },
    /// Unsolicited initial render data.
    #[serde(rename = "ui-lifecycle-iframe-render-data")]
    RenderData {
        #[serde(default)]
        payload: RenderDataPayload,
    },
    /// Any other message type; ignored by the client.
    #[serde(other)]
    Unknown,
}

impl InboundMessage {
    pub fn response(message_id: CorrelationId, response: Value) -> Self {
        Self::Response {
            message_id,
            payload: ResponsePayload::success(response),
        }
    }

    pub fn error_response(message_id: CorrelationId, error: impl Into<String>) -> Self {
        Self::Response {
            message_id,
            payload: ResponsePayload::failure(error),
        }
    }

    pub fn render_data(render_data: Value) -> Self {
        Self::RenderData {
            payload: RenderDataPayload { render_data },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ready_wire_shape() {
        let value = serde_json::to_value(OutboundMessage::Ready).unwrap();
        assert_eq!(value, json!({ "type": "ui-lifecycle-iframe-ready" }));
    }

    #[test]
    fn test_size_change_wire_shape() {
        let msg = OutboundMessage::SizeChange {
            payload: ContentExtent::new(640, 360),
        };
        let value = serde_json::to_value(msg).unwrap();
        assert_eq!(
            value,
            json!({ "type": "ui-size-change", "payload": { "height": 640, "width": 360 } })
        );
    }

    #[test]
    fn test_request_wire_shape_uses_message_id() {
        let msg = OutboundMessage::request(CorrelationId::from("abc"), Request::link("https://x.test"));
        let value = serde_json::to_value(msg).unwrap();
        assert_eq!(
            value,
            json!({ "type": "link", "messageId": "abc", "payload": { "url": "https://x.test" } })
        );
    }

    #[test]
    fn test_tool_payload_is_camel_case() {
        let mut params = Map::new();
        params.insert("q".to_string(), json!("x"));
        let msg = OutboundMessage::request(CorrelationId::from("id-1"), Request::tool("search", params));
        let value = serde_json::to_value(msg).unwrap();
        assert_eq!(value["payload"]["toolName"], "search");
        assert_eq!(value["payload"]["params"]["q"], "x");
    }

    #[test]
    fn test_lifecycle_messages_have_no_message_id() {
        assert!(OutboundMessage::Ready.is_lifecycle());
        assert!(OutboundMessage::SizeChange {
            payload: ContentExtent::new(1, 1)
        }
        .is_lifecycle());
        let request = OutboundMessage::request(CorrelationId::new(), Request::prompt("hi"));
        assert!(!request.is_lifecycle());
        assert!(request.message_id().is_some());
    }

    #[test]
    fn test_correlation_ids_are_unique() {
        let a = CorrelationId::new();
        let b = CorrelationId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_decode_response() {
        let raw = r#"{"type":"ui-message-response","messageId":"m1","payload":{"response":{"ok":true}}}"#;
        let msg: InboundMessage = serde_json::from_str(raw).unwrap();
        match msg {
            InboundMessage::Response {
                message_id,
                payload,
            } => {
                assert_eq!(message_id.as_str(), "m1");
                assert_eq!(payload.into_outcome().unwrap(), json!({ "ok": true }));
            }
            other => panic!("expected response, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_error_response() {
        let raw = r#"{"type":"ui-message-response","messageId":"m1","payload":{"error":"denied"}}"#;
        let msg: InboundMessage = serde_json::from_str(raw).unwrap();
        let InboundMessage::Response { payload, .. } = msg else {
            panic!("expected response");
        };
        assert_eq!(payload.into_outcome().unwrap_err(), "denied");
    }

    #[test]
    fn test_empty_error_is_not_an_error() {
        let payload = ResponsePayload {
            response: Some(json!(1)),
            error: Some(String::new()),
        };
        assert_eq!(payload.into_outcome().unwrap(), json!(1));
    }

    #[test]
    fn test_missing_response_is_null() {
        assert_eq!(ResponsePayload::default().into_outcome().unwrap(), Value::Null);
    }

    #[test]
    fn test_decode_render_data() {
        let raw = r#"{"type":"ui-lifecycle-iframe-render-data","payload":{"renderData":{"title":"T"}}}"#;
        let msg: InboundMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg, InboundMessage::render_data(json!({ "title": "T" })));
    }

    #[test]
    fn test_decode_unknown_type() {
        let raw = r#"{"type":"ui-something-else"}"#;
        let msg: InboundMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(msg, InboundMessage::Unknown);
    }
}
