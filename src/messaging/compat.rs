//! Outbound compatibility rewrites for the current host.
//!
//! The host does not accept `tool` messages, so a tool call goes out as a
//! `prompt` asking the host to make the call. The correlation contract is
//! unchanged: the response to the rewritten prompt answers the tool call.

use super::types::{PromptRequest, Request, ToolCall};
use serde_json::Value;

/// Rewrite a request into a form the host accepts.
pub fn adapt_for_host(request: Request) -> Request {
    match request {
        Request::Tool(call) => Request::Prompt(tool_call_as_prompt(&call)),
        other => other,
    }
}

/// Natural-language instruction asking the host to call a tool.
pub fn tool_call_as_prompt(call: &ToolCall) -> PromptRequest {
    let params = Value::Object(call.params.clone());
    PromptRequest {
        prompt: format!(
            "Please call the tool {} with the following parameters: {}",
            call.tool_name, params
        ),
    }
}
