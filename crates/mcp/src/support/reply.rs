#![forbid(unsafe_code)]

use serde_json::{Value, json};

/// What a tool hands back to the caller: always a single line of text.
///
/// Failures are replies too. The JSON-RPC call itself succeeds and `isError` tells the
/// client which kind of text it got.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ToolReply {
    pub(crate) text: String,
    pub(crate) is_error: bool,
}

impl ToolReply {
    pub(crate) fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub(crate) fn error(label: &str, err: &dyn std::fmt::Display) -> Self {
        Self {
            text: format!("{label}: {err}"),
            is_error: true,
        }
    }

    pub(crate) fn to_result(&self) -> Value {
        json!({
            "content": [{ "type": "text", "text": self.text }],
            "isError": self.is_error
        })
    }
}
