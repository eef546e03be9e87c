use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

use crate::error::ToolError;

/// Error result for tool failures
pub fn tool_error(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

/// Turns a facade result into a tool result: structured content on success,
/// an `isError` result carrying the message otherwise.
pub fn respond<T: Serialize>(
    tool: &str,
    result: Result<T, ToolError>,
) -> Result<CallToolResult, McpError> {
    match result {
        Ok(value) => {
            let json = serde_json::to_value(value)
                .map_err(|e| McpError::internal_error(e.to_string(), None))?;
            tracing::debug!(tool, "Tool succeeded");
            Ok(CallToolResult::structured(json))
        }
        Err(err) => {
            match &err {
                ToolError::OperationFailed { .. } | ToolError::AuthenticationFailed(_) => {
                    tracing::error!(tool, %err, "Tool failed")
                }
                _ => tracing::warn!(tool, %err, "Tool rejected"),
            }
            Ok(tool_error(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::error::EntityKind;

    fn as_json(result: CallToolResult) -> Value {
        serde_json::to_value(result).unwrap()
    }

    #[test]
    fn success_becomes_structured_content() {
        let json = as_json(respond("test", Ok(json!({"status": "success", "count": 2}))).unwrap());
        assert_eq!(json["structuredContent"]["count"], 2);
        assert_ne!(json["isError"], json!(true));
    }

    #[test]
    fn every_error_kind_becomes_an_error_result_with_its_message() {
        let errors = vec![
            ToolError::AuthenticationRequired,
            ToolError::AuthenticationFailed("Authentication failed - please try again".into()),
            ToolError::bad_request("Must provide either track_ids or indices to remove"),
            ToolError::InvalidIdentifier {
                kind: EntityKind::Track,
                id: "abc".into(),
            },
            ToolError::not_found(EntityKind::Artist, "777"),
            ToolError::failed("Track search failed", "Status 500: boom"),
        ];

        for err in errors {
            let expected = err.to_string();
            let json = as_json(respond::<Value>("test", Err(err)).unwrap());
            assert_eq!(json["isError"], json!(true));
            assert_eq!(json["content"][0]["type"], "text");
            assert_eq!(json["content"][0]["text"], expected.as_str());
        }
    }
}
