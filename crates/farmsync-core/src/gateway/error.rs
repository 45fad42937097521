use serde_json::Value;
use thiserror::Error;

use crate::util::compact_text;

/// Failures surfaced by the gateway.
///
/// Status codes are reported but never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// No response reached the client
    #[error("Network request failed: {0}")]
    Transport(String),
    /// Non-2xx response; `detail` is the server-provided message
    #[error("{detail}")]
    Server { status: u16, detail: String },
    /// 2xx response whose body is not the expected JSON
    #[error("Invalid response payload: {0}")]
    Decode(String),
    /// Request could not be built
    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl RequestError {
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Extract a human-readable detail from an error response body.
///
/// Understands `{"detail": ...}` style payloads and field-error maps
/// (`{"name": ["This field is required."]}`).
pub(crate) fn parse_api_error(status: u16, body: &str) -> String {
    if let Ok(Value::Object(payload)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message", "error_description", "error"] {
            if let Some(Value::String(message)) = payload.get(key) {
                return message.trim().to_string();
            }
        }

        let field_errors = payload
            .iter()
            .filter_map(|(field, value)| {
                let messages = render_messages(value);
                if messages.is_empty() {
                    None
                } else if field == "non_field_errors" {
                    Some(messages)
                } else {
                    Some(format!("{field}: {messages}"))
                }
            })
            .collect::<Vec<_>>();
        if !field_errors.is_empty() {
            return field_errors.join("; ");
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        compact_text(trimmed)
    }
}

fn render_messages(value: &Value) -> String {
    match value {
        Value::String(message) => message.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .map(render_messages)
            .filter(|message| !message.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_field_is_used_verbatim() {
        assert_eq!(
            parse_api_error(401, r#"{"detail": "Given token not valid for any token type"}"#),
            "Given token not valid for any token type"
        );
    }

    #[test]
    fn field_errors_are_flattened() {
        let detail = parse_api_error(
            400,
            r#"{"name": ["This field is required."], "non_field_errors": ["Duplicate."]}"#,
        );
        assert!(detail.contains("name: This field is required."));
        assert!(detail.contains("Duplicate."));
        assert!(!detail.contains("non_field_errors"));
    }

    #[test]
    fn raw_or_empty_bodies_fall_back() {
        assert_eq!(parse_api_error(502, "  Bad Gateway "), "Bad Gateway");
        assert_eq!(parse_api_error(500, ""), "HTTP 500");
    }

    #[test]
    fn server_error_displays_detail_only() {
        let error = RequestError::Server {
            status: 500,
            detail: "boom".to_string(),
        };
        assert_eq!(error.to_string(), "boom");
        assert_eq!(error.status(), Some(500));
    }
}
