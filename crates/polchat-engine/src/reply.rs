//! Interpretation of the backend's JSON reply.
//!
//! Two response shapes are understood:
//!
//! ```text
//! { "answer": "..." }
//! { "messages": [ { "role": "assistant", "text": "..." }, ... ] }
//! ```
//!
//! `answer` wins when both are present. Otherwise the first assistant-role
//! entry in `messages` with a string `text` is the reply.

use serde_json::Value;

/// Extract the assistant reply text from a response body.
pub fn parse_reply(body: &str) -> Result<String, ReplyError> {
    let value: Value = serde_json::from_str(body).map_err(ReplyError::Malformed)?;

    let Value::Object(fields) = value else {
        return Err(ReplyError::NotAnObject);
    };

    if let Some(Value::String(answer)) = fields.get("answer") {
        return Ok(answer.clone());
    }

    fields
        .get("messages")
        .and_then(Value::as_array)
        .and_then(|entries| {
            entries
                .iter()
                .filter(|entry| entry.get("role").and_then(Value::as_str) == Some("assistant"))
                .find_map(|entry| entry.get("text").and_then(Value::as_str))
        })
        .map(str::to_string)
        .ok_or(ReplyError::NoReply)
}

/// Reasons a response body could not be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    /// The body is not JSON.
    #[error("response is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The body is JSON but not an object.
    #[error("response is not a JSON object")]
    NotAnObject,

    /// Neither `answer` nor any assistant entry was present.
    #[error("response contains no answer")]
    NoReply,
}
