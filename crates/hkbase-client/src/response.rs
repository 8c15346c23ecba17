//! Shared response validation.
//!
//! Every operation routes its `reqwest::Response` through [`validate`],
//! which splits it into a `(status, body)` pair: non-success statuses
//! become [`HkError::Server`] carrying the body text, success bodies are
//! JSON-decoded (an empty body decodes to JSON null, a non-JSON body is
//! kept as a JSON string).

use crate::error::HkError;
use serde_json::Value;

/// Validate a response already split into status and body text.
pub(crate) fn check(status: u16, body: &str) -> Result<Value, HkError> {
    if !(200..300).contains(&status) {
        return Err(HkError::Server {
            status,
            message: body.to_string(),
        });
    }

    if body.is_empty() {
        return Ok(Value::Null);
    }

    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(_) => Ok(Value::String(body.to_string())),
    }
}

/// Validate a response, yielding its status and JSON-decoded body.
pub(crate) async fn validate(response: reqwest::Response) -> Result<(u16, Value), HkError> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| HkError::wrap("could not read response body", e))?;

    let value = check(status, &body)?;
    Ok((status, value))
}
