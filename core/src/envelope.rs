//! The `{status, message, value}` wrapper every endpoint answers with.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Envelope status discriminator. Only `OK` counts as success; an absent
/// or unrecognised status is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    #[default]
    #[serde(rename = "FAILED", other)]
    Failed,
}

/// Uniform response wrapper.
///
/// `value` stays untyped until `into_value` decodes it against the record
/// the caller asked for. Form validation failures also carry an `errors`
/// object; it is kept for debugging but never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerResponse {
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
}

impl ServerResponse {
    /// Parse an envelope from a raw response body.
    pub fn from_body(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Unwrap the envelope: `OK` yields `value` decoded as `T` (a missing
    /// `value` decodes as `null`), anything else yields `ApiError::Failed`
    /// with the server's message.
    pub fn into_value<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self.status {
            Status::Ok => serde_json::from_value(self.value.unwrap_or(Value::Null))
                .map_err(|e| ApiError::Deserialization(e.to_string())),
            Status::Failed => Err(ApiError::Failed {
                message: self.message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_yields_value() {
        let env = ServerResponse::from_body(r#"{"status":"OK","value":[1,2,3]}"#).unwrap();
        let v: Vec<u32> = env.into_value().unwrap();
        assert_eq!(v, vec![1, 2, 3]);
    }

    #[test]
    fn failed_envelope_yields_message() {
        let env = ServerResponse::from_body(r#"{"status":"FAILED","message":"bad"}"#).unwrap();
        let err = env.into_value::<Value>().unwrap_err();
        assert_eq!(err.to_string(), "bad");
    }

    #[test]
    fn failed_envelope_keeps_form_errors() {
        let env = ServerResponse::from_body(
            r#"{"status":"FAILED","message":"Failed to create the item","errors":{"title":[{"message":"required"}]}}"#,
        )
        .unwrap();
        assert_eq!(env.status, Status::Failed);
        assert!(env.errors.is_some());
    }

    #[test]
    fn missing_value_decodes_as_null() {
        let env = ServerResponse::from_body(r#"{"status":"OK"}"#).unwrap();
        let v: Option<u32> = env.into_value().unwrap();
        assert!(v.is_none());
    }

    #[test]
    fn any_status_but_ok_fails_with_the_message() {
        for body in [
            r#"{"status":"ERROR","message":"bad"}"#,
            r#"{"status":"ok","message":"bad"}"#,
            r#"{"message":"bad"}"#,
        ] {
            let env = ServerResponse::from_body(body).unwrap();
            assert_eq!(env.status, Status::Failed, "{body}");
            let err = env.into_value::<Value>().unwrap_err();
            assert!(matches!(err, ApiError::Failed { .. }), "{body}");
            assert_eq!(err.message(), Some("bad"), "{body}");
        }
    }

    #[test]
    fn value_shape_mismatch_is_a_deserialization_error() {
        let env = ServerResponse::from_body(r#"{"status":"OK","value":"nope"}"#).unwrap();
        let err = env.into_value::<Vec<u32>>().unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
