//! Relay Forwarder: device upload → cloud POST body, and outcome
//! classification.
//!
//! The device pushes a JSON object on the relay channel when it has data
//! to upload but no uplink of its own. We enrich the object with the
//! pre-shared API key and a connection-type marker, then hand the body to
//! the [`RelaySink`](crate::ports::RelaySink). Best effort end to end:
//! no retry, no queueing, outcomes are logged and forgotten.

use std::fmt;

use serde_json::Value;

use crate::config::ControllerConfig;

/// Relay payload preparation failure. The offending payload is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The payload parsed as JSON but is not an object, so the enrichment
    /// keys have nowhere to go.
    NotAnObject,
    /// The payload is not valid JSON.
    Invalid(String),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "payload is not a JSON object"),
            Self::Invalid(detail) => write!(f, "payload is not valid JSON: {detail}"),
        }
    }
}

/// Parse the device payload, inject `apiKey` and `connectionType`, and
/// re-serialize. Device-supplied keys of the same name are overwritten.
pub fn prepare_payload(text: &str, config: &ControllerConfig) -> Result<String, RelayError> {
    let mut value: Value =
        serde_json::from_str(text).map_err(|e| RelayError::Invalid(e.to_string()))?;
    let Some(object) = value.as_object_mut() else {
        return Err(RelayError::NotAnObject);
    };
    object.insert("apiKey".into(), Value::String(config.relay_api_key.clone()));
    object.insert(
        "connectionType".into(),
        Value::String(config.connection_type.clone()),
    );
    Ok(value.to_string())
}

/// Classified result of one relay POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// 200 or 201.
    Accepted(u16),
    /// Any other status; `body` carries the response body or a
    /// placeholder when the server sent none.
    Rejected { status: u16, body: String },
    /// The request never produced a status (DNS, TLS, connect, timeout).
    TransportError(String),
}

/// Classify an HTTP status and optional response body.
pub fn classify(status: u16, body: Option<&str>) -> RelayOutcome {
    match status {
        200 | 201 => RelayOutcome::Accepted(status),
        _ => RelayOutcome::Rejected {
            status,
            body: match body {
                Some(b) if !b.is_empty() => b.to_owned(),
                _ => "<no body>".to_owned(),
            },
        },
    }
}
