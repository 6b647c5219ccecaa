use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Ok,
    Error,
    Timeout,
}

/// What the transport observed, before any classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success { code: u16, elapsed: Duration },
    Timeout,
    TransportFailure { detail: String, elapsed: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResult {
    pub status: ProbeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResult {
    pub fn healthy(elapsed: Duration) -> Self {
        Self {
            status: ProbeStatus::Ok,
            code: Some(200),
            response_time: Some(elapsed_ms(elapsed)),
            message: "Service is healthy".to_string(),
            error: None,
        }
    }

    pub fn unexpected_status(code: u16, elapsed: Duration) -> Self {
        Self {
            status: ProbeStatus::Error,
            code: Some(code),
            response_time: Some(elapsed_ms(elapsed)),
            message: format!("Service status: {}", code),
            error: None,
        }
    }

    pub fn timed_out() -> Self {
        Self {
            status: ProbeStatus::Timeout,
            code: None,
            response_time: None,
            message: "Request timed out".to_string(),
            error: None,
        }
    }

    pub fn connection_failed(detail: String, elapsed: Duration) -> Self {
        Self {
            status: ProbeStatus::Error,
            code: None,
            response_time: Some(elapsed_ms(elapsed)),
            message: "Service connection failed".to_string(),
            error: Some(detail),
        }
    }
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
