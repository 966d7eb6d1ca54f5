//! Result classification: raw backend outcomes to retry verdicts.
//!
//! [`classify`] is pure and total. Every `(status code, body, transport
//! error)` combination produces exactly one [`Verdict`], and the same
//! input always produces the same verdict. The orchestrator acts on
//! `shouldRetry` alone; `details` is for the agent's reply to the user.

use serde::Serialize;
use serde_json::Value;

/// The raw outcome of one backend call, before classification.
///
/// `status_code` is the HTTP status, or a synthetic `502` when the
/// request never completed. `body` is the parsed JSON body if one was
/// returned. `error` carries the transport failure description.
#[derive(Debug, Clone)]
pub struct ApiOutcome {
    /// HTTP status code (synthetic 502 for transport failures).
    pub status_code: u16,
    /// Parsed response body, when the backend returned one.
    pub body: Option<Value>,
    /// Transport-level failure, when the call never completed.
    pub error: Option<String>,
}

impl ApiOutcome {
    /// An outcome that completed with a status and parsed body.
    #[must_use]
    pub fn http(status_code: u16, body: Option<Value>) -> Self {
        Self {
            status_code,
            body,
            error: None,
        }
    }

    /// An outcome for a request that never reached the backend.
    #[must_use]
    pub fn transport(error: impl Into<String>) -> Self {
        Self {
            status_code: 502,
            body: None,
            error: Some(error.into()),
        }
    }
}

/// Terminal disposition of the tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionStatus {
    /// The operation took effect.
    #[serde(rename = "COMPLETED")]
    Completed,
    /// The operation did not take effect.
    #[serde(rename = "FAILED")]
    Failed,
}

/// The classified verdict handed back to the agent orchestrator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// Whether the operation took effect.
    pub action_status: ActionStatus,
    /// Whether re-invoking the same call could plausibly succeed.
    pub should_retry: bool,
    /// HTTP status observed (synthetic 502 for transport failures).
    pub http_status_code: u16,
    /// Structured facts for the agent to phrase a reply from.
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub details: serde_json::Map<String, Value>,
    /// Raw body, preserved when it did not match the domain contract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<Value>,
    /// Transport failure description, when there was one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error codes whose cause is the request itself; retrying the
/// identical call cannot succeed.
const TERMINAL_ERROR_CODES: &[&str] = &[
    "account_not_found",
    "plan_not_found",
    "insufficient_balance",
    "invalid_transfer",
    "invalid_msisdn",
    "invalid_amount",
    "transaction_cancelled",
];

/// Message fragments used as a fallback when an error body carries no
/// `error_code`. Matched case-insensitively.
const TERMINAL_MESSAGE_HINTS: &[&str] = &[
    "not found",
    "insufficient",
    "invalid",
    "cannot transfer to yourself",
];

/// Classify one backend outcome into a verdict.
///
/// Rules, in order:
/// 1. Transport failure or 5xx status: `FAILED`, retry.
/// 2. 4xx with no domain-shaped body: `FAILED`, no retry.
/// 3. Body with `"status": "success"`: `COMPLETED`, no retry; the
///    body's structured fields become `details`.
/// 4. Body with `"status": "error"`: `FAILED`; retry only when the
///    cause is not recognizably the caller's request.
/// 5. Anything else: `FAILED`, no retry, raw body preserved.
#[must_use]
pub fn classify(outcome: &ApiOutcome) -> Verdict {
    if outcome.error.is_some() || outcome.status_code >= 500 {
        return Verdict {
            action_status: ActionStatus::Failed,
            should_retry: true,
            http_status_code: outcome.status_code,
            details: serde_json::Map::new(),
            response_body: outcome.body.clone(),
            error: outcome.error.clone(),
        };
    }

    let domain_status = outcome
        .body
        .as_ref()
        .and_then(|body| body.get("status"))
        .and_then(Value::as_str);

    match domain_status {
        Some("success") => Verdict {
            action_status: ActionStatus::Completed,
            should_retry: false,
            http_status_code: outcome.status_code,
            details: success_details(outcome.body.as_ref()),
            response_body: None,
            error: None,
        },
        Some("error") => {
            let body = outcome.body.as_ref();
            let code = body
                .and_then(|b| b.get("error_code"))
                .and_then(Value::as_str);
            let message = body.and_then(|b| b.get("message")).and_then(Value::as_str);
            let should_retry = !is_terminal_error(code, message);

            let mut details = serde_json::Map::new();
            if let Some(code) = code {
                details.insert("errorCode".into(), Value::from(code));
            }
            if let Some(message) = message {
                details.insert("message".into(), Value::from(message));
            }
            Verdict {
                action_status: ActionStatus::Failed,
                should_retry,
                http_status_code: outcome.status_code,
                details,
                response_body: None,
                error: None,
            }
        }
        // Covers both 4xx with a non-domain body and 2xx bodies that do
        // not match the contract. Neither is safely retryable.
        _ => Verdict {
            action_status: ActionStatus::Failed,
            should_retry: false,
            http_status_code: outcome.status_code,
            details: serde_json::Map::new(),
            response_body: outcome.body.clone(),
            error: None,
        },
    }
}

fn is_terminal_error(code: Option<&str>, message: Option<&str>) -> bool {
    if let Some(code) = code {
        return TERMINAL_ERROR_CODES.contains(&code);
    }
    if let Some(message) = message {
        let lowered = message.to_ascii_lowercase();
        return TERMINAL_MESSAGE_HINTS
            .iter()
            .any(|hint| lowered.contains(hint));
    }
    false
}

/// Copy the structured fields of a success body into verdict details,
/// dropping the envelope's own `status` marker.
fn success_details(body: Option<&Value>) -> serde_json::Map<String, Value> {
    let mut details = serde_json::Map::new();
    let Some(Value::Object(fields)) = body else {
        return details;
    };
    for (key, value) in fields {
        if key == "status" {
            continue;
        }
        details.insert(key.clone(), value.clone());
    }
    details
}
