//! Tool invocation envelopes and the end-to-end adapter.
//!
//! The orchestrator hands the adapter one [`ToolInvocation`]. The
//! adapter canonicalizes parameters, validates the ones it can validate
//! locally, calls the backend, classifies the outcome, and wraps the
//! verdict back into the [`ToolResponse`] envelope shape the
//! orchestrator expects. Bad input never reaches the backend: it is
//! classified locally as a terminal 400.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use telmo_core::Msisdn;

use crate::classifier::{classify, ActionStatus, ApiOutcome, Verdict};
use crate::params::{AdapterError, ToolParams};

/// The backend surface the adapter invokes. [`crate::BackendClient`]
/// is the production implementation; tests script their own.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// POST a JSON body to a backend path.
    async fn invoke(&self, path: &str, body: &Value) -> ApiOutcome;
}

/// One tool call as emitted by the agent orchestrator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    /// Action group the tool belongs to.
    pub action_group: String,
    /// Backend path the tool maps to, e.g. `/v1/transferMoney`.
    pub api_path: String,
    /// HTTP method; the backend surface is POST-only.
    #[serde(default = "default_method")]
    pub http_method: String,
    /// Envelope version echoed back in the response.
    #[serde(default = "default_message_version")]
    pub message_version: String,
    /// Parameters in list form: `[{"name": ..., "value": ...}]`.
    #[serde(default)]
    pub parameters: Option<Value>,
    /// Parameters in request-body form.
    #[serde(default)]
    pub request_body: Option<RequestBody>,
}

fn default_method() -> String {
    "POST".to_string()
}

fn default_message_version() -> String {
    "1.0".to_string()
}

/// The `requestBody` envelope: parameters keyed by content type.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestBody {
    /// Content-type to properties map; only `application/json` is read.
    #[serde(default)]
    pub content: std::collections::HashMap<String, ContentBody>,
}

/// One content-type entry inside a [`RequestBody`].
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBody {
    /// Parameter list for this content type.
    #[serde(default)]
    pub properties: Value,
}

impl ToolInvocation {
    /// Collect the invocation's parameters, whichever envelope form
    /// carried them, and canonicalize their names.
    #[must_use]
    pub fn params(&self) -> ToolParams {
        if let Some(body) = &self.request_body {
            if let Some(content) = body.content.get("application/json") {
                return ToolParams::from_payload(&content.properties);
            }
        }
        match &self.parameters {
            Some(payload) => ToolParams::from_payload(payload),
            None => ToolParams::default(),
        }
    }
}

/// The response envelope handed back to the orchestrator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    /// Envelope version, echoed from the invocation.
    pub message_version: String,
    /// The wrapped result.
    pub response: ToolResponseInner,
}

/// Inner response envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponseInner {
    /// Action group, echoed from the invocation.
    pub action_group: String,
    /// Api path, echoed from the invocation.
    pub api_path: String,
    /// HTTP method, echoed from the invocation.
    pub http_method: String,
    /// Status the classifier attributed to the call.
    pub http_status_code: u16,
    /// The verdict, JSON-encoded under `TEXT.body`.
    pub response_body: ResponseBody,
}

/// The `responseBody` wrapper: the verdict serialized as a string
/// under the `TEXT` content key.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseBody {
    /// Text content entry.
    #[serde(rename = "TEXT")]
    pub text: TextContent,
}

/// Text content holding the serialized verdict.
#[derive(Debug, Clone, Serialize)]
pub struct TextContent {
    /// The verdict as a JSON string.
    pub body: String,
}

/// Adapter wiring a [`BackendApi`] to the tool envelope contract.
pub struct ToolAdapter<A> {
    api: A,
}

impl<A: BackendApi> ToolAdapter<A> {
    /// Create an adapter over a backend API.
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Handle one tool invocation end to end.
    ///
    /// Never fails: parameter problems become a local terminal verdict
    /// and everything else is delegated to the classifier.
    pub async fn handle(&self, invocation: &ToolInvocation) -> ToolResponse {
        let verdict = match self.run(invocation).await {
            Ok(verdict) => verdict,
            Err(err) => rejection(&err),
        };
        envelope(invocation, &verdict)
    }

    async fn run(&self, invocation: &ToolInvocation) -> Result<Verdict, AdapterError> {
        let params = invocation.params();
        let body = build_request_body(&invocation.api_path, &params)?;

        tracing::debug!(
            api_path = %invocation.api_path,
            params = params.len(),
            "invoking backend tool"
        );
        let outcome = self.api.invoke(&invocation.api_path, &body).await;
        Ok(classify(&outcome))
    }
}

/// Validate the parameters each operation requires and produce the
/// backend request body. MSISDNs and amounts that cannot possibly be
/// accepted are rejected here, before any network call.
fn build_request_body(api_path: &str, params: &ToolParams) -> Result<Value, AdapterError> {
    let operation = api_path.rsplit('/').next().unwrap_or(api_path);
    match operation {
        "checkBalance" | "getSubscriptionRecommendation" => {
            require_msisdn(params, "phone_number")?;
        }
        "activateSubscription" => {
            require_msisdn(params, "phone_number")?;
            params.require("subscription_id")?;
        }
        "transferMoney" => {
            require_msisdn(params, "source_phone")?;
            require_msisdn(params, "target_phone")?;
            params.amount()?;
        }
        // Unknown operations are forwarded untouched; the backend's
        // 404 reaches the classifier like any other outcome.
        _ => {}
    }
    Ok(params.to_body())
}

fn require_msisdn(params: &ToolParams, name: &str) -> Result<(), AdapterError> {
    let raw = params.require(name)?;
    raw.parse::<Msisdn>()
        .map_err(|err| AdapterError::InvalidParameter {
            name: name.to_string(),
            reason: err.to_string(),
        })?;
    Ok(())
}

/// A locally-produced terminal verdict for input the backend would
/// reject anyway.
fn rejection(err: &AdapterError) -> Verdict {
    let mut details = serde_json::Map::new();
    details.insert("message".into(), Value::from(err.to_string()));
    Verdict {
        action_status: ActionStatus::Failed,
        should_retry: false,
        http_status_code: 400,
        details,
        response_body: None,
        error: None,
    }
}

fn envelope(invocation: &ToolInvocation, verdict: &Verdict) -> ToolResponse {
    // Serializing a Verdict cannot fail; fall back to a bare status on
    // principle rather than panic.
    let body = serde_json::to_string(verdict)
        .unwrap_or_else(|_| format!(r#"{{"actionStatus":"FAILED","shouldRetry":false,"httpStatusCode":{}}}"#, verdict.http_status_code));
    ToolResponse {
        message_version: invocation.message_version.clone(),
        response: ToolResponseInner {
            action_group: invocation.action_group.clone(),
            api_path: invocation.api_path.clone(),
            http_method: invocation.http_method.clone(),
            http_status_code: verdict.http_status_code,
            response_body: ResponseBody {
                text: TextContent { body },
            },
        },
    }
}
