//! Tool-call parameter canonicalization and typed extraction.
//!
//! Agents are loose with parameter names (`phoneNumber`, `customerId`,
//! `sourcePhone`, ...). The backend contract is strict snake_case. The
//! fixed table below is the only place synonyms are tolerated; the
//! ledger never sees them.

use std::collections::BTreeMap;

use serde_json::Value;

/// Canonicalization table: synonym -> canonical backend name.
/// First match wins; canonical names map to themselves implicitly.
const SYNONYMS: &[(&str, &str)] = &[
    ("phoneNumber", "phone_number"),
    ("customerId", "phone_number"),
    ("msisdn", "phone_number"),
    ("sourcePhone", "source_phone"),
    ("targetPhone", "target_phone"),
    ("subscriptionId", "subscription_id"),
    ("planId", "subscription_id"),
    ("plan_id", "subscription_id"),
];

/// Errors raised while extracting tool parameters, before any backend
/// call is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdapterError {
    /// A required invocation field is absent.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A required tool parameter is absent after canonicalization.
    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    /// A parameter value has the wrong shape.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Canonical parameter name.
        name: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// Canonicalized tool-call parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolParams(BTreeMap<String, String>);

impl ToolParams {
    /// Build canonicalized parameters from an agent invocation payload.
    ///
    /// Accepts either the action-group list form
    /// `[{"name": ..., "value": ...}, ...]` or a plain JSON object.
    /// Non-string scalar values are stringified; nested values are
    /// ignored.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Self {
        let mut params = BTreeMap::new();
        match payload {
            Value::Array(entries) => {
                for entry in entries {
                    let (Some(name), Some(value)) = (entry.get("name"), entry.get("value")) else {
                        continue;
                    };
                    if let (Some(name), Some(value)) = (name.as_str(), scalar_to_string(value)) {
                        params.insert(canonical_name(name).to_string(), value);
                    }
                }
            }
            Value::Object(map) => {
                for (name, value) in map {
                    if let Some(value) = scalar_to_string(value) {
                        params.insert(canonical_name(name).to_string(), value);
                    }
                }
            }
            _ => {}
        }
        Self(params)
    }

    /// Look up a parameter by canonical name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// A parameter that must be present and non-empty.
    ///
    /// # Errors
    ///
    /// [`AdapterError::MissingParameter`] when absent or empty.
    pub fn require(&self, name: &str) -> Result<&str, AdapterError> {
        match self.get(name) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(AdapterError::MissingParameter(name.to_string())),
        }
    }

    /// The `amount` parameter as a whole number of francs.
    ///
    /// # Errors
    ///
    /// Missing amount, non-numeric input, or a fractional value.
    pub fn amount(&self) -> Result<i64, AdapterError> {
        let raw = self.require("amount")?;
        if let Ok(amount) = raw.parse::<i64>() {
            return Ok(amount);
        }
        // Agents sometimes send "1500.0"; accept it as 1500 but reject
        // real fractions, which no backend amount can represent.
        match raw.parse::<f64>() {
            Ok(value) if value.fract() == 0.0 && value.abs() < 9e15 => {
                #[allow(clippy::cast_possible_truncation)]
                Ok(value as i64)
            }
            Ok(_) => Err(AdapterError::InvalidParameter {
                name: "amount".into(),
                reason: "must be a whole number of francs".into(),
            }),
            Err(_) => Err(AdapterError::InvalidParameter {
                name: "amount".into(),
                reason: "must be numeric".into(),
            }),
        }
    }

    /// Render the parameters as the JSON object sent to the backend.
    /// `amount` is emitted as a number when it parses as one.
    #[must_use]
    pub fn to_body(&self) -> Value {
        let mut body = serde_json::Map::new();
        for (name, value) in &self.0 {
            if name == "amount" {
                if let Ok(amount) = self.amount() {
                    body.insert(name.clone(), Value::from(amount));
                    continue;
                }
            }
            body.insert(name.clone(), Value::String(value.clone()));
        }
        Value::Object(body)
    }

    /// Number of parameters present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no parameters are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn canonical_name(name: &str) -> &str {
    SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == name)
        .map_or(name, |(_, canonical)| canonical)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canonicalizes_action_group_list() {
        let payload = json!([
            {"name": "sourcePhone", "type": "string", "value": "771234567"},
            {"name": "targetPhone", "type": "string", "value": "781234567"},
            {"name": "amount", "type": "number", "value": 500}
        ]);
        let params = ToolParams::from_payload(&payload);
        assert_eq!(params.get("source_phone"), Some("771234567"));
        assert_eq!(params.get("target_phone"), Some("781234567"));
        assert_eq!(params.amount().unwrap(), 500);
    }

    #[test]
    fn canonicalizes_object_payload() {
        let payload = json!({"customerId": "771234567", "planId": "F_D_1GB"});
        let params = ToolParams::from_payload(&payload);
        assert_eq!(params.get("phone_number"), Some("771234567"));
        assert_eq!(params.get("subscription_id"), Some("F_D_1GB"));
    }

    #[test]
    fn canonical_names_pass_through() {
        let payload = json!({"phone_number": "771234567"});
        let params = ToolParams::from_payload(&payload);
        assert_eq!(params.get("phone_number"), Some("771234567"));
    }

    #[test]
    fn require_rejects_missing_and_empty() {
        let params = ToolParams::from_payload(&json!({"phone_number": ""}));
        assert!(matches!(
            params.require("phone_number"),
            Err(AdapterError::MissingParameter(_))
        ));
        assert!(matches!(
            params.require("amount"),
            Err(AdapterError::MissingParameter(_))
        ));
    }

    #[test]
    fn amount_accepts_integers_and_trailing_zero_fractions() {
        let params = ToolParams::from_payload(&json!({"amount": "1500"}));
        assert_eq!(params.amount().unwrap(), 1500);
        let params = ToolParams::from_payload(&json!({"amount": "1500.0"}));
        assert_eq!(params.amount().unwrap(), 1500);
        let params = ToolParams::from_payload(&json!({"amount": -5}));
        assert_eq!(params.amount().unwrap(), -5);
    }

    #[test]
    fn amount_rejects_fractions_and_garbage() {
        let params = ToolParams::from_payload(&json!({"amount": "15.5"}));
        assert!(matches!(
            params.amount(),
            Err(AdapterError::InvalidParameter { .. })
        ));
        let params = ToolParams::from_payload(&json!({"amount": "lots"}));
        assert!(matches!(
            params.amount(),
            Err(AdapterError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn body_emits_amount_as_number() {
        let payload = json!({"sourcePhone": "771234567", "amount": "500"});
        let body = ToolParams::from_payload(&payload).to_body();
        assert_eq!(body, json!({"source_phone": "771234567", "amount": 500}));
    }
}
