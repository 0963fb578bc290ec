//! JSON bodies exchanged with the regex service.

use serde::{Deserialize, Serialize};

use crate::types::{MatchSet, ShareId};

/// Request body for the validate operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateRequest<'a> {
    /// Pattern to check.
    pub pattern: &'a str,
}

/// Response body of the validate operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    /// Whether the pattern compiled.
    pub is_valid: bool,
}

/// Request body for the evaluate and share operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairRequest<'a> {
    /// Pattern to use.
    pub pattern: &'a str,
    /// Sample text.
    pub test_string: &'a str,
}

/// Response body of the evaluate operation.
///
/// The service may send `null` instead of an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateResponse {
    /// Matched substrings in order of occurrence.
    #[serde(default)]
    pub matches: Option<MatchSet>,
}

impl EvaluateResponse {
    /// Get the matches, treating an absent list as empty.
    #[must_use]
    pub fn into_matches(self) -> MatchSet {
        self.matches.unwrap_or_default()
    }
}

/// Response body of the share operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    /// Identifier of the stored record.
    pub share_id: ShareId,
}

/// Error body the service sends with non-success statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of the problem.
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_null_matches_is_empty() {
        let response: EvaluateResponse = serde_json::from_str(r#"{"matches":null}"#).unwrap();
        assert!(response.into_matches().is_empty());

        let response: EvaluateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_matches().is_empty());
    }

    #[test]
    fn evaluate_preserves_order() {
        let response: EvaluateResponse =
            serde_json::from_str(r#"{"matches":["12","345"]}"#).unwrap();
        assert_eq!(response.into_matches(), vec!["12", "345"]);
    }

    #[test]
    fn pair_request_field_names() {
        let body = serde_json::to_string(&PairRequest {
            pattern: "a",
            test_string: "b",
        })
        .unwrap();
        assert_eq!(body, r#"{"pattern":"a","testString":"b"}"#);
    }

    #[test]
    fn validate_response_field_name() {
        let response: ValidateResponse = serde_json::from_str(r#"{"isValid":true}"#).unwrap();
        assert!(response.is_valid);
    }

    #[test]
    fn share_response_field_name() {
        let response: ShareResponse = serde_json::from_str(r#"{"shareId":"1a2b3c4d"}"#).unwrap();
        assert_eq!(response.share_id.as_str(), "1a2b3c4d");
    }
}
