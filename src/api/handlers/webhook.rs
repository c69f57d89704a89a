//! Operator webhook that triggers ingestion.

use axum::extract::{Query, State};
use serde::Deserialize;

use crate::api::SharedState;
use crate::release::SourceKind;

#[derive(Debug, Default, Deserialize)]
pub struct WebhookQuery {
    pub source: Option<String>,
    pub api_key: Option<String>,
}

/// Compare the presented key against the configured one in constant time.
/// An empty configured key never matches.
fn key_matches(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if b.is_empty() || a.len() != b.len() {
        return false;
    }

    let diff = a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}

/// GET|POST /v1/webhook/refresh
///
/// Always answers 200 with a plain-text verdict; ingestion runs in the
/// background.
pub async fn refresh(State(state): State<SharedState>, Query(query): Query<WebhookQuery>) -> String {
    let authorized = match query.api_key.as_deref() {
        Some(presented) => key_matches(presented, &state.api_key),
        None => false,
    };
    if !authorized {
        tracing::warn!("Rejected webhook call with a bad api_key");
        return "No, thank you.".to_string();
    }

    let source = query.source.unwrap_or_default();
    let kind = match source.parse::<SourceKind>() {
        Ok(kind) => kind,
        Err(e) => return e.to_string(),
    };

    for (branch, ticket) in state.coordinator.refresh_source(kind) {
        tracing::info!("Webhook refresh of {} from {}: {:?}", branch, kind, ticket);
    }

    "Thank you.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_matches() {
        assert!(key_matches("s3cret", "s3cret"));
        assert!(!key_matches("s3cres", "s3cret"));
        assert!(!key_matches("s3cre", "s3cret"));
        assert!(!key_matches("s3crets", "s3cret"));
        assert!(!key_matches("S3CRET", "s3cret"));
    }

    #[test]
    fn test_empty_configured_key_never_matches() {
        assert!(!key_matches("", ""));
        assert!(!key_matches("anything", ""));
    }
}
