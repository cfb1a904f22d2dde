use crate::{classifier::build_probe_request, handlers::AppState, metrics};
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// Connectivity probe at `GET /test`
///
/// Sends a trivial text prompt and echoes the reply. Failures are reported in the
/// body with status 200 so the probe itself never errors.
pub async fn handle_probe(State(state): State<AppState>) -> Json<Value> {
    let request = build_probe_request(&state.settings);

    match state.provider.complete(request).await {
        Ok(reply) => Json(json!({
            "status": format!("{} OK", state.provider.name()),
            "response": reply,
        })),
        Err(e) => {
            tracing::warn!(kind = e.kind(), error = %e, "Provider probe failed");
            metrics::record_upstream_error(e.kind());
            Json(json!({ "error": e.to_string() }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{state_with, MockProvider};
    use crate::models::openai::MessageContent;

    #[tokio::test]
    async fn test_probe_echoes_reply() {
        let provider = MockProvider::replying("Hello there");
        let Json(body) = handle_probe(State(state_with(provider.clone()))).await;

        assert_eq!(body, json!({"status": "Mock OK", "response": "Hello there"}));
        assert_eq!(provider.calls(), 1);

        let request = provider.last_request().unwrap();
        assert_eq!(request.model, "llama3-8b-8192");
        assert_eq!(request.messages[0].content, MessageContent::Text("Hi".to_string()));
    }

    #[tokio::test]
    async fn test_probe_reports_error_in_body() {
        let provider = MockProvider::failing("boom");
        let Json(body) = handle_probe(State(state_with(provider))).await;

        assert_eq!(
            body,
            json!({"error": "invalid response from model provider: boom"})
        );
    }
}
