pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::composition::handlers as prompts;
use crate::generation::handlers as definitions;
use crate::rules::handlers as rules;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Prompt API
        .route("/api/v1/prompts/compose", post(prompts::handle_compose))
        .route("/api/v1/prompts/modules", get(prompts::handle_list_modules))
        // Rule catalogue
        .route("/api/v1/rules", get(rules::handle_list_rules))
        // Definition API
        .route(
            "/api/v1/definitions/generate",
            post(definitions::handle_generate),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::composition::{Orchestrator, PromptConfig};
    use crate::config::Config;
    use crate::generation::generator::tests::StubWriter;
    use crate::generation::generator::DefinitionWriter;
    use crate::rules::RuleSource;

    fn state(writer: Option<Arc<dyn DefinitionWriter>>) -> AppState {
        let rules = RuleSource::load(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../config/rules.json"
        ))
        .unwrap();
        AppState {
            config: Config::from_lookup(|_| None).unwrap(),
            orchestrator: Arc::new(Orchestrator::with_default_modules(Arc::new(rules)).unwrap()),
            prompt_defaults: PromptConfig::default(),
            writer,
        }
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(build_router(state(None)), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["rules_loaded"], 14);
        assert_eq!(body["generation_enabled"], false);
    }

    #[tokio::test]
    async fn test_compose_returns_prompt_and_trace() {
        let request = post_json(
            "/api/v1/prompts/compose",
            json!({
                "term": "werkwoord",
                "organizational_context": ["OM", "Reclassering"],
                "legal_context": ["Strafrecht"],
                "category_hint": "type",
                "options": {"strict_mode": true}
            }),
        );
        let (status, body) = send(build_router(state(None)), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["prompt"].as_str().unwrap().contains("\"werkwoord\""));
        assert_eq!(body["degraded"], false);
        assert!(body["request_id"].is_string());
        let entries = body["trace"]["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 15);
        assert_eq!(entries[0]["module_id"], "role");
        assert_eq!(entries[0]["outcome"], "executed");
        assert_eq!(body["trace"]["phase"], "assembled");
    }

    #[tokio::test]
    async fn test_compose_rejects_unknown_option() {
        let request = post_json(
            "/api/v1/prompts/compose",
            json!({"term": "toezicht", "options": {"verbose": true}}),
        );
        let (status, body) = send(build_router(state(None)), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "CONFIGURATION_ERROR");
    }

    #[tokio::test]
    async fn test_compose_rejects_empty_term() {
        let request = post_json("/api/v1/prompts/compose", json!({"term": " "}));
        let (status, body) = send(build_router(state(None)), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_module_listing_is_in_execution_order() {
        let (status, body) = send(build_router(state(None)), get("/api/v1/prompts/modules")).await;
        assert_eq!(status, StatusCode::OK);
        let modules = body["modules"].as_array().unwrap();
        assert_eq!(modules.first().unwrap()["module_id"], "role");
        let last = modules.last().unwrap();
        assert_eq!(last["module_id"], "final_task");
        assert_eq!(last["hard_dependencies"], json!(["semantic_category", "context_render"]));
    }

    #[tokio::test]
    async fn test_rules_filtered_by_category() {
        let (status, body) = send(build_router(state(None)), get("/api/v1/rules?category=con")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        for rule in body["rules"].as_array().unwrap() {
            assert!(rule["id"].as_str().unwrap().starts_with("CON-"));
        }

        let (status, _) = send(build_router(state(None)), get("/api/v1/rules?category=XYZ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_without_backend_is_not_implemented() {
        let request = post_json("/api/v1/definitions/generate", json!({"term": "toezicht"}));
        let (status, body) = send(build_router(state(None)), request).await;
        assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
        assert_eq!(body["error"]["code"], "NOT_IMPLEMENTED");
    }

    #[tokio::test]
    async fn test_generate_with_stub_backend() {
        let writer: Arc<dyn DefinitionWriter> =
            Arc::new(StubWriter::answering("activiteit waarbij naleving wordt beoordeeld"));
        let request = post_json("/api/v1/definitions/generate", json!({"term": "toezicht"}));
        let (status, body) = send(build_router(state(Some(writer))), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["definition"], "activiteit waarbij naleving wordt beoordeeld");
        assert_eq!(body["backend"], "stub");
    }

    #[tokio::test]
    async fn test_generate_backend_failure_is_bad_gateway() {
        let writer: Arc<dyn DefinitionWriter> = Arc::new(StubWriter::failing(500));
        let request = post_json("/api/v1/definitions/generate", json!({"term": "toezicht"}));
        let (status, body) = send(build_router(state(Some(writer))), request).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "LLM_ERROR");
    }
}
