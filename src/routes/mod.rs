//! API routes

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::conversation::{SamplingParams, Turn};
use crate::core::{ChatError, ChatOutcome, DEFAULT_CONVERSATION_ID};
use crate::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default = "default_conversation_id")]
    pub conversation_id: String,
    #[serde(default)]
    pub model_params: Option<SamplingParams>,
}

fn default_conversation_id() -> String {
    DEFAULT_CONVERSATION_ID.into()
}

#[derive(Debug, Serialize)]
pub struct ConversationsResponse {
    pub conversations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<Turn>,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = match &self {
            ChatError::Validation(_) => StatusCode::BAD_REQUEST,
            ChatError::NotFound(_) => StatusCode::NOT_FOUND,
            ChatError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatOutcome>, ChatError> {
    let Json(request) = payload.map_err(|e| ChatError::Validation(e.body_text()))?;
    tracing::debug!(
        "Received chat request for conversation {}",
        request.conversation_id
    );

    let outcome = state
        .chat_engine
        .submit_message(
            &request.conversation_id,
            &request.message,
            request.model_params,
        )
        .await?;

    Ok(Json(outcome))
}

async fn conversations(State(state): State<AppState>) -> Json<ConversationsResponse> {
    Json(ConversationsResponse {
        conversations: state.chat_engine.conversations().await,
    })
}

async fn history(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<HistoryResponse>, ChatError> {
    tracing::debug!("Getting history for conversation {}", conversation_id);
    let history = state.chat_engine.history(&conversation_id).await?;
    Ok(Json(HistoryResponse { history }))
}

async fn models(State(state): State<AppState>) -> Result<Json<Value>, ChatError> {
    Ok(Json(state.chat_engine.models().await?))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/conversations", get(conversations))
        .route("/api/history/:conversation_id", get(history))
        .route("/api/models", get(models))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::core::{ChatEngine, ConversationStore, MockProvider};

    fn app(provider: Arc<MockProvider>) -> Router {
        let store = Arc::new(ConversationStore::new());
        let state = AppState {
            chat_engine: Arc::new(ChatEngine::new(store, provider)),
        };
        router().with_state(state)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_chat(body: Value) -> Request<Body> {
        Request::post("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_chat_then_history() {
        let app = app(Arc::new(MockProvider::replying(&["hello"])));

        let (status, body) = send(&app, post_chat(json!({"message": "hi", "conversation_id": "c1"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "response": "hello",
                "conversation_id": "c1",
                "history": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"}
                ]
            })
        );

        let (status, body) = send(&app, get("/api/history/c1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["history"].as_array().unwrap().len(), 2);

        let (status, body) = send(&app, get("/api/conversations")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"conversations": ["c1"]}));
    }

    #[tokio::test]
    async fn test_chat_default_conversation() {
        let app = app(Arc::new(MockProvider::replying(&["hello"])));

        let (status, body) = send(&app, post_chat(json!({"message": "hi"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["conversation_id"], "default");
    }

    #[tokio::test]
    async fn test_chat_validation_errors() {
        let provider = Arc::new(MockProvider::default());
        let app = app(provider.clone());

        let (status, body) = send(
            &app,
            post_chat(json!({"message": "hi", "model_params": {"temperature": 1.5}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("temperature"));

        let (status, _) = send(
            &app,
            post_chat(json!({"message": "hi", "model_params": {"max_tokens": -3}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, post_chat(json!({"conversation_id": "c1"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_inference_error() {
        let app = app(Arc::new(MockProvider::failing("connection refused")));

        let (status, body) = send(&app, post_chat(json!({"message": "hi", "conversation_id": "c1"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().contains("connection refused"));

        let (status, body) = send(&app, get("/api/history/c1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"history": [{"role": "user", "content": "hi"}]}));
    }

    #[tokio::test]
    async fn test_unknown_history() {
        let app = app(Arc::new(MockProvider::default()));

        let (status, body) = send(&app, get("/api/history/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["detail"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_models_and_health() {
        let app = app(Arc::new(MockProvider::default()));

        let (status, body) = send(&app, get("/api/models")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["models"][0]["name"], "llama2:latest");

        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
