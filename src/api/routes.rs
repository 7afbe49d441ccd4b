//! REST endpoints for the chat front-end.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::dialogue::DialogueRouter;
use crate::persona::Persona;

/// Shared state for the desk routes.
#[derive(Clone)]
pub struct DeskRouteState {
    pub router: Arc<DialogueRouter>,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(alias = "sessionId")]
    pub session_id: Option<String>,
    #[serde(alias = "utterance", default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub response_text: String,
    pub active_persona: Persona,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ClearRequest {
    #[serde(alias = "sessionId")]
    pub session_id: Option<String>,
}

/// POST /ask
///
/// Runs one dialogue turn. A request without a session id starts a new
/// session and gets its id back.
async fn ask(
    State(state): State<DeskRouteState>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    let message = req.message.trim();
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "message is required"})),
        )
            .into_response();
    }

    let session_id = req
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let outcome = state.router.handle_turn(&session_id, message).await;
    Json(AskResponse {
        response_text: outcome.response_text,
        active_persona: outcome.active_persona,
        session_id,
    })
    .into_response()
}

/// POST /clear-chat
///
/// Resets a session. Unknown or missing ids are accepted and do nothing.
async fn clear_chat(
    State(state): State<DeskRouteState>,
    Json(req): Json<ClearRequest>,
) -> impl IntoResponse {
    if let Some(session_id) = req.session_id.filter(|id| !id.trim().is_empty()) {
        state.router.clear_session(&session_id).await;
    }
    Json(serde_json::json!({"status": "success"}))
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// Build the desk REST routes.
pub fn desk_routes(state: DeskRouteState) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route("/clear-chat", post(clear_chat))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::availability::{
        AvailabilityOutcome, AvailabilityReconciler, BookingOutcome, BookingSubmission, SlotService,
    };
    use crate::error::{LlmError, TransportError};
    use crate::llm::{PersonaReasoner, PersonaReply};
    use crate::persona::{PersonaGraph, PersonaRoute};
    use crate::retry::RetryPolicy;
    use crate::session::{InMemorySessionStore, Turn};
    use crate::temporal::TemporalNormalizer;

    /// Routing hands to the shop; the shop echoes the utterance.
    struct EchoReasoner;

    #[async_trait]
    impl PersonaReasoner for EchoReasoner {
        async fn respond(
            &self,
            route: &PersonaRoute,
            _history: &[Turn],
            utterance: &str,
            _timeout: Duration,
        ) -> Result<PersonaReply, LlmError> {
            Ok(match route.persona {
                Persona::Triage => PersonaReply::Handoff(Persona::ShopAssistant),
                _ => PersonaReply::Answer(format!("echo: {utterance}")),
            })
        }
    }

    struct NoSlots;

    #[async_trait]
    impl SlotService for NoSlots {
        async fn check_availability(
            &self,
            _postcode: &str,
            _timeout: Duration,
        ) -> Result<AvailabilityOutcome, TransportError> {
            Ok(AvailabilityOutcome::Slots {
                slots: vec![],
                total: 0,
            })
        }

        async fn create_booking(
            &self,
            _booking: &BookingSubmission,
            _timeout: Duration,
        ) -> Result<BookingOutcome, TransportError> {
            Ok(BookingOutcome::Failed {
                error: "closed".into(),
            })
        }
    }

    fn app() -> Router {
        let retry = RetryPolicy::default().without_backoff();
        let reconciler = AvailabilityReconciler::new(
            Arc::new(NoSlots),
            TemporalNormalizer::system(),
            retry,
            "01442 000000",
        );
        let router = DialogueRouter::new(
            Arc::new(InMemorySessionStore::new(Persona::Triage, 20)),
            Arc::new(reconciler),
            Arc::new(EchoReasoner),
            PersonaGraph::standard(Persona::Triage),
            retry,
        );
        desk_routes(DeskRouteState {
            router: Arc::new(router),
        })
    }

    async fn post_json(
        app: Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let resp = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn ask_accepts_both_field_spellings() {
        let (status, body) = post_json(
            app(),
            "/ask",
            serde_json::json!({"sessionId": "abc", "utterance": "hello"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["responseText"], "echo: hello");
        assert_eq!(body["activePersona"], "shop_assistant");
        assert_eq!(body["sessionId"], "abc");

        let (_, body) = post_json(
            app(),
            "/ask",
            serde_json::json!({"session_id": "xyz", "message": "hi"}),
        )
        .await;
        assert_eq!(body["sessionId"], "xyz");
    }

    #[tokio::test]
    async fn ask_without_session_issues_one() {
        let (_, body) = post_json(app(), "/ask", serde_json::json!({"message": "hi"})).await;
        let id = body["sessionId"].as_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn ask_rejects_empty_message() {
        let (status, body) = post_json(app(), "/ask", serde_json::json!({"message": "   "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "message is required");
    }

    #[tokio::test]
    async fn clear_chat_always_succeeds() {
        let (status, body) =
            post_json(app(), "/clear-chat", serde_json::json!({"session_id": "never-seen"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
    }
}
