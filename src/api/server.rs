//! Wires the desk from configuration and serves it.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use super::routes::{DeskRouteState, desk_routes};
use crate::availability::{AvailabilityReconciler, HttpSlotService};
use crate::config::DeskConfig;
use crate::dialogue::DialogueRouter;
use crate::error::Result;
use crate::llm::{OpenAiConfig, OpenAiReasoner};
use crate::persona::PersonaGraph;
use crate::session::InMemorySessionStore;
use crate::temporal::TemporalNormalizer;

/// Build the desk application against the live slot service and reasoner.
///
/// Fails if the persona graph does not validate.
pub fn desk_app(config: &DeskConfig) -> Result<Router> {
    let graph = PersonaGraph::standard(config.initial_persona);
    graph.validate()?;

    let reconciler = AvailabilityReconciler::new(
        Arc::new(HttpSlotService::new(&config.slot_service_url)),
        TemporalNormalizer::system(),
        config.retry,
        &config.shop_phone,
    );

    let reasoner = OpenAiReasoner::new(OpenAiConfig {
        api_key: config.api_key.clone(),
        model: config.model.clone(),
        base_url: config.llm_base_url.clone(),
        shop_phone: config.shop_phone.clone(),
    });

    let router = DialogueRouter::new(
        Arc::new(InMemorySessionStore::new(config.initial_persona, config.max_history)),
        Arc::new(reconciler),
        Arc::new(reasoner),
        graph,
        config.retry,
    );

    Ok(desk_routes(DeskRouteState {
        router: Arc::new(router),
    }))
}

/// Serve the desk on `0.0.0.0:{port}` until the process stops.
pub async fn serve(config: &DeskConfig) -> Result<()> {
    let app = desk_app(config)?;
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "Tuning desk started");
    axum::serve(listener, app).await?;
    Ok(())
}
