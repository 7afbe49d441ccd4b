//! The per-turn state machine.
//!
//! A turn runs with the session's lock held from start to finish:
//!
//! 1. fast path: postcode lookups and "more options" go straight to the
//!    reconciler;
//! 2. otherwise the active persona reasons about the utterance and may hand
//!    off (bounded by [`MAX_HANDOFFS`]) or ask for a booking tool;
//! 3. a stale conversation reference clears the history and retries once;
//! 4. the user and assistant turns are appended and a valid persona is
//!    written back, whatever happened.

use std::sync::Arc;

use serde::Serialize;

use super::fast_path::{self, FastPath};
use crate::availability::AvailabilityReconciler;
use crate::error::{DialogueError, LlmError};
use crate::llm::{PersonaReasoner, PersonaReply, ToolRequest};
use crate::persona::{BehaviorTag, Persona, PersonaGraph};
use crate::retry::{RetryPolicy, retry_with_backoff};
use crate::session::{Session, SessionStore, Turn};

/// Handoffs allowed within one turn before giving up.
pub const MAX_HANDOFFS: usize = 4;

/// Said when a turn cannot be answered at all.
pub const FALLBACK_REPLY: &str = "I'm sorry, something went wrong on my side and I couldn't answer \
that. Please try again in a moment, or call the shop if it's urgent.";

/// What a turn produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub response_text: String,
    pub active_persona: Persona,
}

/// Routes utterances between the fast path, the personas and the reconciler.
pub struct DialogueRouter {
    store: Arc<dyn SessionStore>,
    reconciler: Arc<AvailabilityReconciler>,
    reasoner: Arc<dyn PersonaReasoner>,
    graph: PersonaGraph,
    retry: RetryPolicy,
}

impl DialogueRouter {
    pub fn new(
        store: Arc<dyn SessionStore>,
        reconciler: Arc<AvailabilityReconciler>,
        reasoner: Arc<dyn PersonaReasoner>,
        graph: PersonaGraph,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            reconciler,
            reasoner,
            graph,
            retry,
        }
    }

    /// Handle one utterance for a session.
    pub async fn handle_turn(&self, session_key: &str, utterance: &str) -> TurnOutcome {
        let utterance = utterance.trim();
        let session = self.store.get_or_create(session_key).await;
        let mut session = session.lock().await;

        let fast = fast_path::classify(utterance, session.last_postcode.as_deref());
        let (response_text, persona) = match fast {
            Some(fast) => self.run_fast_path(&mut session, fast).await,
            None => self.reason(&mut session, utterance).await,
        };

        let persona = if self.graph.route(persona).is_some() {
            persona
        } else {
            tracing::warn!(session = %session.key, %persona, "Persona has no route; resetting");
            self.graph.initial()
        };
        session.set_active_persona(persona);
        session.append_turn(Turn::user(utterance));
        session.append_turn(Turn::assistant(response_text.clone()));

        TurnOutcome {
            response_text,
            active_persona: persona,
        }
    }

    /// Reset a session to its defaults.
    pub async fn clear_session(&self, session_key: &str) {
        self.store.clear(session_key).await;
    }

    async fn run_fast_path(&self, session: &mut Session, fast: FastPath) -> (String, Persona) {
        let page = match &fast {
            FastPath::Lookup { postcode } => {
                tracing::info!(session = %session.key, %postcode, "Fast path: slot lookup");
                self.reconciler.check_availability_page(postcode, 0).await
            }
            FastPath::More { postcode } => {
                tracing::info!(
                    session = %session.key,
                    %postcode,
                    already_shown = session.slots_shown,
                    "Fast path: more slots"
                );
                self.reconciler.check_more(postcode, session.slots_shown).await
            }
        };
        let (FastPath::Lookup { postcode } | FastPath::More { postcode }) = fast;
        session.record_listing(&postcode, page.shown_through);

        // The lookup is answered on the service persona's behalf.
        let persona = if self.graph.is_routing(session.active_persona()) {
            self.graph.default_specialist()
        } else {
            session.active_persona()
        };
        (page.reply.into_text(), persona)
    }

    async fn reason(&self, session: &mut Session, utterance: &str) -> (String, Persona) {
        let start = session.active_persona();
        let mut retried_stale = false;

        loop {
            let history = session.history();
            match self.run_personas(session, start, &history, utterance).await {
                Ok(answer) => return answer,
                Err(DialogueError::Llm(LlmError::StaleReference { reason, .. }))
                    if !retried_stale && !history.is_empty() =>
                {
                    tracing::warn!(
                        session = %session.key,
                        %reason,
                        "Stale conversation reference; clearing history and retrying"
                    );
                    session.reset_history();
                    retried_stale = true;
                }
                Err(e) => {
                    tracing::error!(
                        session = %session.key,
                        persona = %start,
                        error = %e,
                        "Turn failed"
                    );
                    return (FALLBACK_REPLY.to_string(), start);
                }
            }
        }
    }

    /// Let personas reason until one answers or a tool runs.
    async fn run_personas(
        &self,
        session: &mut Session,
        start: Persona,
        history: &[Turn],
        utterance: &str,
    ) -> Result<(String, Persona), DialogueError> {
        let mut persona = start;
        let mut handoffs = 0;

        loop {
            let route = self
                .graph
                .route(persona)
                .ok_or(DialogueError::Unrouted(persona))?;

            let reasoner = self.reasoner.as_ref();
            let reply = retry_with_backoff(&self.retry, "reasoner", move |timeout| {
                reasoner.respond(route, history, utterance, timeout)
            })
            .await?;

            let next = match reply {
                PersonaReply::Answer(text) if route.behavior != BehaviorTag::Routing => {
                    tracing::debug!(session = %session.key, %persona, handoffs, "Persona answered");
                    return Ok((text, persona));
                }
                PersonaReply::Answer(_) => {
                    tracing::warn!(
                        session = %session.key,
                        %persona,
                        "Routing persona answered; delegating instead"
                    );
                    self.graph.default_specialist()
                }
                PersonaReply::Handoff(target) if self.graph.can_handoff(persona, target) => {
                    tracing::info!(
                        session = %session.key,
                        from = %persona,
                        to = %target,
                        "Handoff"
                    );
                    target
                }
                PersonaReply::Handoff(target) => {
                    tracing::warn!(
                        session = %session.key,
                        from = %persona,
                        to = %target,
                        "Illegal handoff; re-routing"
                    );
                    self.reroute_from(persona)
                }
                PersonaReply::Tool(request) if route.behavior == BehaviorTag::PrimaryService => {
                    let text = self.run_tool(session, request).await;
                    return Ok((text, persona));
                }
                PersonaReply::Tool(_) => {
                    tracing::warn!(
                        session = %session.key,
                        %persona,
                        "Tool request from a persona without tools"
                    );
                    self.reroute_from(persona)
                }
            };

            handoffs += 1;
            if handoffs > MAX_HANDOFFS {
                return Err(DialogueError::HopLimit { limit: MAX_HANDOFFS });
            }
            persona = next;
        }
    }

    fn reroute_from(&self, persona: Persona) -> Persona {
        if self.graph.is_routing(persona) {
            self.graph.default_specialist()
        } else {
            self.graph.routing_persona()
        }
    }

    async fn run_tool(&self, session: &mut Session, request: ToolRequest) -> String {
        match request {
            ToolRequest::CheckAvailability { postcode } => {
                tracing::info!(session = %session.key, %postcode, "Tool: check_availability");
                let page = self.reconciler.check_availability_page(&postcode, 0).await;
                session.record_listing(&postcode, page.shown_through);
                page.reply.into_text()
            }
            ToolRequest::BookSlot(request) => {
                tracing::info!(
                    session = %session.key,
                    date = %request.date,
                    time = %request.time,
                    "Tool: book_slot"
                );
                let reply = self.reconciler.book_slot(&request).await;
                tracing::info!(
                    session = %session.key,
                    outcome = reply.kind(),
                    "Booking tool finished"
                );
                reply.into_text()
            }
        }
    }
}
