//! Persona reasoning: the seam between the router and whatever model decides
//! what a persona says.
//!
//! A reasoner is given the persona's route, the session history and the new
//! utterance, and comes back with exactly one of: a text answer, a handoff to
//! another persona, or a request to run one of the booking tools.

pub mod openai;

use std::time::Duration;

use async_trait::async_trait;

use crate::availability::BookingRequest;
use crate::error::LlmError;
use crate::persona::{Persona, PersonaRoute};
use crate::session::Turn;

pub use openai::{OpenAiConfig, OpenAiReasoner};

/// A booking tool the primary-service persona may ask the router to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    CheckAvailability { postcode: String },
    BookSlot(BookingRequest),
}

/// What a persona decided to do with a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonaReply {
    Answer(String),
    Handoff(Persona),
    Tool(ToolRequest),
}

/// The reasoning collaborator behind every persona.
///
/// Implementations make exactly one attempt within `timeout`; the router
/// wraps calls in the retry helper.
#[async_trait]
pub trait PersonaReasoner: Send + Sync {
    async fn respond(
        &self,
        route: &PersonaRoute,
        history: &[Turn],
        utterance: &str,
        timeout: Duration,
    ) -> Result<PersonaReply, LlmError>;
}
