//! Error types for the tuning desk.

use std::time::Duration;

use crate::availability::Slot;
use crate::persona::Persona;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    #[error("Booking error: {0}")]
    Booking(#[from] BookingError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Dialogue error: {0}")]
    Dialogue(#[from] DialogueError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Persona graph is not closed: {0}")]
    PersonaGraph(String),
}

/// Natural-language date/time normalization failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemporalError {
    #[error("Could not understand date: {input:?}")]
    DateFormat { input: String },

    #[error("Could not understand time: {input:?}")]
    TimeFormat { input: String },
}

/// Failures on the way to a booking that are recovered into a user reply.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("No postcode found in address {address:?}")]
    PostcodeMissing { address: String },

    #[error("Requested slot {date} {time} is not currently available")]
    SlotUnavailable {
        date: String,
        time: String,
        alternatives: Vec<Slot>,
    },

    #[error(transparent)]
    Temporal(#[from] TemporalError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Remote call failures: the only errors the retry helper retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("{endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("{endpoint} connection failed: {reason}")]
    Connection { endpoint: String, reason: String },

    #[error("{endpoint} returned unexpected status {status}")]
    UnexpectedStatus { endpoint: String, status: u16 },

    #[error("{endpoint} returned an unreadable body: {reason}")]
    Decode { endpoint: String, reason: String },
}

impl TransportError {
    /// Map a reqwest failure onto the transport taxonomy.
    pub fn from_reqwest(endpoint: &str, timeout: Duration, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                endpoint: endpoint.to_string(),
                timeout,
            }
        } else if err.is_decode() {
            Self::Decode {
                endpoint: endpoint.to_string(),
                reason: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            Self::UnexpectedStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            }
        } else {
            Self::Connection {
                endpoint: endpoint.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

/// Reasoning provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} rejected a stale message reference: {reason}")]
    StaleReference { provider: String, reason: String },

    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reasons a turn could not be answered by persona reasoning.
#[derive(Debug, thiserror::Error)]
pub enum DialogueError {
    #[error("Handoff limit of {limit} reached without an answer")]
    HopLimit { limit: usize },

    #[error("Persona {0} has no route")]
    Unrouted(Persona),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Result type alias for the desk.
pub type Result<T> = std::result::Result<T, Error>;
