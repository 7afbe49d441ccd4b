//! The response variants the engine hands back to whoever renders them.

use serde::Serialize;

/// One user-facing reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Reply {
    /// Informational text (slot listings, persona answers).
    Info(String),
    /// The engine needs the user to restate something.
    Clarify(String),
    /// The remote service confirmed a booking; text is its wording, untouched.
    Confirmed(String),
    /// The request was refused (slot taken, out of area, remote error).
    Refused(String),
    /// Something failed on our side; the text points the user at the shop.
    Apology(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Self::Info(t)
            | Self::Clarify(t)
            | Self::Confirmed(t)
            | Self::Refused(t)
            | Self::Apology(t) => t,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Info(t)
            | Self::Clarify(t)
            | Self::Confirmed(t)
            | Self::Refused(t)
            | Self::Apology(t) => t,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Info(_) => "info",
            Self::Clarify(_) => "clarify",
            Self::Confirmed(_) => "confirmed",
            Self::Refused(_) => "refused",
            Self::Apology(_) => "apology",
        }
    }
}
