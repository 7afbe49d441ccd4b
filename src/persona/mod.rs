//! Personas: the closed set of conversational roles and who may hand off to
//! whom.
//!
//! One persona routes (it only ever delegates), one serves the shop's
//! customers and can use the booking tools, and one handles tangential chat.
//! The adjacency table lives in [`PersonaGraph`] and is validated at startup.

pub mod graph;
pub mod prompts;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub use graph::{PersonaGraph, PersonaRoute};

/// A conversational role that can own a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Triage,
    ShopAssistant,
    Companion,
}

impl Persona {
    pub const ALL: [Persona; 3] = [Persona::Triage, Persona::ShopAssistant, Persona::Companion];

    /// Stable identifier used on the wire and in tool names.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Triage => "triage",
            Self::ShopAssistant => "shop_assistant",
            Self::Companion => "companion",
        }
    }

    /// One-line description offered to a persona deciding where to hand off.
    pub fn handoff_description(&self) -> &'static str {
        match self {
            Self::Triage => "Routes the conversation to the right specialist",
            Self::ShopAssistant => {
                "Customer service for the piano shop: sales, tuning, bookings, general questions"
            }
            Self::Companion => "Light-hearted chat that has nothing to do with the shop",
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Persona {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Persona::ALL
            .into_iter()
            .find(|p| p.id() == normalized)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "persona".to_string(),
                message: format!("unknown persona '{s}'"),
            })
    }
}

/// What a persona is for. Drives tool exposure and routing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorTag {
    /// Never answers; delegates every turn to exactly one specialist.
    Routing,
    /// Serves the shop's customers and may call the booking tools.
    PrimaryService,
    /// Answers, but owns nothing booking-related.
    Tangential,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for persona in Persona::ALL {
            assert_eq!(persona.id().parse::<Persona>().unwrap(), persona);
            assert_eq!(persona.to_string(), persona.id());
        }
    }

    #[test]
    fn parse_is_lenient_about_case_and_separators() {
        assert_eq!("Shop-Assistant".parse::<Persona>().unwrap(), Persona::ShopAssistant);
        assert_eq!(" TRIAGE ".parse::<Persona>().unwrap(), Persona::Triage);
    }

    #[test]
    fn unknown_persona_is_config_error() {
        let err = "receptionist".parse::<Persona>().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn serializes_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&Persona::ShopAssistant).unwrap(),
            "\"shop_assistant\""
        );
    }
}
