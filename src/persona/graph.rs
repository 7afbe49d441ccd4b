//! Persona adjacency table and its startup validation.

use std::collections::HashMap;

use super::{BehaviorTag, Persona};
use crate::error::ConfigError;

/// A persona's behavior and the personas it may hand off to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaRoute {
    pub persona: Persona,
    pub behavior: BehaviorTag,
    pub handoffs: Vec<Persona>,
}

/// The full handoff graph plus the persona new sessions start in.
#[derive(Debug, Clone)]
pub struct PersonaGraph {
    routes: HashMap<Persona, PersonaRoute>,
    initial: Persona,
}

impl PersonaGraph {
    /// Build a graph from explicit routes. Call [`validate`](Self::validate)
    /// before using it.
    pub fn new(routes: impl IntoIterator<Item = PersonaRoute>, initial: Persona) -> Self {
        let routes = routes.into_iter().map(|r| (r.persona, r)).collect();
        Self { routes, initial }
    }

    /// Triage routes to either specialist; specialists can hand back to
    /// triage or straight to each other.
    pub fn standard(initial: Persona) -> Self {
        Self::new(
            [
                PersonaRoute {
                    persona: Persona::Triage,
                    behavior: BehaviorTag::Routing,
                    handoffs: vec![Persona::ShopAssistant, Persona::Companion],
                },
                PersonaRoute {
                    persona: Persona::ShopAssistant,
                    behavior: BehaviorTag::PrimaryService,
                    handoffs: vec![Persona::Triage, Persona::Companion],
                },
                PersonaRoute {
                    persona: Persona::Companion,
                    behavior: BehaviorTag::Tangential,
                    handoffs: vec![Persona::Triage, Persona::ShopAssistant],
                },
            ],
            initial,
        )
    }

    /// Check closure and the routing rules.
    ///
    /// - every handoff target has a route of its own,
    /// - there is exactly one routing persona,
    /// - the routing persona can reach at least one specialist and only
    ///   specialists,
    /// - no persona hands off to itself,
    /// - the initial persona exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.routes.contains_key(&self.initial) {
            return Err(ConfigError::PersonaGraph(format!(
                "initial persona '{}' has no route",
                self.initial
            )));
        }

        let routing: Vec<&PersonaRoute> = self
            .routes
            .values()
            .filter(|r| r.behavior == BehaviorTag::Routing)
            .collect();
        if routing.len() != 1 {
            return Err(ConfigError::PersonaGraph(format!(
                "expected exactly one routing persona, found {}",
                routing.len()
            )));
        }

        for route in self.routes.values() {
            for target in &route.handoffs {
                if *target == route.persona {
                    return Err(ConfigError::PersonaGraph(format!(
                        "'{}' hands off to itself",
                        route.persona
                    )));
                }
                let Some(target_route) = self.routes.get(target) else {
                    return Err(ConfigError::PersonaGraph(format!(
                        "'{}' hands off to '{}', which has no route",
                        route.persona, target
                    )));
                };
                if route.behavior == BehaviorTag::Routing
                    && target_route.behavior == BehaviorTag::Routing
                {
                    return Err(ConfigError::PersonaGraph(format!(
                        "routing persona '{}' may only delegate to specialists",
                        route.persona
                    )));
                }
            }
        }

        let router = routing[0];
        if router.handoffs.is_empty() {
            return Err(ConfigError::PersonaGraph(format!(
                "routing persona '{}' has no specialists to delegate to",
                router.persona
            )));
        }

        Ok(())
    }

    pub fn initial(&self) -> Persona {
        self.initial
    }

    pub fn route(&self, persona: Persona) -> Option<&PersonaRoute> {
        self.routes.get(&persona)
    }

    pub fn behavior(&self, persona: Persona) -> Option<BehaviorTag> {
        self.route(persona).map(|r| r.behavior)
    }

    pub fn is_routing(&self, persona: Persona) -> bool {
        self.behavior(persona) == Some(BehaviorTag::Routing)
    }

    pub fn can_handoff(&self, from: Persona, to: Persona) -> bool {
        self.route(from).is_some_and(|r| r.handoffs.contains(&to))
    }

    /// The routing persona. Falls back to the initial persona on a graph
    /// that failed validation.
    pub fn routing_persona(&self) -> Persona {
        self.routes
            .values()
            .find(|r| r.behavior == BehaviorTag::Routing)
            .map(|r| r.persona)
            .unwrap_or(self.initial)
    }

    /// The specialist a routing persona falls back to: the first
    /// primary-service target, else its first target.
    pub fn default_specialist(&self) -> Persona {
        let router = self.routing_persona();
        let targets = self.route(router).map(|r| r.handoffs.as_slice()).unwrap_or_default();
        targets
            .iter()
            .copied()
            .find(|p| self.behavior(*p) == Some(BehaviorTag::PrimaryService))
            .or_else(|| targets.first().copied())
            .unwrap_or(self.initial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_graph_is_valid_from_either_start() {
        PersonaGraph::standard(Persona::Triage).validate().unwrap();
        PersonaGraph::standard(Persona::ShopAssistant).validate().unwrap();
    }

    #[test]
    fn standard_graph_edges() {
        let graph = PersonaGraph::standard(Persona::Triage);
        assert!(graph.is_routing(Persona::Triage));
        assert!(!graph.is_routing(Persona::Companion));
        assert!(graph.can_handoff(Persona::Triage, Persona::Companion));
        assert!(graph.can_handoff(Persona::Companion, Persona::Triage));
        assert!(!graph.can_handoff(Persona::Triage, Persona::Triage));
        assert_eq!(graph.routing_persona(), Persona::Triage);
        assert_eq!(graph.default_specialist(), Persona::ShopAssistant);
    }

    #[test]
    fn dangling_target_fails_closure() {
        let graph = PersonaGraph::new(
            [
                PersonaRoute {
                    persona: Persona::Triage,
                    behavior: BehaviorTag::Routing,
                    handoffs: vec![Persona::ShopAssistant, Persona::Companion],
                },
                PersonaRoute {
                    persona: Persona::ShopAssistant,
                    behavior: BehaviorTag::PrimaryService,
                    handoffs: vec![Persona::Triage],
                },
            ],
            Persona::Triage,
        );
        let err = graph.validate().unwrap_err().to_string();
        assert!(err.contains("companion"), "{err}");
    }

    #[test]
    fn routing_persona_without_specialists_is_rejected() {
        let graph = PersonaGraph::new(
            [PersonaRoute {
                persona: Persona::Triage,
                behavior: BehaviorTag::Routing,
                handoffs: vec![],
            }],
            Persona::Triage,
        );
        assert!(matches!(graph.validate(), Err(ConfigError::PersonaGraph(_))));
    }

    #[test]
    fn missing_initial_persona_is_rejected() {
        let graph = PersonaGraph::new(
            [
                PersonaRoute {
                    persona: Persona::Triage,
                    behavior: BehaviorTag::Routing,
                    handoffs: vec![Persona::ShopAssistant],
                },
                PersonaRoute {
                    persona: Persona::ShopAssistant,
                    behavior: BehaviorTag::PrimaryService,
                    handoffs: vec![Persona::Triage],
                },
            ],
            Persona::Companion,
        );
        assert!(graph.validate().is_err());
    }

    #[test]
    fn self_handoff_is_rejected() {
        let mut graph = PersonaGraph::standard(Persona::Triage);
        graph
            .routes
            .get_mut(&Persona::Companion)
            .unwrap()
            .handoffs
            .push(Persona::Companion);
        assert!(graph.validate().is_err());
    }
}
