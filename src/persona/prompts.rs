//! System prompts for each persona.
//!
//! Kept deliberately short; tone lives with the model, not here. What matters
//! to the router is the handoff list appended to every prompt.

use super::graph::PersonaRoute;
use super::{BehaviorTag, Persona};

/// Build the system prompt for a persona, including its legal handoffs.
pub fn system_prompt(route: &PersonaRoute, shop_phone: &str) -> String {
    let base = match route.persona {
        Persona::Triage => "\
You route customer messages for a piano shop. You never answer a message yourself.
Pick exactly one specialist for every message and transfer to it.
- If a message could fit more than one specialist, pick the most specific.
- If unsure, pick the shop assistant.
- For follow-ups, keep the same specialist unless the topic clearly changes."
            .to_string(),
        Persona::ShopAssistant => format!(
            "\
You are the customer service assistant for a piano shop: sales, tuning, repairs and general questions.
Keep answers short and friendly.
For tuning appointments:
- Ask for the customer's postcode, then call check_availability.
- Offer only the slots the tool returns, in the same words.
- To book, collect the slot's date and time exactly as offered, plus name, full address with postcode and phone, then call book_slot.
- Relay the tool's reply to the customer as-is.
If you can't help, suggest calling the shop on {shop_phone}."
        ),
        Persona::Companion => "\
You handle light-hearted chat that has nothing to do with the shop's business.
Keep it brief and good-natured. Anything about pianos, tuning or bookings belongs to the shop assistant."
            .to_string(),
    };

    let mut prompt = base;
    if !route.handoffs.is_empty() {
        prompt.push_str("\n\nYou can transfer the conversation to:");
        for target in &route.handoffs {
            prompt.push_str(&format!(
                "\n- {} (transfer_to_{}): {}",
                target,
                target.id(),
                target.handoff_description()
            ));
        }
    }
    if route.behavior == BehaviorTag::Routing {
        prompt.push_str("\n\nAlways transfer. Never reply with text.");
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::PersonaGraph;

    #[test]
    fn triage_prompt_lists_specialists_and_forbids_answers() {
        let graph = PersonaGraph::standard(Persona::Triage);
        let prompt = system_prompt(graph.route(Persona::Triage).unwrap(), "01442 000000");
        assert!(prompt.contains("transfer_to_shop_assistant"));
        assert!(prompt.contains("transfer_to_companion"));
        assert!(prompt.contains("Never reply with text"));
    }

    #[test]
    fn shop_assistant_prompt_mentions_tools_and_phone() {
        let graph = PersonaGraph::standard(Persona::Triage);
        let prompt = system_prompt(graph.route(Persona::ShopAssistant).unwrap(), "01442 000000");
        assert!(prompt.contains("check_availability"));
        assert!(prompt.contains("book_slot"));
        assert!(prompt.contains("01442 000000"));
        assert!(!prompt.contains("Never reply with text"));
    }
}
