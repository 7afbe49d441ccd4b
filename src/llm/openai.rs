//! OpenAI-compatible chat completions reasoner.
//!
//! Handoffs and booking tools are exposed as function tools. The routing
//! persona is sent `tool_choice: "required"` so it cannot answer in text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{PersonaReasoner, PersonaReply, ToolRequest};
use crate::availability::BookingRequest;
use crate::error::{LlmError, TransportError};
use crate::persona::prompts::system_prompt;
use crate::persona::{BehaviorTag, Persona, PersonaRoute};
use crate::session::{Role, Turn};

const PROVIDER: &str = "openai";
const ENDPOINT: &str = "chat/completions";
const TRANSFER_PREFIX: &str = "transfer_to_";
const CHECK_AVAILABILITY_TOOL: &str = "check_availability";
const BOOK_SLOT_TOOL: &str = "book_slot";

/// Connection settings for the reasoner.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: SecretString,
    pub model: String,
    pub base_url: String,
    /// Shop phone number quoted in the service persona's prompt.
    pub shop_phone: String,
}

/// `PersonaReasoner` over an OpenAI-compatible HTTP API.
pub struct OpenAiReasoner {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiReasoner {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self) -> String {
        format!("{}/{ENDPOINT}", self.config.base_url.trim_end_matches('/'))
    }

    fn build_request(
        &self,
        route: &PersonaRoute,
        history: &[Turn],
        utterance: &str,
    ) -> ChatRequest {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage {
            role: "system",
            content: system_prompt(route, &self.config.shop_phone),
        });
        messages.extend(history.iter().map(|turn| ChatMessage {
            role: match turn.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: turn.content.clone(),
        }));
        messages.push(ChatMessage {
            role: "user",
            content: utterance.to_string(),
        });

        let tools = tool_definitions(route);
        let tool_choice = if tools.is_empty() {
            None
        } else if route.behavior == BehaviorTag::Routing {
            Some("required")
        } else {
            Some("auto")
        };

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            tools,
            tool_choice,
        }
    }
}

#[async_trait]
impl PersonaReasoner for OpenAiReasoner {
    async fn respond(
        &self,
        route: &PersonaRoute,
        history: &[Turn],
        utterance: &str,
        timeout: Duration,
    ) -> Result<PersonaReply, LlmError> {
        let request = self.build_request(route, history, utterance);
        tracing::debug!(
            persona = %route.persona,
            history = history.len(),
            tools = request.tools.len(),
            "Calling reasoner"
        );

        let response = self
            .client
            .post(self.url())
            .timeout(timeout)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(ENDPOINT, timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, &body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TransportError::from_reqwest(ENDPOINT, timeout, e))?;
        parse_completion(&body)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn function_tool(name: &str, description: &str, parameters: Value) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": name,
            "description": description,
            "parameters": parameters,
        }
    })
}

fn tool_definitions(route: &PersonaRoute) -> Vec<Value> {
    let mut tools: Vec<Value> = route
        .handoffs
        .iter()
        .map(|target| {
            function_tool(
                &format!("{TRANSFER_PREFIX}{}", target.id()),
                target.handoff_description(),
                json!({ "type": "object", "properties": {} }),
            )
        })
        .collect();

    if route.behavior == BehaviorTag::PrimaryService {
        tools.push(function_tool(
            CHECK_AVAILABILITY_TOOL,
            "List the next available tuning slots for a UK postcode.",
            json!({
                "type": "object",
                "properties": { "postcode": { "type": "string" } },
                "required": ["postcode"],
            }),
        ));
        tools.push(function_tool(
            BOOK_SLOT_TOOL,
            "Book one of the offered tuning slots.",
            json!({
                "type": "object",
                "properties": {
                    "date": { "type": "string", "description": "The slot date as offered" },
                    "time": { "type": "string", "description": "The slot time as offered" },
                    "customer_name": { "type": "string" },
                    "address": { "type": "string", "description": "Full address including postcode" },
                    "phone": { "type": "string" },
                },
                "required": ["date", "time", "customer_name", "address", "phone"],
            }),
        ));
    }

    tools
}

/// Classify a non-success response.
///
/// A 400/404 whose body says something was not found is the provider
/// rejecting a conversation reference it no longer knows about.
fn map_http_error(status: StatusCode, body: &str) -> LlmError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::AuthFailed {
            provider: PROVIDER.to_string(),
        },
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND
            if message.to_lowercase().contains("not found") =>
        {
            LlmError::StaleReference {
                provider: PROVIDER.to_string(),
                reason: message,
            }
        }
        s if s == StatusCode::TOO_MANY_REQUESTS || s.is_server_error() => LlmError::RequestFailed {
            provider: PROVIDER.to_string(),
            reason: format!("{s}: {message}"),
        },
        s => LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: format!("{s}: {message}"),
        },
    }
}

fn invalid(reason: impl Into<String>) -> LlmError {
    LlmError::InvalidResponse {
        provider: PROVIDER.to_string(),
        reason: reason.into(),
    }
}

/// Turn a chat completion body into a persona decision. The first tool call
/// wins over any text content.
pub fn parse_completion(body: &Value) -> Result<PersonaReply, LlmError> {
    let message = body
        .pointer("/choices/0/message")
        .ok_or_else(|| invalid("response has no choices"))?;

    if let Some(call) = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .and_then(|calls| calls.first())
    {
        let name = call
            .pointer("/function/name")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("tool call without a name"))?;
        let arguments = call
            .pointer("/function/arguments")
            .and_then(Value::as_str)
            .unwrap_or("{}");
        return parse_tool_call(name, arguments);
    }

    match message.get("content").and_then(Value::as_str).map(str::trim) {
        Some(text) if !text.is_empty() => Ok(PersonaReply::Answer(text.to_string())),
        _ => Err(invalid("response has neither content nor tool calls")),
    }
}

fn parse_tool_call(name: &str, arguments: &str) -> Result<PersonaReply, LlmError> {
    if let Some(target) = name.strip_prefix(TRANSFER_PREFIX) {
        let persona: Persona = target
            .parse()
            .map_err(|_| invalid(format!("handoff to unknown persona '{target}'")))?;
        return Ok(PersonaReply::Handoff(persona));
    }

    match name {
        CHECK_AVAILABILITY_TOOL => {
            #[derive(Deserialize)]
            struct Args {
                postcode: String,
            }
            let args: Args = serde_json::from_str(arguments)?;
            Ok(PersonaReply::Tool(ToolRequest::CheckAvailability {
                postcode: args.postcode,
            }))
        }
        BOOK_SLOT_TOOL => {
            let request: BookingRequest = serde_json::from_str(arguments)?;
            Ok(PersonaReply::Tool(ToolRequest::BookSlot(request)))
        }
        other => Err(invalid(format!("unknown tool '{other}'"))),
    }
}
