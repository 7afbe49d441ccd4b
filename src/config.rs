//! Configuration types.

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::persona::Persona;
use crate::retry::RetryPolicy;

/// Desk configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct DeskConfig {
    /// Port the HTTP surface listens on.
    pub port: u16,
    /// Base URL of the remote slot service.
    pub slot_service_url: String,
    /// Number customers are pointed at when something fails.
    pub shop_phone: String,
    /// Turns kept per session.
    pub max_history: usize,
    /// Persona new and cleared sessions start in.
    pub initial_persona: Persona,
    /// Retry policy for slot service and reasoner calls.
    pub retry: RetryPolicy,
    pub api_key: SecretString,
    pub model: String,
    pub llm_base_url: String,
}

impl DeskConfig {
    /// Build config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup. Only `OPENAI_API_KEY` is required.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;

        let port: u16 = parse_or(&lookup, "DESK_PORT", 5001)?;
        let slot_service_url = lookup("SLOT_SERVICE_URL")
            .unwrap_or_else(|| "http://localhost:8000".to_string());
        let shop_phone = lookup("SHOP_PHONE").unwrap_or_else(|| "01442 876131".to_string());
        let max_history: usize = parse_or(&lookup, "DESK_MAX_HISTORY", 20)?;
        let initial_persona: Persona = parse_or(&lookup, "DESK_INITIAL_PERSONA", Persona::Triage)?;

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: parse_or(&lookup, "SLOT_MAX_ATTEMPTS", defaults.max_attempts)?,
            base_timeout: Duration::from_secs(parse_or(
                &lookup,
                "SLOT_BASE_TIMEOUT_SECS",
                defaults.base_timeout.as_secs(),
            )?),
            timeout_step: Duration::from_secs(parse_or(
                &lookup,
                "SLOT_TIMEOUT_STEP_SECS",
                defaults.timeout_step.as_secs(),
            )?),
            backoff: Duration::from_millis(parse_or(
                &lookup,
                "SLOT_RETRY_BACKOFF_MS",
                defaults.backoff.as_millis() as u64,
            )?),
        };
        if retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "SLOT_MAX_ATTEMPTS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        let model = lookup("DESK_MODEL").unwrap_or_else(|| "gpt-4o".to_string());
        let llm_base_url =
            lookup("OPENAI_BASE_URL").unwrap_or_else(|| "https://api.openai.com/v1".to_string());

        Ok(Self {
            port,
            slot_service_url,
            shop_phone,
            max_history,
            initial_persona,
            retry,
            api_key: SecretString::from(api_key),
            model,
            llm_base_url,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Result<DeskConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DeskConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config(&[("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(config.port, 5001);
        assert_eq!(config.max_history, 20);
        assert_eq!(config.initial_persona, Persona::Triage);
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.api_key.expose_secret(), "sk-test");
    }

    #[test]
    fn api_key_is_required() {
        assert!(matches!(config(&[]), Err(ConfigError::MissingEnvVar(_))));
        assert!(matches!(
            config(&[("OPENAI_API_KEY", "  ")]),
            Err(ConfigError::MissingEnvVar(_))
        ));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("DESK_PORT", "9000"),
            ("DESK_INITIAL_PERSONA", "shop_assistant"),
            ("SLOT_MAX_ATTEMPTS", "5"),
            ("SLOT_BASE_TIMEOUT_SECS", "2"),
            ("SLOT_RETRY_BACKOFF_MS", "0"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.initial_persona, Persona::ShopAssistant);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_timeout, Duration::from_secs(2));
        assert_eq!(config.retry.backoff, Duration::ZERO);
    }

    #[test]
    fn bad_values_name_the_key() {
        let err = config(&[("OPENAI_API_KEY", "sk"), ("DESK_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("DESK_PORT"));

        let err = config(&[("OPENAI_API_KEY", "sk"), ("DESK_INITIAL_PERSONA", "receptionist")])
            .unwrap_err();
        assert!(err.to_string().contains("DESK_INITIAL_PERSONA"));

        assert!(config(&[("OPENAI_API_KEY", "sk"), ("SLOT_MAX_ATTEMPTS", "0")]).is_err());
    }
}
