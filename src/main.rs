use anyhow::Context;

use tuning_desk::config::DeskConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = DeskConfig::from_env().context("Invalid configuration")?;

    eprintln!("🎹 Tuning Desk v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.model);
    eprintln!("   Slot service: {}", config.slot_service_url);
    eprintln!("   Initial persona: {}", config.initial_persona);
    eprintln!(
        "   Retries: {} attempts, {}s timeout +{}s per attempt",
        config.retry.max_attempts,
        config.retry.base_timeout.as_secs(),
        config.retry.timeout_step.as_secs()
    );
    eprintln!("   API: http://0.0.0.0:{}/ask\n", config.port);

    tuning_desk::api::serve(&config)
        .await
        .with_context(|| format!("Tuning desk failed on port {}", config.port))?;

    Ok(())
}
