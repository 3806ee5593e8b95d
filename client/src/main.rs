//! NutriAI client
//!
//! Local-first personal nutrition tracker.
//!
//! ## Architecture
//!
//! The client is layered around an orchestrating [`App`]:
//! - Store: JSON key-value persistence with typed records
//! - Components: onboarding wizard, diary session, chat transcript,
//!   reminder scheduler, view router
//! - AI boundary: the `NutritionAi` trait with a Gemini implementation

use anyhow::Result;
use nutriai_client::ai::GeminiClient;
use nutriai_client::app::App;
use nutriai_client::config::AppConfig;
use nutriai_client::reminders::LogNotifier;
use nutriai_client::store::Records;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if AppConfig::is_production() { "production" } else { "development" },
        "Starting NutriAI client"
    );

    // Validate production configuration
    if AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    // Open the local store
    info!(path = %config.storage.path, "Opening local store");
    let records = Records::open(&config.storage.path)?;

    let ai = Arc::new(GeminiClient::new(&config.ai));
    let mut app = App::new(records, ai, Arc::new(LogNotifier));

    // Splash, then the initial load
    tokio::time::sleep(Duration::from_millis(config.splash.duration_ms)).await;
    app.initial_load();

    info!(screen = ?app.active_screen(), "Ready");
    if let Some(diary) = app.diary() {
        info!(
            date = %diary.date(),
            meals = diary.entries().len(),
            calories = diary.total_calories(),
            "Today's diary"
        );
    }
    let pending = app.pending_reminder_slots();
    if !pending.is_empty() {
        info!(?pending, "Reminders armed");
    }

    // Run until asked to stop; reminder timers fire in the background
    shutdown_signal().await;

    app.shutdown();
    info!("Client shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if AppConfig::is_production() {
            "nutriai_client=info".into()
        } else {
            "nutriai_client=debug".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Validate configuration for production deployment
fn validate_production_config(config: &AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.ai.enabled && config.ai.api_key.is_empty() {
        errors.push("AI is enabled but ai.api_key is not set");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
