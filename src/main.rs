use anyhow::Result;
use console::{auth::jwt::GoogleIdTokenVerifier, menu, web, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting console service");

    // Load configuration from environment
    let config = console::config::Config::load()?;
    tracing::info!(
        environment = ?config.environment,
        public_url = %config.public_url,
        google_widget = config.gapi_client_id.is_some(),
        verify_google_id_token = config.verify_google_id_token,
        "Configuration loaded"
    );

    // Load and validate the shell layout (logs summary internally)
    let layout = menu::load_layout(&config.layout)?;

    let id_token_verifier = match (&config.gapi_client_id, config.verify_google_id_token) {
        (Some(client_id), true) => {
            let verifier = Arc::new(
                GoogleIdTokenVerifier::new(
                    console::auth::jwt::GOOGLE_JWKS_URL.to_string(),
                    client_id.clone(),
                    config.http_connect_timeout_secs,
                    config.http_request_timeout_secs,
                    config.jwks_cache_ttl_secs,
                )
                .map_err(|e| anyhow::anyhow!("Failed to initialize ID token verifier: {}", e))?,
            );

            // Prefetch JWKS at startup so /readyz returns 200 immediately
            verifier
                .prefetch_jwks()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to prefetch Google JWKS at startup: {}", e))?;
            tracing::info!("Google JWKS prefetched - readiness check will pass");
            Some(verifier)
        }
        _ => {
            if config.gapi_client_id.is_some() {
                tracing::warn!(
                    "Google sign-in enabled without GOOGLE_VERIFY_ID_TOKEN; credentials will be logged as untrusted claims only"
                );
            }
            None
        }
    };

    // Create shared application state
    let state = Arc::new(AppState {
        config: Arc::new(config.clone()),
        layout: Arc::new(layout),
        id_token_verifier,
    });

    let app = web::create_router(state);

    // Bind and serve
    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Console listening on {}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
