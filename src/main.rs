use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use etherchat::{
    api::{create_router, AppState, RateLimiter},
    auth::{InMemoryRevocations, TokenService},
    config::Config,
    db::schema,
    error::AppError,
    eth::EthGateway,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,etherchat=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting etherchat server v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    tracing::info!("✅ Configuration loaded");

    // Setup database with proper connection pooling
    let db = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database_url)
        .await?;

    tracing::info!("✅ Database connected: {}", config.database_url);

    schema::init(&db).await?;
    tracing::info!("✅ Database schema ready");

    // Connect to the ledger and deploy the contract if this is a first run.
    // An unreachable ledger aborts startup before the listener binds.
    let bootstrap = EthGateway::bootstrap(&config, &db).await?;
    if bootstrap.freshly_deployed {
        // Stored users and messages reference the previous contract; a fresh
        // deployment starts the local stores over as well.
        schema::reset(&db).await?;
        tracing::info!("✅ Fresh contract deployment - user and message stores reset");
    }
    tracing::info!("✅ Ledger gateway ready");

    // Token service with a process-wide revocation set
    let revocations = Arc::new(InMemoryRevocations::new());
    let tokens = Arc::new(TokenService::new(
        &config.jwt_secret,
        chrono::Duration::hours(config.token_lifespan_hours),
        revocations,
    ));
    tracing::info!("✅ Token service initialized (lifespan: {}h)", config.token_lifespan_hours);

    // Create rate limiter (100 requests per minute per IP)
    let rate_limiter = Arc::new(RateLimiter::new(100, 60));
    tracing::info!("✅ Rate limiter configured (100 req/min per IP)");

    // Create shared application state
    let state = AppState {
        db,
        tokens: tokens.clone(),
        gateway: bootstrap.gateway,
        config: config.clone(),
    };

    // Spawn background task dropping revocation entries for expired tokens
    {
        let tokens = tokens.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(3600)); // Every hour
            loop {
                interval.tick().await;
                tokens.prune_revocations();
                tracing::debug!("🧹 Expired revocation entries pruned");
            }
        });
        tracing::info!("✅ Revocation pruning task started (runs hourly)");
    }

    // Spawn background task for rate limiter cleanup
    {
        let limiter = rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300)); // Every 5 minutes
            loop {
                interval.tick().await;
                limiter.cleanup().await;
                tracing::debug!("🧹 Rate limiter cache cleaned up");
            }
        });
        tracing::info!("✅ Rate limiter cleanup task started");
    }

    // Build router
    let app = create_router(state, rate_limiter);

    // Bind and serve
    let addr = config.server_address();
    tracing::info!("🌐 Server listening on http://{}", addr);
    tracing::info!("🏥 Health check: http://{}/api/health", addr);
    tracing::info!("");
    tracing::info!("📚 API Endpoints:");
    tracing::info!("  GET  /api/            - Last ledger transaction");
    tracing::info!("  POST /api/register    - Register new user");
    tracing::info!("  POST /api/login       - Login with credentials");
    tracing::info!("  POST /api/logout      - Revoke a token");
    tracing::info!("  POST /api/refresh     - Refresh a token");
    tracing::info!("  GET  /api/protected   - Caller identity (requires auth)");
    tracing::info!("  POST /api/info        - Contract info (requires auth)");
    tracing::info!("  POST /api/saveAddress - Save address & key (requires auth)");
    tracing::info!("  POST /api/contacts    - Contact list (requires auth)");
    tracing::info!("  POST /api/savemessage - Store message (requires auth)");
    tracing::info!("  POST /api/getmessages - Message history (requires auth)");
    tracing::info!("  POST /api/poor        - Request funds (requires auth)");
    tracing::info!("  POST /api/public      - Public key lookup (requires auth)");
    tracing::info!("  POST /api/provider    - Configured RPC provider");
    tracing::info!("");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
