/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::{build_router, AppState}, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::from_config(config).await?;
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, config::StorageBackend, middleware::security::SecurityHeadersLayer};
use anyhow::Context;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use chrono::Duration;
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::{
    auth::middleware::authenticate_request,
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    },
    email::{EmailSender, LogEmailSender, SmtpConfig, SmtpEmailSender},
    store::{
        memory::{MemoryBoardRepository, MemoryUserRepository},
        postgres::{PgBoardRepository, PgUserRepository},
        AccountStore, BoardStore, ResetSettings,
    },
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request by the `State` extractor; every field is cheap to
/// clone.
#[derive(Clone)]
pub struct AppState {
    pub boards: BoardStore,
    pub accounts: AccountStore,
    pub config: Arc<Config>,

    /// Present only with the postgres backend
    pub db: Option<PgPool>,
}

impl AppState {
    /// Creates state from already-built stores
    pub fn new(
        boards: BoardStore,
        accounts: AccountStore,
        config: Config,
        db: Option<PgPool>,
    ) -> Self {
        Self {
            boards,
            accounts,
            config: Arc::new(config),
            db,
        }
    }

    /// State backed by the in-memory repositories
    pub fn in_memory(config: Config, mailer: Arc<dyn EmailSender>) -> Self {
        let accounts = AccountStore::new(
            Arc::new(MemoryUserRepository::new()),
            mailer,
            reset_settings(&config),
        );
        let boards = BoardStore::new(Arc::new(MemoryBoardRepository::new()));

        Self::new(boards, accounts, config, None)
    }

    /// Builds stores for the configured backend
    ///
    /// With the postgres backend this connects, health-checks and migrates
    /// the database before returning.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let mailer = email_sender(&config)?;

        match config.storage.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Ok(Self::in_memory(config, mailer))
            }
            StorageBackend::Postgres => {
                let url = config
                    .storage
                    .database_url
                    .clone()
                    .context("DATABASE_URL is required for the postgres backend")?;

                let pool = create_pool(DatabaseConfig {
                    url,
                    max_connections: config.storage.max_connections,
                    ..Default::default()
                })
                .await
                .context("Failed to connect to database")?;

                run_migrations(&pool)
                    .await
                    .context("Failed to run database migrations")?;

                let accounts = AccountStore::new(
                    Arc::new(PgUserRepository::new(pool.clone())),
                    mailer,
                    reset_settings(&config),
                );
                let boards = BoardStore::new(Arc::new(PgBoardRepository::new(pool.clone())));

                Ok(Self::new(boards, accounts, config, Some(pool)))
            }
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Lifetime of issued session tokens
    pub fn jwt_lifetime(&self) -> Duration {
        Duration::hours(self.config.jwt.expiration_hours)
    }
}

fn reset_settings(config: &Config) -> ResetSettings {
    ResetSettings {
        frontend_url: config.reset.frontend_url.clone(),
        token_ttl: Duration::minutes(config.reset.token_ttl_minutes),
    }
}

fn email_sender(config: &Config) -> anyhow::Result<Arc<dyn EmailSender>> {
    let Some(host) = &config.email.smtp_host else {
        tracing::warn!("SMTP_HOST not set; outgoing emails will only be logged");
        return Ok(Arc::new(LogEmailSender::new()));
    };

    let sender = SmtpEmailSender::new(&SmtpConfig {
        host: host.clone(),
        port: config.email.smtp_port,
        username: config.email.smtp_username.clone(),
        password: config.email.smtp_password.clone(),
        from: config.email.from.clone(),
    })
    .context("Invalid SMTP configuration")?;

    tracing::info!(host = %host, port = config.email.smtp_port, "SMTP email delivery enabled");
    Ok(Arc::new(sender))
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health
/// └── /v1
///     ├── POST /auth/login
///     ├── POST /auth/logout
///     ├── GET /auth/validate-token       (JWT)
///     ├── /users
///     │   ├── POST /register
///     │   ├── POST /forgot-password
///     │   ├── POST /reset-password/:token
///     │   ├── GET|PUT /profile           (JWT)
///     │   ├── GET /me                    (JWT)
///     │   └── PUT /password              (JWT)
///     └── /boards                        (JWT)
///         ├── POST|GET /
///         └── GET|PUT|DELETE /:id
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .merge(
            Router::new()
                .route("/validate-token", get(routes::auth::validate_token))
                .route_layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    jwt_auth_layer,
                )),
        );

    let public_user_routes = Router::new()
        .route("/register", post(routes::users::register))
        .route("/forgot-password", post(routes::users::forgot_password))
        .route("/reset-password/:token", post(routes::users::reset_password));

    let private_user_routes = Router::new()
        .route(
            "/profile",
            get(routes::users::get_profile).put(routes::users::update_profile),
        )
        .route("/me", get(routes::users::get_profile))
        .route("/password", put(routes::users::change_password))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let board_routes = Router::new()
        .route(
            "/",
            post(routes::boards::create_board).get(routes::boards::list_boards),
        )
        .route(
            "/:id",
            get(routes::boards::get_board)
                .put(routes::boards::update_board)
                .delete(routes::boards::delete_board),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", public_user_routes.merge(private_user_routes))
        .nest("/boards", board_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.api.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Resolves the bearer token into an `AuthContext` request extension
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_context = authenticate_request(req.headers(), state.jwt_secret())?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
