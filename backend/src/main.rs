use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use account_backend::{
    config::Config,
    db::connection::create_pool,
    repositories::PgUserStore,
    router::build_router,
    state::AppState,
    utils::email::SmtpMailer,
};

fn mask_secret(s: &str) -> String {
    if s.is_empty() {
        return "<empty>".into();
    }
    let prefix = s.chars().take(4).collect::<String>();
    format!("{}*** (len={})", prefix, s.len())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        jwt_secret = %mask_secret(&config.jwt_secret),
        refresh_token_secret = %mask_secret(&config.refresh_token_secret),
        jwt_expiration_hours = config.jwt_expiration_hours,
        refresh_token_expiration_days = config.refresh_token_expiration_days,
        code_expiration_minutes = config.code_expiration_minutes,
        smtp_host = %config.smtp.host,
        smtp_skip_send = config.smtp.skip_send,
        "Loaded configuration from environment/.env"
    );
    if config.refresh_token_secret != config.jwt_secret {
        tracing::warn!(
            "REFRESH_TOKEN_SECRET differs from JWT_SECRET; refresh tokens are verified with \
             JWT_SECRET and will be rejected"
        );
    }

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let store = Arc::new(PgUserStore::new(pool));
    let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);
    let port = config.port;
    let app = build_router(AppState::new(store, mailer, config));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
