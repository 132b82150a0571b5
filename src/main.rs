use anyhow::Context;
use mvc_login::{app, config::AppConfig, state::AppState};
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions_sqlx_store::PostgresStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "mvc_login=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let (host, port) = (config.host.clone(), config.port);
    let purge_every = std::time::Duration::from_secs(config.session.purge_interval_secs);
    let (app_state, db) = AppState::init(config).await?;

    // Run migrations if present
    if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
        tracing::warn!(error = %e, "migration failed; continuing");
    }

    let session_store = PostgresStore::new(db);
    session_store
        .migrate()
        .await
        .context("create session table")?;

    let purge = tokio::task::spawn(session_store.clone().continuously_delete_expired(purge_every));
    tokio::spawn(async move {
        match purge.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "expired session purge stopped"),
            Err(e) => tracing::error!(error = %e, "expired session purge panicked"),
        }
    });

    let app = app::build_app(app_state, session_store);
    app::serve(app, &host, port).await
}
