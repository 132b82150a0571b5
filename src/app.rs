use std::{net::SocketAddr, time::Duration};

use axum::{extract::Request, Router, ServiceExt};
use tower_http::{normalize_path::NormalizePath, trace::TraceLayer};
use tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer, SessionStore};

use crate::{config::SessionConfig, routes, state::AppState};

/// The full application, ready to serve: routes, session layer, tracing,
/// and trailing-slash normalisation so `/mypage/` and `/mypage` match.
pub type App = NormalizePath<Router>;

/// Cookie-backed sessions that expire after `ttl_minutes` without a request.
pub fn session_layer<S>(config: &SessionConfig, store: S) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(config.cookie_name.clone())
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(config.secure_cookie)
        .with_expiry(Expiry::OnInactivity(config.inactivity()))
}

pub fn build_app<S>(state: AppState, store: S) -> App
where
    S: SessionStore + Clone,
{
    let router = routes::router()
        .layer(session_layer(&state.config.session, store))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>, _latency: Duration, span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        );

    NormalizePath::trim_trailing_slash(router)
}

pub async fn serve(app: App, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
