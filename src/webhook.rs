//! Receiving side of webhook delivery: an axum endpoint the Bot API server
//! POSTs updates to.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::error::Result;
use crate::types::Update;

/// Header carrying the `secret_token` given to `setWebhook`.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Debug, Clone)]
pub struct Webhook {
    path: String,
    secret_token: Option<String>,
}

#[derive(Clone)]
struct WebhookState {
    updates: mpsc::Sender<Update>,
    secret_token: Option<Arc<str>>,
}

impl Webhook {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            secret_token: None,
        }
    }

    /// Rejects requests that do not carry this token.
    pub fn secret_token(mut self, token: impl Into<String>) -> Self {
        self.secret_token = Some(token.into());
        self
    }

    /// Router forwarding every received update into `updates`.
    pub fn router(self, updates: mpsc::Sender<Update>) -> Router {
        let state = WebhookState {
            updates,
            secret_token: self.secret_token.map(Arc::from),
        };
        Router::new()
            .route(&self.path, post(receive))
            .with_state(state)
    }

    /// Listens for plain HTTP on `addr`; meant to sit behind a TLS proxy.
    pub async fn serve(self, addr: SocketAddr, updates: mpsc::Sender<Update>) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("webhook: listening on http://{}{}", listener.local_addr()?, self.path);
        axum::serve(listener, self.router(updates)).await?;
        Ok(())
    }

    /// Listens for HTTPS on `addr` with a PEM certificate and key.
    #[cfg(feature = "tls")]
    pub async fn serve_tls(
        self,
        addr: SocketAddr,
        cert: impl AsRef<std::path::Path>,
        key: impl AsRef<std::path::Path>,
        updates: mpsc::Sender<Update>,
    ) -> Result<()> {
        use axum_server::tls_rustls::RustlsConfig;

        let config = RustlsConfig::from_pem_file(cert, key).await?;
        info!("webhook: listening on https://{addr}{}", self.path);
        axum_server::bind_rustls(addr, config)
            .serve(self.router(updates).into_make_service())
            .await?;
        Ok(())
    }
}

async fn receive(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(expected) = &state.secret_token {
        let given = headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());
        if given != Some(expected.as_ref()) {
            warn!("webhook: rejected a request with a bad secret token");
            return StatusCode::UNAUTHORIZED;
        }
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(err) => {
            warn!("webhook: malformed update: {err}");
            return StatusCode::BAD_REQUEST;
        }
    };

    debug!("webhook: update {}", update.update_id);
    match state.updates.send(update).await {
        Ok(()) => StatusCode::OK,
        // The server redelivers on any non-2xx answer.
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
