use std::sync::Arc;

use anyhow::Result;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, SigningError};
use crate::session::SigningService;
use crate::signing::ContentSigner;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SigningService>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CertificateResponse {
    pub certificate_chain: String,
    pub algorithm: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignResponse {
    /// Hex-encoded raw signature.
    pub signature: String,
    pub certificate_chain: String,
    pub algorithm: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(|| async move { (StatusCode::OK, "Ok").into_response() }))
        .route("/certificate", get(certificate_handler))
        .route("/sign", post(sign_handler))
        .with_state(state)
}

pub async fn run(host: String, port: u16, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn chain_text(signer: &dyn ContentSigner) -> String {
    String::from_utf8_lossy(&signer.public_key()).into_owned()
}

async fn certificate_handler(
    State(state): State<AppState>,
) -> Result<Json<CertificateResponse>, ServerError> {
    let service = state.service.clone();
    let response = tokio::task::spawn_blocking(move || -> Result<_, SigningError> {
        let signer = service.open_session()?;
        Ok(CertificateResponse {
            certificate_chain: chain_text(&signer),
            algorithm: signer.algorithm().to_string(),
        })
    })
    .await?
    .inspect_err(|e| tracing::warn!(error = %e, "certificate lookup failed"))?;

    Ok(Json(response))
}

/// Signs the raw request body in a fresh session.
async fn sign_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SignResponse>, ServerError> {
    let service = state.service.clone();
    let len = body.len();
    let response = tokio::task::spawn_blocking(move || -> Result<_, SigningError> {
        let signer = service.open_session()?;
        let signature = signer.sign(&body)?;
        Ok(SignResponse {
            signature: hex::encode(signature),
            certificate_chain: chain_text(&signer),
            algorithm: signer.algorithm().to_string(),
        })
    })
    .await?
    .inspect_err(|e| tracing::warn!(error = %e, "signing failed"))?;

    tracing::info!(bytes = len, algorithm = %response.algorithm, "signed payload");
    Ok(Json(response))
}
