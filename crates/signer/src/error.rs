use axum::http::StatusCode;
use axum_core::response::{IntoResponse as AxumCoreIntoResponse, Response};
use std::error::Error;

pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("No active certificate available in pool {pool}")]
    NoActiveCertificate { pool: String },
    #[error("Remote signing failed: {0}")]
    RemoteSigning(#[source] BoxError),
    #[error("Failed to list certificates in pool {pool}: {source}")]
    CertificatePool {
        pool: String,
        #[source]
        source: BoxError,
    },
    #[error("Malformed certificate chain: {0}")]
    ChainEncoding(String),
    #[error("Leaf certificate does not match key {key}")]
    KeyMismatch { key: String },
    #[error("Unsupported signing algorithm {0}")]
    UnsupportedAlgorithm(String),
}

impl SigningError {
    pub(crate) fn remote(error: impl Into<BoxError>) -> Self {
        Self::RemoteSigning(error.into())
    }
}

/// Integrity failures detected in a remote signing response.
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    #[error("remote service did not verify the digest checksum")]
    DigestChecksumNotVerified,
    #[error("signature checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    SignatureChecksumMismatch { expected: u32, actual: u32 },
    #[error("response names key {actual}, request named {expected}")]
    KeyNameMismatch { expected: String, actual: String },
    #[error("public key checksum mismatch")]
    PublicKeyChecksumMismatch,
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error("Signing task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::Task(error.to_string())
    }
}

/// Trait implementation to convert this error into an axum http response
impl AxumCoreIntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::Signing(no_cert @ SigningError::NoActiveCertificate { .. }) => {
                (StatusCode::SERVICE_UNAVAILABLE, no_cert.to_string()).into_response()
            }
            ServerError::Signing(
                upstream @ (SigningError::RemoteSigning(_) | SigningError::CertificatePool { .. }),
            ) => (StatusCode::BAD_GATEWAY, upstream.to_string()).into_response(),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something wrong happened.",
            )
                .into_response(),
        }
    }
}
