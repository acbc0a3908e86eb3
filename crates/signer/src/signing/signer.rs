use crate::error::SigningError;

/// Signing capability consumed by manifest embedding.
///
/// Implementations are sync. Async callers should move `sign` onto a
/// blocking thread with `spawn_blocking`.
pub trait ContentSigner: Send + Sync {
    /// Sign the exact bytes that will later be verified. Returns raw signature bytes.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SigningError>;

    /// PEM certificate chain, leaf first.
    fn public_key(&self) -> Vec<u8>;

    /// Algorithm identifier string (e.g. "ps256").
    fn algorithm(&self) -> &str;
}
