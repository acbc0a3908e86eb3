use std::sync::Arc;

use crate::certificates::{CertificateChainSelector, CertificatePool, ensure_chain_matches_key};
use crate::error::SigningError;
use crate::signing::{KeyHandle, KeyManagement, RemoteSigner};

/// Opens signing sessions: one chain selection, then a signer bound to that chain.
///
/// Certificates are fetched anew for every session.
pub struct SigningService {
    kms: Arc<dyn KeyManagement>,
    selector: CertificateChainSelector<Arc<dyn CertificatePool>>,
    pool_ref: String,
    key: KeyHandle,
    algorithm: String,
    expected_spki: Option<Vec<u8>>,
}

impl SigningService {
    pub fn new(
        kms: Arc<dyn KeyManagement>,
        pool: Arc<dyn CertificatePool>,
        pool_ref: impl Into<String>,
        key: KeyHandle,
        algorithm: impl Into<String>,
    ) -> Self {
        Self {
            kms,
            selector: CertificateChainSelector::new(pool),
            pool_ref: pool_ref.into(),
            key,
            algorithm: algorithm.into(),
            expected_spki: None,
        }
    }

    /// Require the selected leaf to certify this SubjectPublicKeyInfo.
    pub fn with_expected_key(mut self, spki_der: Vec<u8>) -> Self {
        self.expected_spki = Some(spki_der);
        self
    }

    pub fn key(&self) -> &KeyHandle {
        &self.key
    }

    pub fn open_session(&self) -> Result<RemoteSigner, SigningError> {
        let chain = self.selector.select_active_chain(&self.pool_ref)?;
        if let Some(spki) = &self.expected_spki {
            ensure_chain_matches_key(&chain, &self.key, spki)?;
        }
        Ok(RemoteSigner::new(
            self.kms.clone(),
            self.key.clone(),
            chain,
            self.algorithm.clone(),
        ))
    }
}
