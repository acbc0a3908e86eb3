use std::sync::Arc;

use sha2::{Digest, Sha256};

use super::request::{AsymmetricSignRequest, KeyHandle, KeyManagement};
use super::signer::ContentSigner;
use crate::certificates::CertificateChain;
use crate::error::SigningError;

/// Signer whose private key lives in a remote KMS.
///
/// Each `sign` computes the SHA-256 digest locally and sends only the digest,
/// with its CRC32C, to the service. Holds no mutable state, so one instance
/// can serve concurrent callers.
pub struct RemoteSigner {
    kms: Arc<dyn KeyManagement>,
    key: KeyHandle,
    chain: CertificateChain,
    algorithm: String,
}

impl RemoteSigner {
    pub fn new(
        kms: Arc<dyn KeyManagement>,
        key: KeyHandle,
        chain: CertificateChain,
        algorithm: impl Into<String>,
    ) -> Self {
        Self {
            kms,
            key,
            chain,
            algorithm: algorithm.into(),
        }
    }

    pub fn chain(&self) -> &CertificateChain {
        &self.chain
    }
}

impl ContentSigner for RemoteSigner {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SigningError> {
        let digest: [u8; 32] = Sha256::digest(data).into();
        let request = AsymmetricSignRequest::sha256(self.key.clone(), digest);

        let response = self
            .kms
            .asymmetric_sign(&request)
            .map_err(SigningError::remote)?;
        response.verify(&request).map_err(SigningError::remote)?;

        Ok(response.signature)
    }

    fn public_key(&self) -> Vec<u8> {
        self.chain.as_pem().as_bytes().to_vec()
    }

    fn algorithm(&self) -> &str {
        &self.algorithm
    }
}
