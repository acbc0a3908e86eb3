//! Bridge from [`RemoteSigner`] to the manifest signer of the `c2pa` crate.

use std::str::FromStr;

use c2pa::SigningAlg;

use super::remote::RemoteSigner;
use super::signer::ContentSigner;
use crate::error::SigningError;

/// Room for COSE headers, the claim signature box and padding.
const BASE_RESERVE: usize = 10 * 1024;
/// Largest signature we expect back: RSA-4096.
const SIGNATURE_RESERVE: usize = 512;

/// [`c2pa::Signer`] that embeds the session's chain and signs remotely.
pub struct C2paSigner {
    inner: RemoteSigner,
    alg: SigningAlg,
    certs: Vec<Vec<u8>>,
}

impl C2paSigner {
    /// Fails when the algorithm id is not a C2PA signing algorithm.
    pub fn new(inner: RemoteSigner) -> Result<Self, SigningError> {
        let alg = SigningAlg::from_str(inner.algorithm())
            .map_err(|_| SigningError::UnsupportedAlgorithm(inner.algorithm().to_string()))?;
        let certs = inner.chain().der_blocks().to_vec();
        Ok(Self { inner, alg, certs })
    }
}

impl c2pa::Signer for C2paSigner {
    // TODO: EC keys in Cloud KMS answer with DER-encoded ECDSA signatures;
    // convert them to the fixed-width r||s form COSE expects for es256/es384.
    fn sign(&self, data: &[u8]) -> c2pa::Result<Vec<u8>> {
        ContentSigner::sign(&self.inner, data).map_err(|e| c2pa::Error::OtherError(Box::new(e)))
    }

    fn alg(&self) -> SigningAlg {
        self.alg
    }

    fn certs(&self) -> c2pa::Result<Vec<Vec<u8>>> {
        Ok(self.certs.clone())
    }

    fn reserve_size(&self) -> usize {
        BASE_RESERVE + SIGNATURE_RESERVE + self.certs.iter().map(Vec::len).sum::<usize>()
    }
}
