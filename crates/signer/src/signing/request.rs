use std::fmt;

use crate::error::IntegrityError;

/// CRC32C (Castagnoli) checksum, as expected by the remote signing service.
pub fn crc32c_of(bytes: &[u8]) -> u32 {
    crc32c::crc32c(bytes)
}

/// Resource name of one asymmetric key version in the remote KMS.
///
/// A reference to the key, never the key material.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyHandle(String);

impl KeyHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha256,
}

impl DigestAlgorithm {
    /// Field name used for the digest in the KMS request body.
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsymmetricSignRequest {
    pub key: KeyHandle,
    pub digest_algorithm: DigestAlgorithm,
    pub digest: [u8; 32],
    pub digest_crc32c: u32,
}

impl AsymmetricSignRequest {
    pub fn sha256(key: KeyHandle, digest: [u8; 32]) -> Self {
        Self {
            key,
            digest_algorithm: DigestAlgorithm::Sha256,
            digest_crc32c: crc32c_of(&digest),
            digest,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsymmetricSignResponse {
    /// Key version the service actually used, when reported.
    pub key_name: Option<String>,
    pub signature: Vec<u8>,
    pub signature_crc32c: Option<u32>,
    /// Whether the service checked `digest_crc32c` against the digest it received.
    pub verified_digest_crc32c: bool,
}

impl AsymmetricSignResponse {
    /// Check the service's acknowledgments against what was sent.
    pub fn verify(&self, request: &AsymmetricSignRequest) -> Result<(), IntegrityError> {
        if !self.verified_digest_crc32c {
            return Err(IntegrityError::DigestChecksumNotVerified);
        }
        if let Some(expected) = self.signature_crc32c {
            let actual = crc32c_of(&self.signature);
            if actual != expected {
                return Err(IntegrityError::SignatureChecksumMismatch { expected, actual });
            }
        }
        if let Some(name) = &self.key_name {
            if name != request.key.as_str() {
                return Err(IntegrityError::KeyNameMismatch {
                    expected: request.key.to_string(),
                    actual: name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Published public key of a KMS key version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyPem {
    pub pem: String,
    pub pem_crc32c: Option<u32>,
}

impl PublicKeyPem {
    pub fn verify(&self) -> Result<(), IntegrityError> {
        match self.pem_crc32c {
            Some(expected) if expected != crc32c_of(self.pem.as_bytes()) => {
                Err(IntegrityError::PublicKeyChecksumMismatch)
            }
            _ => Ok(()),
        }
    }
}

/// Remote asymmetric key operations.
///
/// Implementations block until the service responds; no retries.
pub trait KeyManagement: Send + Sync {
    fn asymmetric_sign(&self, request: &AsymmetricSignRequest) -> anyhow::Result<AsymmetricSignResponse>;

    fn public_key(&self, key: &KeyHandle) -> anyhow::Result<PublicKeyPem>;
}
