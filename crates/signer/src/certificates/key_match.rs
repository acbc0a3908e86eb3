use x509_parser::parse_x509_certificate;

use super::chain::CertificateChain;
use crate::error::SigningError;
use crate::signing::KeyHandle;

/// DER SubjectPublicKeyInfo of a `PUBLIC KEY` PEM block.
pub fn spki_der_from_public_key_pem(public_key_pem: &str) -> Result<Vec<u8>, SigningError> {
    let parsed = pem::parse(public_key_pem)
        .map_err(|e| SigningError::ChainEncoding(format!("public key: {e}")))?;
    if parsed.tag() != "PUBLIC KEY" {
        return Err(SigningError::ChainEncoding(format!(
            "public key: unexpected PEM tag {}",
            parsed.tag()
        )));
    }
    Ok(parsed.into_contents())
}

/// Fails unless the chain's leaf certifies the key with SPKI `expected_spki`.
pub fn ensure_chain_matches_key(
    chain: &CertificateChain,
    key: &KeyHandle,
    expected_spki: &[u8],
) -> Result<(), SigningError> {
    let leaf = pem::parse(chain.leaf())
        .map_err(|e| SigningError::ChainEncoding(format!("leaf: {e}")))?;
    let (_, certificate) = parse_x509_certificate(leaf.contents())
        .map_err(|e| SigningError::ChainEncoding(format!("leaf: {e}")))?;

    if certificate.public_key().raw != expected_spki {
        return Err(SigningError::KeyMismatch {
            key: key.to_string(),
        });
    }
    Ok(())
}
