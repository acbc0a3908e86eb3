use super::record::CertificateRecord;
use crate::error::SigningError;

const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// Leaf certificate followed by its intermediates, newline-joined for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateChain {
    blocks: Vec<String>,
    der: Vec<Vec<u8>>,
    encoded: String,
}

impl CertificateChain {
    /// Builds a chain from PEM blocks, leaf first.
    ///
    /// Every block must carry PEM framing with the `CERTIFICATE` tag.
    pub fn from_pem_blocks(blocks: Vec<String>) -> Result<Self, SigningError> {
        if blocks.is_empty() {
            return Err(SigningError::ChainEncoding("empty chain".into()));
        }
        let mut der = Vec::with_capacity(blocks.len());
        for (index, block) in blocks.iter().enumerate() {
            let parsed = pem::parse(block).map_err(|e| {
                SigningError::ChainEncoding(format!("block {index}: {e}"))
            })?;
            if parsed.tag() != CERTIFICATE_TAG {
                return Err(SigningError::ChainEncoding(format!(
                    "block {index}: unexpected PEM tag {}",
                    parsed.tag()
                )));
            }
            der.push(parsed.into_contents());
        }
        let encoded = blocks.join("\n");
        Ok(Self {
            blocks,
            der,
            encoded,
        })
    }

    pub fn from_record(record: &CertificateRecord) -> Result<Self, SigningError> {
        let mut blocks = Vec::with_capacity(1 + record.intermediate_pems.len());
        blocks.push(record.leaf_pem.clone());
        blocks.extend(record.intermediate_pems.iter().cloned());
        Self::from_pem_blocks(blocks)
    }

    pub fn leaf(&self) -> &str {
        &self.blocks[0]
    }

    /// DER contents of each block, in chain order.
    pub fn der_blocks(&self) -> &[Vec<u8>] {
        &self.der
    }

    pub fn as_pem(&self) -> &str {
        &self.encoded
    }
}
