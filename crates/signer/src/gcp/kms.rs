use std::collections::BTreeMap;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{TokenSource, parse_checksum, read_json};
use crate::signing::{
    AsymmetricSignRequest, AsymmetricSignResponse, KeyHandle, KeyManagement, PublicKeyPem,
};

pub const DEFAULT_KMS_ENDPOINT: &str = "https://cloudkms.googleapis.com";

/// Cloud KMS over its REST API.
pub struct CloudKms {
    http: Client,
    tokens: TokenSource,
    endpoint: String,
}

impl CloudKms {
    pub fn new(http: Client, tokens: TokenSource) -> Self {
        Self::with_endpoint(http, tokens, DEFAULT_KMS_ENDPOINT)
    }

    pub fn with_endpoint(http: Client, tokens: TokenSource, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            tokens,
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignBody {
    digest: BTreeMap<&'static str, String>,
    digest_crc32c: String,
}

impl From<&AsymmetricSignRequest> for SignBody {
    fn from(request: &AsymmetricSignRequest) -> Self {
        let mut digest = BTreeMap::new();
        digest.insert(request.digest_algorithm.as_str(), BASE64.encode(request.digest));
        Self {
            digest,
            digest_crc32c: request.digest_crc32c.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignReply {
    #[serde(default)]
    name: Option<String>,
    signature: String,
    #[serde(default)]
    signature_crc32c: Option<String>,
    #[serde(default)]
    verified_digest_crc32c: bool,
}

impl TryFrom<SignReply> for AsymmetricSignResponse {
    type Error = anyhow::Error;

    fn try_from(reply: SignReply) -> Result<Self> {
        Ok(Self {
            key_name: reply.name,
            signature: BASE64
                .decode(&reply.signature)
                .context("decoding signature")?,
            signature_crc32c: reply
                .signature_crc32c
                .as_deref()
                .map(parse_checksum)
                .transpose()?,
            verified_digest_crc32c: reply.verified_digest_crc32c,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublicKeyReply {
    pem: String,
    #[serde(default)]
    pem_crc32c: Option<String>,
}

impl TryFrom<PublicKeyReply> for PublicKeyPem {
    type Error = anyhow::Error;

    fn try_from(reply: PublicKeyReply) -> Result<Self> {
        Ok(Self {
            pem_crc32c: reply.pem_crc32c.as_deref().map(parse_checksum).transpose()?,
            pem: reply.pem,
        })
    }
}

impl KeyManagement for CloudKms {
    fn asymmetric_sign(&self, request: &AsymmetricSignRequest) -> Result<AsymmetricSignResponse> {
        let url = format!("{}/v1/{}:asymmetricSign", self.endpoint, request.key);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.tokens.token(&self.http)?)
            .json(&SignBody::from(request))
            .send()
            .context("calling asymmetricSign")?;
        let reply: SignReply = read_json(response, "asymmetricSign")?;
        reply.try_into()
    }

    fn public_key(&self, key: &KeyHandle) -> Result<PublicKeyPem> {
        let url = format!("{}/v1/{}/publicKey", self.endpoint, key);
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.tokens.token(&self.http)?)
            .send()
            .context("calling getPublicKey")?;
        let reply: PublicKeyReply = read_json(response, "getPublicKey")?;
        reply.try_into()
    }
}
