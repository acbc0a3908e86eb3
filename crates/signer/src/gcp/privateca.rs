use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{TokenSource, read_json};
use crate::certificates::{CertificatePool, CertificateRecord, RevocationState};

pub const DEFAULT_PRIVATECA_ENDPOINT: &str = "https://privateca.googleapis.com";

const ACTIVE_FILTER: &str = "revocation_details.revocation_state = ACTIVE";

/// Certificate Authority Service pool over its REST API.
///
/// Listing asks for no server-side ordering.
pub struct PrivateCa {
    http: Client,
    tokens: TokenSource,
    endpoint: String,
}

impl PrivateCa {
    pub fn new(http: Client, tokens: TokenSource) -> Self {
        Self::with_endpoint(http, tokens, DEFAULT_PRIVATECA_ENDPOINT)
    }

    pub fn with_endpoint(http: Client, tokens: TokenSource, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            tokens,
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListReply {
    #[serde(default)]
    certificates: Vec<CertificateJson>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CertificateJson {
    name: String,
    pem_certificate: String,
    #[serde(default)]
    pem_certificate_chain: Vec<String>,
    create_time: DateTime<Utc>,
    #[serde(default)]
    certificate_description: Option<CertificateDescription>,
    #[serde(default)]
    revocation_details: Option<RevocationDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CertificateDescription {
    #[serde(default)]
    subject_description: Option<SubjectDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubjectDescription {
    #[serde(default)]
    not_after_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RevocationDetails {
    #[serde(default)]
    revocation_state: Option<String>,
}

/// A certificate is active while `revocationDetails` is absent.
fn revocation_state(details: Option<RevocationDetails>) -> RevocationState {
    match details {
        None => RevocationState::Active,
        Some(details) => match details.revocation_state.as_deref() {
            Some("ACTIVE") => RevocationState::Active,
            None | Some("REVOKED") => RevocationState::Revoked,
            Some(other) => RevocationState::Other(other.to_string()),
        },
    }
}

impl From<CertificateJson> for CertificateRecord {
    fn from(certificate: CertificateJson) -> Self {
        let expires_at = certificate
            .certificate_description
            .and_then(|d| d.subject_description)
            .and_then(|s| s.not_after_time);
        Self {
            id: certificate.name,
            leaf_pem: certificate.pem_certificate,
            intermediate_pems: certificate.pem_certificate_chain,
            created_at: certificate.create_time,
            expires_at,
            revocation_state: revocation_state(certificate.revocation_details),
        }
    }
}

impl CertificatePool for PrivateCa {
    fn list_certificates(
        &self,
        pool: &str,
        state: RevocationState,
    ) -> Result<Vec<CertificateRecord>> {
        anyhow::ensure!(
            state == RevocationState::Active,
            "only ACTIVE certificates can be listed, got {state:?}"
        );

        let url = format!("{}/v1/{}/certificates", self.endpoint, pool);
        let token = self.tokens.token(&self.http)?;
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(&url)
                .bearer_auth(&token)
                .query(&[("filter", ACTIVE_FILTER)]);
            if let Some(page) = &page_token {
                request = request.query(&[("pageToken", page.as_str())]);
            }
            let response = request.send().context("calling listCertificates")?;
            let reply: ListReply = read_json(response, "listCertificates")?;

            records.extend(reply.certificates.into_iter().map(CertificateRecord::from));
            match reply.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        Ok(records)
    }
}
