use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;

use super::read_json;

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Tokens are refreshed this long before the metadata server says they expire.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Where bearer tokens for Google APIs come from.
#[derive(Debug, Clone)]
pub enum TokenSource {
    Static(String),
    /// The attached service account, via the GCE metadata server.
    MetadataServer(MetadataTokens),
}

impl TokenSource {
    pub fn token(&self, http: &Client) -> Result<String> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::MetadataServer(tokens) => tokens.token(http),
        }
    }
}

/// Metadata-server token, cached until shortly before it expires.
///
/// Clones share one cache, so the KMS and CA clients fetch a single token.
#[derive(Debug, Clone)]
pub struct MetadataTokens {
    url: String,
    cache: Arc<Mutex<Option<CachedToken>>>,
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
    expires_in: u64,
}

impl Default for MetadataTokens {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataTokens {
    pub fn new() -> Self {
        Self::with_url(METADATA_TOKEN_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cache: Arc::new(Mutex::new(None)),
        }
    }

    pub fn token(&self, http: &Client) -> Result<String> {
        // Held across the fetch so concurrent callers wait for one refresh.
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.as_ref().filter(|c| Instant::now() < c.refresh_at) {
            return Ok(cached.value.clone());
        }

        let response = http
            .get(&self.url)
            .header("Metadata-Flavor", "Google")
            .send()
            .context("requesting token from metadata server")?;
        let token: MetadataToken = read_json(response, "metadata server")?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(REFRESH_MARGIN);
        tracing::debug!(expires_in = token.expires_in, "fetched metadata server token");

        *cache = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }
}
