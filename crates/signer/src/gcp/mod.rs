//! Blocking REST clients for Cloud KMS and Certificate Authority Service.

mod auth;
mod kms;
mod privateca;

pub use auth::{MetadataTokens, TokenSource};
pub use kms::CloudKms;
pub use privateca::PrivateCa;

use anyhow::{Context, Result, bail};
use reqwest::blocking::Response;
use serde::de::DeserializeOwned;

fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        bail!("{what} returned {status}: {body}");
    }
    response.json().with_context(|| format!("decoding {what} response"))
}

/// Google encodes uint32 checksums as decimal strings.
fn parse_checksum(value: &str) -> Result<u32> {
    let wide: u64 = value
        .parse()
        .with_context(|| format!("invalid checksum {value:?}"))?;
    u32::try_from(wide).with_context(|| format!("checksum {wide} out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_checksums() {
        assert_eq!(parse_checksum("3808858755").unwrap(), 0xe306_9283);
        assert!(parse_checksum("4294967296").is_err());
        assert!(parse_checksum("abc").is_err());
    }
}
