use chrono::{DateTime, Utc};

use super::chain::CertificateChain;
use super::record::{CertificatePool, CertificateRecord, RevocationState};
use crate::error::SigningError;

/// Picks the newest active, unexpired certificate from a pool.
pub struct CertificateChainSelector<P> {
    pool: P,
}

impl<P: CertificatePool> CertificateChainSelector<P> {
    pub fn new(pool: P) -> Self {
        Self { pool }
    }

    pub fn select_active_chain(&self, pool_ref: &str) -> Result<CertificateChain, SigningError> {
        self.select_active_chain_at(pool_ref, Utc::now())
    }

    /// Same as [`select_active_chain`](Self::select_active_chain) with a fixed "now".
    pub fn select_active_chain_at(
        &self,
        pool_ref: &str,
        now: DateTime<Utc>,
    ) -> Result<CertificateChain, SigningError> {
        let records = self
            .pool
            .list_certificates(pool_ref, RevocationState::Active)
            .map_err(|e| SigningError::CertificatePool {
                pool: pool_ref.to_string(),
                source: e.into(),
            })?;

        // A record whose PEM does not parse is skipped; its error is only
        // reported when no other usable record parses either.
        let mut first_error = None;
        for record in usable_newest_first(records, now) {
            match CertificateChain::from_record(&record) {
                Ok(chain) => return Ok(chain),
                Err(error) => {
                    first_error.get_or_insert(error);
                }
            }
        }

        Err(first_error.unwrap_or_else(|| SigningError::NoActiveCertificate {
            pool: pool_ref.to_string(),
        }))
    }
}

/// Sorts client-side, newest first; the store is not asked to order.
fn usable_newest_first(
    mut records: Vec<CertificateRecord>,
    now: DateTime<Utc>,
) -> impl Iterator<Item = CertificateRecord> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records
        .into_iter()
        .filter(CertificateRecord::is_active)
        .filter(move |record| !record.is_expired_at(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap()
    }

    fn record(id: &str, created: u32, expires: Option<u32>) -> CertificateRecord {
        CertificateRecord {
            id: id.into(),
            leaf_pem: String::new(),
            intermediate_pems: vec![],
            created_at: at(created),
            expires_at: expires.map(at),
            revocation_state: RevocationState::Active,
        }
    }

    fn ids(records: Vec<CertificateRecord>, now: DateTime<Utc>) -> Vec<String> {
        usable_newest_first(records, now).map(|r| r.id).collect()
    }

    #[test]
    fn newest_first_regardless_of_store_order() {
        let records = vec![record("a", 1, None), record("c", 3, None), record("b", 2, None)];
        assert_eq!(ids(records, at(10)), vec!["c", "b", "a"]);
    }

    #[test]
    fn expiry_equal_to_now_is_still_usable() {
        let records = vec![record("a", 1, Some(10))];
        assert_eq!(ids(records, at(10)), vec!["a"]);
    }

    #[test]
    fn expired_newer_record_falls_back_to_older() {
        let records = vec![record("old", 1, Some(20)), record("new", 5, Some(9))];
        assert_eq!(ids(records, at(10)), vec!["old"]);
    }

    #[test]
    fn non_active_states_skipped() {
        let mut revoked = record("revoked", 5, None);
        revoked.revocation_state = RevocationState::Revoked;
        let mut held = record("held", 4, None);
        held.revocation_state = RevocationState::Other("CERTIFICATE_HOLD".into());
        let records = vec![revoked, held, record("ok", 1, None)];
        assert_eq!(ids(records, at(10)), vec!["ok"]);
    }

    #[test]
    fn nothing_usable() {
        assert!(ids(vec![], at(10)).is_empty());
        assert!(ids(vec![record("x", 1, Some(2))], at(10)).is_empty());
    }
}
