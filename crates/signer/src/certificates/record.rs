use std::sync::Arc;

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevocationState {
    Active,
    Revoked,
    /// Any other terminal state reported by the authority.
    Other(String),
}

/// Snapshot of one issued certificate, as returned by the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    pub id: String,
    pub leaf_pem: String,
    /// Intermediates in the order the authority returned them.
    pub intermediate_pems: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// `None` means the certificate never expires.
    pub expires_at: Option<DateTime<Utc>>,
    pub revocation_state: RevocationState,
}

impl CertificateRecord {
    pub fn is_active(&self) -> bool {
        self.revocation_state == RevocationState::Active
    }

    /// Expired only when the expiry is strictly before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }
}

/// Query side of a certificate pool.
///
/// The store makes no ordering promise for the returned records.
pub trait CertificatePool: Send + Sync {
    fn list_certificates(
        &self,
        pool: &str,
        state: RevocationState,
    ) -> anyhow::Result<Vec<CertificateRecord>>;
}

impl<T: CertificatePool + ?Sized> CertificatePool for Arc<T> {
    fn list_certificates(
        &self,
        pool: &str,
        state: RevocationState,
    ) -> anyhow::Result<Vec<CertificateRecord>> {
        (**self).list_certificates(pool, state)
    }
}
