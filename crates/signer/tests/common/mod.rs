#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Duration, Utc};
use p256::ecdsa::signature::hazmat::PrehashSigner;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rcgen::{CertificateParams, KeyPair};
use x509_parser::parse_x509_certificate;

use kms_c2pa_signer::certificates::{CertificatePool, CertificateRecord, RevocationState};
use kms_c2pa_signer::signing::{
    AsymmetricSignRequest, AsymmetricSignResponse, KeyHandle, KeyManagement, PublicKeyPem,
    crc32c_of,
};

pub const KEY_NAME: &str =
    "projects/p/locations/global/keyRings/c2pa/cryptoKeys/signer/cryptoKeyVersions/1";
pub const POOL: &str = "projects/p/locations/us-central1/caPools/c2pa";

pub fn key_handle() -> KeyHandle {
    KeyHandle::new(KEY_NAME)
}

pub fn pem_block(body: &str) -> String {
    format!("-----BEGIN CERTIFICATE-----\n{body}\n-----END CERTIFICATE-----")
}

/// ECDSA P-256 key pair plus a self-signed leaf certificate for it.
pub struct TestKey {
    pub key_pair: KeyPair,
    pub certificate_pem: String,
}

impl TestKey {
    pub fn generate() -> Self {
        let key_pair = KeyPair::generate().unwrap();
        let params = CertificateParams::new(vec!["signer.test".to_string()]).unwrap();
        let certificate_pem = params.self_signed(&key_pair).unwrap().pem();
        Self {
            key_pair,
            certificate_pem,
        }
    }

    pub fn signing_key(&self) -> SigningKey {
        SigningKey::from_pkcs8_der(&self.key_pair.serialize_der()).unwrap()
    }
}

/// Verifying key certified by the first PEM block of `chain`.
pub fn leaf_verifying_key(chain: &[u8]) -> VerifyingKey {
    let chain = std::str::from_utf8(chain).unwrap();
    let leaf = pem::parse(chain).unwrap();
    let (_, certificate) = parse_x509_certificate(leaf.contents()).unwrap();
    VerifyingKey::from_public_key_der(certificate.public_key().raw).unwrap()
}

pub enum Behaviour {
    Sign,
    Fail,
    DropDigestAck,
    CorruptSignature,
}

/// In-memory KMS holding a real P-256 key.
pub struct FakeKms {
    key: TestKey,
    behaviour: Behaviour,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<AsymmetricSignRequest>>,
}

impl FakeKms {
    pub fn new(key: TestKey, behaviour: Behaviour) -> Self {
        Self {
            key,
            behaviour,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn leaf_pem(&self) -> &str {
        &self.key.certificate_pem
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl KeyManagement for FakeKms {
    fn asymmetric_sign(
        &self,
        request: &AsymmetricSignRequest,
    ) -> anyhow::Result<AsymmetricSignResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Behaviour::Fail = self.behaviour {
            anyhow::bail!("PERMISSION_DENIED: caller lacks cloudkms.cryptoKeyVersions.useToSign");
        }
        anyhow::ensure!(
            crc32c_of(&request.digest) == request.digest_crc32c,
            "digest checksum mismatch"
        );

        let signature: Signature = self.key.signing_key().sign_prehash(&request.digest)?;
        let signature = signature.to_bytes().to_vec();
        let mut response = AsymmetricSignResponse {
            key_name: Some(request.key.to_string()),
            signature_crc32c: Some(crc32c_of(&signature)),
            signature,
            verified_digest_crc32c: true,
        };
        match self.behaviour {
            Behaviour::DropDigestAck => response.verified_digest_crc32c = false,
            Behaviour::CorruptSignature => response.signature[0] ^= 0xff,
            _ => {}
        }
        Ok(response)
    }

    fn public_key(&self, _key: &KeyHandle) -> anyhow::Result<PublicKeyPem> {
        let pem = self.key.key_pair.public_key_pem();
        Ok(PublicKeyPem {
            pem_crc32c: Some(crc32c_of(pem.as_bytes())),
            pem,
        })
    }
}

/// Pool that honours the state filter and returns records in insertion order.
#[derive(Default)]
pub struct FakePool {
    pub records: Vec<CertificateRecord>,
    pub fail: bool,
    pub queries: Mutex<Vec<(String, RevocationState)>>,
}

impl FakePool {
    pub fn with(records: Vec<CertificateRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }
}

impl CertificatePool for FakePool {
    fn list_certificates(
        &self,
        pool: &str,
        state: RevocationState,
    ) -> anyhow::Result<Vec<CertificateRecord>> {
        self.queries
            .lock()
            .unwrap()
            .push((pool.to_string(), state.clone()));
        if self.fail {
            anyhow::bail!("UNAVAILABLE: privateca.googleapis.com");
        }
        Ok(self
            .records
            .iter()
            .filter(|record| record.revocation_state == state)
            .cloned()
            .collect())
    }
}

pub fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-06-01T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

pub fn record(
    id: &str,
    leaf_pem: &str,
    created_days_ago: i64,
    expires_in_days: Option<i64>,
    state: RevocationState,
) -> CertificateRecord {
    CertificateRecord {
        id: id.to_string(),
        leaf_pem: leaf_pem.to_string(),
        intermediate_pems: vec![],
        created_at: now() - Duration::days(created_days_ago),
        expires_at: expires_in_days.map(|days| now() + Duration::days(days)),
        revocation_state: state,
    }
}
