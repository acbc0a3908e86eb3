mod record;
mod chain;
mod selector;
mod key_match;

pub use record::{CertificatePool, CertificateRecord, RevocationState};
pub use chain::CertificateChain;
pub use selector::CertificateChainSelector;
pub use key_match::{ensure_chain_matches_key, spki_der_from_public_key_pem};
