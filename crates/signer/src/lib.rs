pub mod certificates;
pub mod error;
pub mod gcp;
pub mod server;
pub mod session;
pub mod signing;

pub use certificates::{CertificateChain, CertificateChainSelector, CertificatePool, CertificateRecord};
pub use error::{ServerError, SigningError};
pub use server::{AppState, router, run};
pub use session::SigningService;
pub use signing::{ContentSigner, KeyHandle, KeyManagement, RemoteSigner};
#[cfg(feature = "c2pa")]
pub use signing::C2paSigner;
