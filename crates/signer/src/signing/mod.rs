mod signer;
mod request;
mod remote;
#[cfg(feature = "c2pa")]
mod embed;

pub use signer::ContentSigner;
pub use request::{
    AsymmetricSignRequest, AsymmetricSignResponse, DigestAlgorithm, KeyHandle, KeyManagement,
    PublicKeyPem, crc32c_of,
};
pub use remote::RemoteSigner;
#[cfg(feature = "c2pa")]
pub use embed::C2paSigner;
