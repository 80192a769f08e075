use base64::Engine as _;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use crate::error::RelayError;

type HmacSha256 = Hmac<Sha256>;

const MAC_LEN: usize = 32;

/// Helper to create an HMAC instance, resolving trait ambiguity.
fn new_hmac(key: &[u8]) -> Result<HmacSha256, RelayError> {
    <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|e| RelayError::Crypto(format!("HMAC init failed: {e}")))
}

/// HMAC-SHA256 signing for session cookies and the OAuth state parameter.
pub struct Signer {
    key: Vec<u8>,
}

impl Signer {
    pub fn new(secret: &str) -> Result<Self, RelayError> {
        if secret.is_empty() {
            return Err(RelayError::Crypto("signing secret must not be empty".into()));
        }
        Ok(Self {
            key: secret.as_bytes().to_vec(),
        })
    }

    /// Sign a payload. Returns base64url(hmac || payload).
    pub fn sign(&self, payload: &str) -> Result<String, RelayError> {
        let mut mac = new_hmac(&self.key)?;
        mac.update(payload.as_bytes());
        let signature = mac.finalize().into_bytes();

        let mut combined = signature.to_vec();
        combined.extend_from_slice(payload.as_bytes());

        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&combined))
    }

    /// Verify and extract a signed payload.
    pub fn verify(&self, signed: &str) -> Result<String, RelayError> {
        let combined = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(signed)
            .map_err(|_| RelayError::InvalidState)?;

        if combined.len() < MAC_LEN {
            return Err(RelayError::InvalidState);
        }

        let (signature, payload_bytes) = combined.split_at(MAC_LEN);

        let mut mac = new_hmac(&self.key)?;
        mac.update(payload_bytes);
        mac.verify_slice(signature)
            .map_err(|_| RelayError::InvalidState)?;

        String::from_utf8(payload_bytes.to_vec()).map_err(|_| RelayError::InvalidState)
    }
}

/// 32 random bytes, base64url without padding.
pub fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
