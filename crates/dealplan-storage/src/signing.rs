//! HMAC signatures for local-backend file URLs.
//!
//! Message: `"{bucket}/{key}:{expires}"`, where `expires` is a unix timestamp.
//! Signature: lowercase hex of HMAC-SHA256(secret, message).

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Malformed signature")]
    Malformed,
    #[error("Signature mismatch")]
    Mismatch,
    #[error("Signed URL has expired")]
    Expired,
}

#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner").finish_non_exhaustive()
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl UrlSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    fn mac(&self, bucket: &str, key: &str, expires: u64) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key size");
        mac.update(format!("{}/{}:{}", bucket, key, expires).as_bytes());
        mac
    }

    /// Expiry timestamp for a URL issued now
    pub fn expiry_from_now(expires_in: Duration) -> u64 {
        now_unix().saturating_add(expires_in.as_secs())
    }

    pub fn sign(&self, bucket: &str, key: &str, expires: u64) -> String {
        hex::encode(self.mac(bucket, key, expires).finalize().into_bytes())
    }

    /// Check a signature in constant time, then its expiry
    pub fn verify(
        &self,
        bucket: &str,
        key: &str,
        expires: u64,
        signature: &str,
    ) -> Result<(), SignatureError> {
        self.verify_at(bucket, key, expires, signature, now_unix())
    }

    fn verify_at(
        &self,
        bucket: &str,
        key: &str,
        expires: u64,
        signature: &str,
        now: u64,
    ) -> Result<(), SignatureError> {
        let tag = hex::decode(signature).map_err(|_| SignatureError::Malformed)?;
        self.mac(bucket, key, expires)
            .verify_slice(&tag)
            .map_err(|_| SignatureError::Mismatch)?;
        if now > expires {
            return Err(SignatureError::Expired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_roundtrip() {
        let signer = UrlSigner::new("local-signing-secret-for-tests-0123456789");
        let expires = UrlSigner::expiry_from_now(Duration::from_secs(60));
        let signature = signer.sign("inputs-files", "3/inputs/brief.pdf", expires);
        assert_eq!(signature.len(), 64);
        assert!(signer
            .verify("inputs-files", "3/inputs/brief.pdf", expires, &signature)
            .is_ok());
    }

    #[test]
    fn test_tampered_values_rejected() {
        let signer = UrlSigner::new("secret");
        let signature = signer.sign("inputs-files", "3/inputs/brief.pdf", 2_000);

        assert_eq!(
            signer.verify_at("inputs-files", "3/inputs/other.pdf", 2_000, &signature, 1_000),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            signer.verify_at("inputs-files", "3/inputs/brief.pdf", 9_000, &signature, 1_000),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            signer.verify_at("inputs-files", "3/inputs/brief.pdf", 2_000, "zz", 1_000),
            Err(SignatureError::Malformed)
        );
        assert_eq!(
            UrlSigner::new("other").verify_at(
                "inputs-files",
                "3/inputs/brief.pdf",
                2_000,
                &signature,
                1_000
            ),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_expired_signature_rejected() {
        let signer = UrlSigner::new("secret");
        let signature = signer.sign("artifacts-files", "opportunities/1/dsp-v1.md", 100);
        assert_eq!(
            signer.verify_at("artifacts-files", "opportunities/1/dsp-v1.md", 100, &signature, 101),
            Err(SignatureError::Expired)
        );
        assert!(signer
            .verify_at("artifacts-files", "opportunities/1/dsp-v1.md", 100, &signature, 100)
            .is_ok());
    }
}
