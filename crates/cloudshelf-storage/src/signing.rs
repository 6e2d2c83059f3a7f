//! HMAC-SHA256 signed object URLs.
//!
//! A signed URL is `{base}/{bucket}/{path}?expires={unix}&signature={hex}`
//! where the signature covers bucket, path, and expiry. Whoever holds the
//! URL may read the object until it expires.

use std::time::Duration;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use cloudshelf_core::error::AppError;
use cloudshelf_core::result::AppResult;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies object URLs with a shared secret.
#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
    base_url: String,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl UrlSigner {
    /// Create a signer for URLs rooted at `base_url`.
    pub fn new(secret: impl AsRef<[u8]>, base_url: impl Into<String>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn mac(&self, bucket: &str, path: &str, expires: i64) -> AppResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| AppError::configuration("Invalid signing secret"))?;
        mac.update(bucket.as_bytes());
        mac.update(b"\n");
        mac.update(path.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }

    /// Hex signature for an object and expiry.
    pub fn signature(&self, bucket: &str, path: &str, expires: i64) -> AppResult<String> {
        let mac = self.mac(bucket, path, expires)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Build a URL valid for `ttl` from `now`.
    pub fn sign_at(
        &self,
        bucket: &str,
        path: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> AppResult<String> {
        let path = path.trim_start_matches('/');
        let expires = now.timestamp() + ttl.as_secs() as i64;
        let signature = self.signature(bucket, path, expires)?;
        Ok(format!(
            "{}/{bucket}/{path}?expires={expires}&signature={signature}",
            self.base_url
        ))
    }

    /// Build a URL valid for `ttl` from now.
    pub fn sign(&self, bucket: &str, path: &str, ttl: Duration) -> AppResult<String> {
        self.sign_at(bucket, path, ttl, Utc::now())
    }

    /// Check a presented signature in constant time.
    ///
    /// Expired links and malformed signatures are rejected as
    /// `PermissionDenied`.
    pub fn verify(
        &self,
        bucket: &str,
        path: &str,
        expires: i64,
        signature: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if now.timestamp() > expires {
            return Err(AppError::permission_denied("Signed URL has expired"));
        }

        let presented = hex::decode(signature)
            .map_err(|_| AppError::permission_denied("Malformed URL signature"))?;

        self.mac(bucket, path.trim_start_matches('/'), expires)?
            .verify_slice(&presented)
            .map_err(|_| AppError::permission_denied("Invalid URL signature"))
    }
}
