//! VAPID (RFC 8292) assertions for Web Push.
//!
//! The server identity is a raw P-256 private scalar stored as 32 bytes of
//! unpadded base64url. [`signing_key_from_raw`] is the single place that
//! validates it; the same scalar is the key-agreement secret and, unchanged,
//! the ES256 signing key.
//!
//! A token is `b64(header).b64(payload).b64(r || s)`, where `r` and `s` are
//! each left-padded to 32 bytes (raw JOSE form, not DER).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use p256::ecdsa::signature::hazmat::PrehashSigner;
use p256::ecdsa::{Signature, SigningKey};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use p256::{PublicKey, SecretKey};
use reqwest::Url;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Length of a raw P-256 private scalar.
pub const PRIVATE_KEY_LEN: usize = 32;

const JWT_HEADER: &str = r#"{"alg":"ES256","typ":"JWT"}"#;

#[derive(Debug, Error)]
pub enum VapidError {
    #[error("VAPID private key is not configured")]
    MissingKey,
    #[error("VAPID key is not valid base64url: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("invalid private key length: {0} (expected 32)")]
    InvalidLength(usize),
    #[error("private key is not a valid P-256 scalar")]
    InvalidScalar,
    #[error("push endpoint has no usable origin: {0}")]
    InvalidEndpoint(String),
    #[error("ES256 signing failed")]
    Signing,
}

/// Turn 32 raw bytes into an ES256 signing key.
///
/// Precondition: `raw` is a big-endian scalar in `[1, n)` for P-256. This is
/// the same check a P-256 key-agreement private key must pass; nothing else
/// validates key material.
pub fn signing_key_from_raw(raw: &[u8]) -> Result<SigningKey, VapidError> {
    if raw.len() != PRIVATE_KEY_LEN {
        return Err(VapidError::InvalidLength(raw.len()));
    }
    let secret = SecretKey::from_slice(raw).map_err(|_| VapidError::InvalidScalar)?;
    Ok(SigningKey::from(secret))
}

/// Uncompressed SEC1 public point (`0x04 || X || Y`) as unpadded base64url.
pub fn encode_public_key(key: &SigningKey) -> String {
    let point = PublicKey::from(key.verifying_key()).to_encoded_point(false);
    URL_SAFE_NO_PAD.encode(point.as_bytes())
}

/// `scheme://host[:port]` of a push endpoint, used as the `aud` claim.
pub fn audience_for(endpoint: &str) -> Result<String, VapidError> {
    let url = Url::parse(endpoint).map_err(|e| VapidError::InvalidEndpoint(e.to_string()))?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(VapidError::InvalidEndpoint(endpoint.to_string()));
    }
    Ok(origin.ascii_serialization())
}

/// A fresh key pair in the at-rest encoding: `(private, public)`.
pub fn generate_keypair() -> (String, String) {
    let secret = SecretKey::random(&mut rand::rngs::OsRng);
    let private = URL_SAFE_NO_PAD.encode(secret.to_bytes());
    let public = URL_SAFE_NO_PAD.encode(secret.public_key().to_encoded_point(false).as_bytes());
    (private, public)
}

/// Signs VAPID assertions for one server identity.
pub struct VapidSigner {
    key: SigningKey,
    public_key: String,
    subject: String,
    lifetime: Duration,
}

impl VapidSigner {
    pub fn new(key: SigningKey, subject: impl Into<String>, lifetime: Duration) -> Self {
        let public_key = encode_public_key(&key);
        Self {
            key,
            public_key,
            subject: subject.into(),
            lifetime,
        }
    }

    /// Decode an at-rest private key (unpadded base64url of 32 raw bytes).
    pub fn from_base64(
        private_key: &str,
        subject: impl Into<String>,
        lifetime: Duration,
    ) -> Result<Self, VapidError> {
        let raw = URL_SAFE_NO_PAD.decode(private_key.trim())?;
        Ok(Self::new(signing_key_from_raw(&raw)?, subject, lifetime))
    }

    /// Public key derived from the private scalar, base64url encoded.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Sign an assertion for `audience` expiring one lifetime from now.
    pub fn sign(&self, audience: &str) -> Result<String, VapidError> {
        self.sign_at(audience, Utc::now())
    }

    pub fn sign_at(&self, audience: &str, now: DateTime<Utc>) -> Result<String, VapidError> {
        let claims = serde_json::json!({
            "aud": audience,
            "exp": (now + self.lifetime).timestamp(),
            "sub": self.subject,
        });

        let unsigned = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(JWT_HEADER),
            URL_SAFE_NO_PAD.encode(claims.to_string())
        );

        let digest = Sha256::digest(unsigned.as_bytes());
        let signature: Signature = self
            .key
            .sign_prehash(digest.as_slice())
            .map_err(|_| VapidError::Signing)?;

        // Fixed-width r || s, 64 bytes
        let raw = signature.to_bytes();
        Ok(format!("{unsigned}.{}", URL_SAFE_NO_PAD.encode(raw.as_slice())))
    }
}
