//! Provider webhook signatures.
//!
//! Header: `mux-signature: t=<unix seconds>,v1=<hex hmac>`.
//! Signature = hex(HMAC-SHA256(secret, "<t>." || raw body bytes)).

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "mux-signature";

const TIMESTAMP_KEY: &str = "t";
const SIGNATURE_KEY: &str = "v1";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Signature header is missing")]
    MissingHeader,

    #[error("Signature header is malformed: {0}")]
    MalformedHeader(&'static str),

    #[error("Webhook signing secret is not configured")]
    SecretNotConfigured,

    #[error("Signature timestamp is outside the tolerance window")]
    TimestampOutOfTolerance,

    #[error("Signature does not match")]
    Mismatch,
}

impl SignatureError {
    /// True when the failure is our own misconfiguration rather than a bad request.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, SignatureError::SecretNotConfigured)
    }
}

/// Parsed signature header. Keys are looked up by name, so token order does not matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: String,
    /// All `v1` values; more than one is sent while a secret is being rotated.
    pub signatures: Vec<String>,
}

impl FromStr for SignatureHeader {
    type Err = SignatureError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut timestamp: Option<String> = None;
        let mut signatures = Vec::new();

        for token in raw.split(',') {
            let Some((key, value)) = token.split_once('=') else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.trim() {
                TIMESTAMP_KEY if timestamp.is_none() => timestamp = Some(value.to_string()),
                SIGNATURE_KEY => signatures.push(value.to_string()),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureError::MalformedHeader("missing timestamp"))?;
        if signatures.is_empty() {
            return Err(SignatureError::MalformedHeader("missing v1 signature"));
        }

        Ok(Self {
            timestamp,
            signatures,
        })
    }
}

/// Lowercase hex HMAC-SHA256 over `"<timestamp>." || body`.
pub fn compute_signature(secret: &[u8], timestamp: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key size");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Build a complete header value for `body`, as the provider would send it.
pub fn signature_header(secret: &[u8], timestamp: &str, body: &[u8]) -> String {
    format!(
        "{}={},{}={}",
        TIMESTAMP_KEY,
        timestamp,
        SIGNATURE_KEY,
        compute_signature(secret, timestamp, body)
    )
}

/// Verifies inbound webhook requests against the shared signing secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Option<Vec<u8>>,
    tolerance_secs: Option<u64>,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("configured", &self.secret.is_some())
            .field("tolerance_secs", &self.tolerance_secs)
            .finish()
    }
}

impl SignatureVerifier {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            secret: secret
                .filter(|s| !s.is_empty())
                .map(|s| s.as_bytes().to_vec()),
            tolerance_secs: None,
        }
    }

    /// Reject timestamps further than `tolerance_secs` from now. `None` disables the check.
    pub fn with_tolerance(mut self, tolerance_secs: Option<u64>) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    pub fn verify(&self, header: Option<&str>, body: &[u8]) -> Result<(), SignatureError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.verify_at(header, body, now)
    }

    /// Verify with an explicit clock, in unix seconds.
    pub fn verify_at(
        &self,
        header: Option<&str>,
        body: &[u8],
        now_unix: u64,
    ) -> Result<(), SignatureError> {
        let header = header.ok_or(SignatureError::MissingHeader)?;
        let parsed: SignatureHeader = header.parse()?;

        let secret = self
            .secret
            .as_deref()
            .ok_or(SignatureError::SecretNotConfigured)?;

        if let Some(tolerance) = self.tolerance_secs {
            let timestamp: u64 = parsed
                .timestamp
                .parse()
                .map_err(|_| SignatureError::MalformedHeader("timestamp is not a number"))?;
            if now_unix.abs_diff(timestamp) > tolerance {
                return Err(SignatureError::TimestampOutOfTolerance);
            }
        }

        let expected = compute_signature(secret, &parsed.timestamp, body);
        let matched = parsed
            .signatures
            .iter()
            .fold(subtle::Choice::from(0u8), |acc, candidate| {
                acc | expected.as_bytes().ct_eq(candidate.as_bytes())
            });

        if bool::from(matched) {
            Ok(())
        } else {
            Err(SignatureError::Mismatch)
        }
    }
}
