//! Payment webhook signature verification.
//!
//! The gateway signs each delivery with a header of the form
//! `t=<unix_ts>,v1=<hex hmac>`, where the MAC is HMAC-SHA256 over
//! `"{timestamp}.{raw_body}"`. The raw body must be verified before any
//! JSON parsing happens.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("signature header has no timestamp")]
    MissingTimestamp,

    #[error("signature header has no signature")]
    MissingSignature,

    #[error("signature does not match payload")]
    Mismatch,
}

/// Compute the hex HMAC for a timestamped payload.
///
/// This is the signing side; it exists for test fixtures and for local
/// tooling that replays captured webhook bodies.
pub fn sign_payload(secret: &str, timestamp: &str, payload: &str) -> String {
    let mut mac = signed_mac(secret, timestamp, payload);
    let result = mac.finalize();
    hex::encode(result.into_bytes())
}

/// Verify a `t=...,v1=...` signature header against the raw request body.
///
/// The header may carry several `v1` entries (the gateway does this while
/// rotating secrets); the delivery is accepted if any of them matches.
/// Comparison happens on MAC bytes via [`Mac::verify_slice`], not on hex
/// strings.
pub fn verify_header(secret: &str, header: &str, payload: &str) -> Result<(), SignatureError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if candidates.is_empty() {
        return Err(SignatureError::MissingSignature);
    }

    for candidate in candidates {
        let Some(bytes) = hex::decode(candidate) else {
            continue;
        };
        let mac = signed_mac(secret, timestamp, payload);
        if mac.verify_slice(&bytes).is_ok() {
            return Ok(());
        }
    }

    Err(SignatureError::Mismatch)
}

fn signed_mac(secret: &str, timestamp: &str, payload: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    mac
}

// ---------------------------------------------------------------------------
// hex helpers (no extra dep)
// ---------------------------------------------------------------------------

mod hex {
    /// Encode bytes as a lowercase hex string.
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Decode a hex string; `None` if the length is odd or a digit is bad.
    pub fn decode(s: &str) -> Option<Vec<u8>> {
        if s.len() % 2 != 0 {
            return None;
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const BODY: &str = r#"{"id":"evt_1","type":"checkout.session.completed"}"#;

    fn signed_header(secret: &str, timestamp: &str, body: &str) -> String {
        format!("t={timestamp},v1={}", sign_payload(secret, timestamp, body))
    }

    #[test]
    fn accepts_valid_signature() {
        let header = signed_header(SECRET, "1700000000", BODY);
        assert!(verify_header(SECRET, &header, BODY).is_ok());
    }

    #[test]
    fn rejects_tampered_body() {
        let header = signed_header(SECRET, "1700000000", BODY);
        let tampered = BODY.replace("evt_1", "evt_2");
        assert_eq!(
            verify_header(SECRET, &header, &tampered),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_wrong_secret() {
        let header = signed_header("whsec_other", "1700000000", BODY);
        assert_eq!(
            verify_header(SECRET, &header, BODY),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_altered_timestamp() {
        // The timestamp participates in the MAC, so changing it after
        // signing must invalidate the signature.
        let sig = sign_payload(SECRET, "1700000000", BODY);
        let header = format!("t=1700009999,v1={sig}");
        assert_eq!(
            verify_header(SECRET, &header, BODY),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn rejects_header_without_timestamp() {
        assert_eq!(
            verify_header(SECRET, "v1=deadbeef", BODY),
            Err(SignatureError::MissingTimestamp)
        );
    }

    #[test]
    fn rejects_header_without_signature() {
        assert_eq!(
            verify_header(SECRET, "t=1700000000", BODY),
            Err(SignatureError::MissingSignature)
        );
    }

    #[test]
    fn accepts_when_any_v1_matches() {
        let good = sign_payload(SECRET, "1700000000", BODY);
        let header = format!("t=1700000000,v1=00ff00ff,v1={good}");
        assert!(verify_header(SECRET, &header, BODY).is_ok());
    }

    #[test]
    fn skips_malformed_hex_candidates() {
        let header = "t=1700000000,v1=not-hex!";
        assert_eq!(
            verify_header(SECRET, header, BODY),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn tolerates_whitespace_between_parts() {
        let sig = sign_payload(SECRET, "1700000000", BODY);
        let header = format!("t=1700000000, v1={sig}");
        assert!(verify_header(SECRET, &header, BODY).is_ok());
    }
}
