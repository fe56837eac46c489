//! QR boarding payloads.
//!
//! A seat payload is `BL1.<reference>.<seat_number>.<signature>` where the
//! signature is the first [`SIGNATURE_LENGTH`] hex characters of
//! HMAC-SHA256 over `<reference>|<seat_number>`. A bare booking reference
//! is also accepted by the verifier and resolves to every seat of the
//! booking.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::booking::looks_like_reference;

/// Payload format version tag.
pub const PAYLOAD_VERSION: &str = "BL1";

/// Hex characters of the HMAC kept in the payload.
pub const SIGNATURE_LENGTH: usize = 16;

type HmacSha256 = Hmac<Sha256>;

/// A scanned payload after parsing, before any database lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPayload {
    /// A signed per-seat code.
    Seat {
        reference: String,
        seat_number: String,
        signature: String,
    },
    /// A bare booking reference typed or scanned by staff.
    Reference(String),
}

/// Why a payload could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    Malformed,
    BadSignature,
}

fn mac_for(secret: &str, reference: &str, seat_number: &str) -> HmacSha256 {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(reference.as_bytes());
    mac.update(b"|");
    mac.update(seat_number.as_bytes());
    mac
}

fn sign(secret: &str, reference: &str, seat_number: &str) -> String {
    let digest = mac_for(secret, reference, seat_number).finalize().into_bytes();
    hex::encode(&digest[..SIGNATURE_LENGTH / 2])
}

/// Check a hex signature against the truncated HMAC in constant time.
fn verify(secret: &str, reference: &str, seat_number: &str, signature: &str) -> bool {
    match hex::decode(signature) {
        Ok(bytes) if bytes.len() == SIGNATURE_LENGTH / 2 => mac_for(secret, reference, seat_number)
            .verify_truncated_left(&bytes)
            .is_ok(),
        _ => false,
    }
}

/// Build the payload printed on a seat's boarding pass.
pub fn encode_seat_payload(secret: &str, reference: &str, seat_number: &str) -> String {
    let signature = sign(secret, reference, seat_number);
    format!("{PAYLOAD_VERSION}.{reference}.{seat_number}.{signature}")
}

/// Parse a scanned string without checking the signature.
pub fn parse_payload(raw: &str) -> Result<ScanPayload, PayloadError> {
    let raw = raw.trim();

    if looks_like_reference(raw) {
        return Ok(ScanPayload::Reference(raw.to_string()));
    }

    let parts: Vec<&str> = raw.split('.').collect();
    match parts.as_slice() {
        [version, reference, seat_number, signature]
            if *version == PAYLOAD_VERSION
                && looks_like_reference(reference)
                && !seat_number.is_empty()
                && signature.len() == SIGNATURE_LENGTH =>
        {
            Ok(ScanPayload::Seat {
                reference: (*reference).to_string(),
                seat_number: (*seat_number).to_string(),
                signature: (*signature).to_string(),
            })
        }
        _ => Err(PayloadError::Malformed),
    }
}

/// Parse a scanned string and check its signature.
pub fn decode_payload(secret: &str, raw: &str) -> Result<ScanPayload, PayloadError> {
    let payload = parse_payload(raw)?;
    if let ScanPayload::Seat {
        reference,
        seat_number,
        signature,
    } = &payload
    {
        if !verify(secret, reference, seat_number, signature) {
            return Err(PayloadError::BadSignature);
        }
    }
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn encoded_payload_decodes_to_seat() {
        let payload = encode_seat_payload(SECRET, "BK-ABCD2345", "12");
        assert!(payload.starts_with("BL1.BK-ABCD2345.12."));

        let decoded = decode_payload(SECRET, &payload).unwrap();
        assert_eq!(
            decoded,
            ScanPayload::Seat {
                reference: "BK-ABCD2345".into(),
                seat_number: "12".into(),
                signature: payload.rsplit('.').next().unwrap().into(),
            }
        );
    }

    #[test]
    fn payload_is_deterministic() {
        assert_eq!(
            encode_seat_payload(SECRET, "BK-ABCD2345", "3"),
            encode_seat_payload(SECRET, "BK-ABCD2345", "3")
        );
    }

    #[test]
    fn tampered_seat_number_fails_signature() {
        let payload = encode_seat_payload(SECRET, "BK-ABCD2345", "12");
        let tampered = payload.replace(".12.", ".13.");
        assert_eq!(
            decode_payload(SECRET, &tampered),
            Err(PayloadError::BadSignature)
        );
    }

    #[test]
    fn other_secret_fails_signature() {
        let payload = encode_seat_payload(SECRET, "MB-ABCD2345", "A1");
        assert_eq!(
            decode_payload("another-secret", &payload),
            Err(PayloadError::BadSignature)
        );
    }

    #[test]
    fn bare_reference_accepted() {
        assert_eq!(
            decode_payload(SECRET, " BK-ABCD2345 "),
            Ok(ScanPayload::Reference("BK-ABCD2345".into()))
        );
    }

    #[test]
    fn garbage_is_malformed() {
        for raw in ["", "hello", "BL1.BK-ABCD2345.12", "BL2.BK-ABCD2345.12.0123456789abcdef"] {
            assert_eq!(decode_payload(SECRET, raw), Err(PayloadError::Malformed), "{raw}");
        }
    }

    #[test]
    fn signature_is_left_half_of_hmac() {
        let payload = encode_seat_payload(SECRET, "BK-ABCD2345", "7");
        let signature = payload.rsplit('.').next().unwrap();
        let full = hex::encode(mac_for(SECRET, "BK-ABCD2345", "7").finalize().into_bytes());
        assert!(full.starts_with(signature));
    }

    #[test]
    fn uppercase_signature_verifies() {
        let payload = encode_seat_payload(SECRET, "BK-ABCD2345", "12");
        let (head, signature) = payload.rsplit_once('.').unwrap();
        let upper = format!("{head}.{}", signature.to_ascii_uppercase());
        assert!(decode_payload(SECRET, &upper).is_ok());
    }

    #[test]
    fn non_hex_signature_fails_signature() {
        assert_eq!(
            decode_payload(SECRET, "BL1.BK-ABCD2345.12.zzzzzzzzzzzzzzzz"),
            Err(PayloadError::BadSignature)
        );
    }
}
