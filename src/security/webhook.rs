//! Inbound webhook signature verification (spec.md §6): HMAC-SHA256 and
//! ECDSA P-256 providers.

use hmac::{Hmac, Mac};
use p256::ecdsa::signature::Verifier;
use p256::ecdsa::{Signature, VerifyingKey};
use p256::pkcs8::DecodePublicKey;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verifies an HMAC-SHA256 webhook signature.
///
/// `header_value` is the provider's header, e.g. `"sha256=<hexlower>"`.
/// Comparison is constant-time (delegated to `hmac::Mac::verify_slice`).
pub fn verify_hmac_sha256(
    shared_secret: &[u8],
    raw_body: &[u8],
    header_value: &str,
) -> crate::SolverResult<()> {
    let hex_sig = header_value
        .strip_prefix("sha256=")
        .ok_or_else(|| crate::SolverError::security("BAD_SIGNATURE", "missing sha256= prefix"))?;

    let sig_bytes = hex::decode(hex_sig)
        .map_err(|_| crate::SolverError::security("BAD_SIGNATURE", "signature is not hex"))?;

    let mut mac = HmacSha256::new_from_slice(shared_secret)
        .map_err(|_| crate::SolverError::security("BAD_SIGNATURE", "invalid key length"))?;
    mac.update(raw_body);
    mac.verify_slice(&sig_bytes)
        .map_err(|_| crate::SolverError::security("BAD_SIGNATURE", "HMAC mismatch"))
}

/// Verifies an ECDSA P-256 webhook signature over `timestamp || raw_body`.
///
/// `public_key_spki_der` is the SPKI-encoded verification key.
/// `signature_der` is the DER-encoded ECDSA signature.
/// Rejects if `|now - timestamp| > 300s` or `timestamp > now + 60s`
/// (spec.md §6).
pub fn verify_ecdsa_p256(
    public_key_spki_der: &[u8],
    raw_body: &[u8],
    timestamp: i64,
    signature_der: &[u8],
    now: i64,
) -> crate::SolverResult<()> {
    if timestamp > now + 60 {
        return Err(crate::SolverError::security(
            "REPLAY_ATTACK",
            "timestamp is too far in the future",
        ));
    }
    if (now - timestamp).abs() > 300 {
        return Err(crate::SolverError::security(
            "REPLAY_ATTACK",
            "timestamp is outside the 300s acceptance window",
        ));
    }

    let verifying_key = VerifyingKey::from_public_key_der(public_key_spki_der)
        .map_err(|_| crate::SolverError::security("BAD_SIGNATURE", "invalid SPKI public key"))?;
    let signature = Signature::from_der(signature_der)
        .map_err(|_| crate::SolverError::security("BAD_SIGNATURE", "invalid DER signature"))?;

    let mut payload = timestamp.to_string().into_bytes();
    payload.extend_from_slice(raw_body);

    verifying_key
        .verify(&payload, &signature)
        .map_err(|_| crate::SolverError::security("BAD_SIGNATURE", "ECDSA verification failed"))
}
