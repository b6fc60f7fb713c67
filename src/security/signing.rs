//! Internal request signing, V2 canonical form (spec.md §6):
//!
//! ```text
//! METHOD|CANONICAL_PATH|TIMESTAMP|NONCE|TENANT_CODE|SITE_CODE|IS_PLATFORM_ADMIN|SHA256(body)
//! ```
//!
//! Timestamp window is ±120s; nonce replay is delegated to [`super::ReplayTable`].

use super::ReplayTable;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone)]
pub struct SignRequest<'a> {
    pub method: &'a str,
    pub canonical_path: &'a str,
    pub timestamp: i64,
    pub nonce: &'a str,
    pub tenant_code: &'a str,
    pub site_code: &'a str,
    pub is_platform_admin: bool,
    pub body: &'a [u8],
}

/// Builds the exact canonical string signed/verified by V2 request signing.
pub fn canonical_string(req: &SignRequest<'_>) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}|{}",
        req.method,
        req.canonical_path,
        req.timestamp,
        req.nonce,
        req.tenant_code,
        req.site_code,
        req.is_platform_admin,
        crate::sha256_hex(req.body),
    )
}

const TIMESTAMP_WINDOW_S: i64 = 120;
const NONCE_TTL_BUFFER_S: i64 = 60;

/// Verifies a V2-signed internal request:
/// 1. timestamp is within ±120s of `now`, else `401` body-hash-class error;
/// 2. the nonce has not been replayed (via `replay_table`), else `403 REPLAY_ATTACK`;
/// 3. `hmac_sha256(shared_secret, canonical_string)` matches `signature_hex`
///    (lowercase hex), else `401`.
pub fn verify_v2_signature(
    req: &SignRequest<'_>,
    shared_secret: &[u8],
    signature_hex: &str,
    now: i64,
    replay_table: &mut ReplayTable,
) -> crate::SolverResult<()> {
    if (req.timestamp - now).abs() > TIMESTAMP_WINDOW_S {
        return Err(crate::SolverError::security(
            "SIGNATURE_EXPIRED",
            format!(
                "timestamp {} is outside the {}s window around now={}",
                req.timestamp, TIMESTAMP_WINDOW_S, now
            ),
        ));
    }

    replay_table.check_and_record(
        req.nonce,
        now,
        TIMESTAMP_WINDOW_S + NONCE_TTL_BUFFER_S,
    )?;

    let canonical = canonical_string(req);
    let sig_bytes = hex::decode(signature_hex)
        .map_err(|_| crate::SolverError::security("BODY_HASH_MISMATCH", "signature is not hex"))?;

    let mut mac = HmacSha256::new_from_slice(shared_secret)
        .map_err(|_| crate::SolverError::security("BODY_HASH_MISMATCH", "invalid key length"))?;
    mac.update(canonical.as_bytes());
    mac.verify_slice(&sig_bytes)
        .map_err(|_| crate::SolverError::security("BODY_HASH_MISMATCH", "signature mismatch"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(ts: i64) -> SignRequest<'static> {
        SignRequest {
            method: "POST",
            canonical_path: "/v1/plans/lock",
            timestamp: ts,
            nonce: "nonce-1",
            tenant_code: "acme",
            site_code: "site-1",
            is_platform_admin: false,
            body: b"{}",
        }
    }

    fn sign(req: &SignRequest<'_>, secret: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret).unwrap();
        mac.update(canonical_string(req).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn timestamp_boundary_120s_accepted_121s_rejected() {
        let secret = b"shared-secret";
        let mut table = ReplayTable::new();
        let r1 = req(1000 - 120);
        let sig1 = sign(&r1, secret);
        assert!(verify_v2_signature(&r1, secret, &sig1, 1000, &mut table).is_ok());

        let mut table2 = ReplayTable::new();
        let r2 = req(1000 - 121);
        let sig2 = sign(&r2, secret);
        assert!(verify_v2_signature(&r2, secret, &sig2, 1000, &mut table2).is_err());
    }

    #[test]
    fn replayed_nonce_is_rejected() {
        let secret = b"shared-secret";
        let mut table = ReplayTable::new();
        let r = req(1000);
        let sig = sign(&r, secret);
        assert!(verify_v2_signature(&r, secret, &sig, 1000, &mut table).is_ok());
        let err = verify_v2_signature(&r, secret, &sig, 1005, &mut table).unwrap_err();
        assert!(matches!(err, crate::SolverError::Security { code: "REPLAY_ATTACK", .. }));
    }

    #[test]
    fn body_hash_mismatch_on_tampered_body() {
        let secret = b"shared-secret";
        let mut table = ReplayTable::new();
        let mut r = req(1000);
        let sig = sign(&r, secret);
        r.body = b"{\"tampered\":true}";
        assert!(verify_v2_signature(&r, secret, &sig, 1000, &mut table).is_err());
    }
}
