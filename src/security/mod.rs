//! Security surface (spec.md §6): webhook signature verification and internal
//! V2 request signing. The core never terminates TLS or owns a socket — these
//! are pure verification functions the outer HTTP layer calls per request.

mod replay;
mod signing;
mod webhook;

pub use replay::ReplayTable;
pub use signing::{canonical_string, verify_v2_signature, SignRequest};
pub use webhook::{verify_ecdsa_p256, verify_hmac_sha256};
