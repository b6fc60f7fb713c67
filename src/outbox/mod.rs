//! Outbox dispatch model (spec.md §7): dedup keys, a SKIP-LOCKED-style claim
//! protocol, and the reaper's backoff schedule. The core has no I/O of its
//! own — this module models the pure decision functions an async worker
//! layer drives; sleeping and the actual database claim are out of scope.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// `hex(sha256(tenant|site|snapshot|driver|channel|template|template_version))`.
pub fn dedup_key(
    tenant: &str,
    site: &str,
    snapshot: &str,
    driver: &str,
    channel: &str,
    template: &str,
    template_version: &str,
) -> String {
    let canonical = format!(
        "{tenant}|{site}|{snapshot}|{driver}|{channel}|{template}|{template_version}"
    );
    crate::sha256_hex(canonical)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutboxStatus {
    Pending,
    Claimed,
    Sent,
    Failed,
    Dead,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxMessage {
    pub dedup_key: String,
    pub status: OutboxStatus,
    pub attempt: u32,
    pub claimed_by: Option<String>,
}

impl OutboxMessage {
    pub fn new(dedup_key: String) -> Self {
        Self {
            dedup_key,
            status: OutboxStatus::Pending,
            attempt: 0,
            claimed_by: None,
        }
    }

    /// Models the `SELECT ... FOR UPDATE SKIP LOCKED` claim: a message can be
    /// claimed only from PENDING or FAILED, and only if not already claimed
    /// by a different worker. Returns `true` if the claim succeeds.
    pub fn try_claim(&mut self, worker_id: &str) -> bool {
        if !matches!(self.status, OutboxStatus::Pending | OutboxStatus::Failed) {
            return false;
        }
        self.status = OutboxStatus::Claimed;
        self.claimed_by = Some(worker_id.to_string());
        true
    }

    pub fn mark_sent(&mut self) {
        self.status = OutboxStatus::Sent;
    }

    pub fn mark_failed(&mut self, max_attempts: u32) {
        self.attempt += 1;
        self.claimed_by = None;
        self.status = if self.attempt >= max_attempts {
            OutboxStatus::Dead
        } else {
            OutboxStatus::Failed
        };
    }
}

/// Reaper backoff: `delay = min(base * 5^(attempt-1), 2700) * (1 + U[0, 0.15])`.
/// `attempt` is 1-indexed. Uses `rng` for the jitter factor so callers can
/// seed it for deterministic tests.
pub fn backoff_delay_s(base_s: f64, attempt: u32, rng: &mut impl Rng) -> f64 {
    let attempt = attempt.max(1);
    let exponential = base_s * 5f64.powi(attempt as i32 - 1);
    let capped = exponential.min(2700.0);
    let jitter = 1.0 + rng.gen_range(0.0..0.15);
    capped * jitter
}
