//! Nonce replay table for internal V2 request signing (spec.md §6).
//!
//! Nonces are retained for `window + buffer` seconds after first use; a
//! second use inside that TTL is a replay. The table is a pure data
//! structure — the outer layer owns the clock and any persistence.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct ReplayTable {
    /// nonce -> epoch second it was first seen.
    seen: HashMap<String, i64>,
}

impl ReplayTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `nonce` at `now` if it hasn't been seen within `ttl_s` of
    /// `now`. Returns `Ok(())` on first use, `Err(REPLAY_ATTACK)` on reuse.
    /// Entries older than `ttl_s` are pruned opportunistically on every call.
    pub fn check_and_record(
        &mut self,
        nonce: &str,
        now: i64,
        ttl_s: i64,
    ) -> crate::SolverResult<()> {
        self.seen.retain(|_, &mut ts| now - ts < ttl_s);

        if self.seen.contains_key(nonce) {
            return Err(crate::SolverError::security(
                "REPLAY_ATTACK",
                format!("nonce {nonce} was already used within the replay window"),
            ));
        }

        self.seen.insert(nonce.to_string(), now);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
