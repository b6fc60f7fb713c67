//! Hash-chained audit log (spec.md §7): every plan lifecycle event is
//! appended as an entry whose hash commits to the entry before it, so a
//! tampered or reordered history is detectable by recomputing the chain.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warn,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub seq: u64,
    pub ts: String,
    pub event_type: String,
    pub tenant: String,
    pub user: String,
    pub severity: Severity,
    pub details_json: String,
    pub prev_hash: String,
    pub hash: String,
}

/// The hash of the chain before its first entry: `sha256("GENESIS")`.
pub fn genesis_hash() -> String {
    crate::sha256_hex("GENESIS")
}

impl AuditLogEntry {
    /// `h_i = sha256(h_{i-1} || ts || event_type || tenant || user || severity || details_json)`.
    fn compute_hash(
        prev_hash: &str,
        ts: &str,
        event_type: &str,
        tenant: &str,
        user: &str,
        severity: Severity,
        details_json: &str,
    ) -> String {
        let severity_str = match severity {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Critical => "critical",
        };
        let canonical = format!(
            "{prev_hash}{ts}{event_type}{tenant}{user}{severity_str}{details_json}"
        );
        crate::sha256_hex(canonical)
    }
}

/// An append-only, hash-chained log for one tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    entries: Vec<AuditLogEntry>,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLog {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn last_hash(&self) -> String {
        self.entries
            .last()
            .map(|e| e.hash.clone())
            .unwrap_or_else(genesis_hash)
    }

    /// Appends a new entry, chaining it to the current tip.
    pub fn append(
        &mut self,
        ts: impl Into<String>,
        event_type: impl Into<String>,
        tenant: impl Into<String>,
        user: impl Into<String>,
        severity: Severity,
        details_json: impl Into<String>,
    ) -> &AuditLogEntry {
        let ts = ts.into();
        let event_type = event_type.into();
        let tenant = tenant.into();
        let user = user.into();
        let details_json = details_json.into();

        let prev_hash = self.last_hash();
        let hash = AuditLogEntry::compute_hash(
            &prev_hash,
            &ts,
            &event_type,
            &tenant,
            &user,
            severity,
            &details_json,
        );

        let seq = self.entries.len() as u64;
        self.entries.push(AuditLogEntry {
            seq,
            ts,
            event_type,
            tenant,
            user,
            severity,
            details_json,
            prev_hash,
            hash,
        });
        self.entries.last().expect("just pushed")
    }

    pub fn entries(&self) -> &[AuditLogEntry] {
        &self.entries
    }

    /// Recomputes every link in the chain and reports the first break, if
    /// any. `Ok(())` means the chain is intact from genesis to tip.
    pub fn verify_chain(&self) -> crate::SolverResult<()> {
        let mut expected_prev = genesis_hash();
        for entry in &self.entries {
            if entry.prev_hash != expected_prev {
                return Err(crate::SolverError::integrity(format!(
                    "entry {} prev_hash mismatch: expected {}, found {}",
                    entry.seq, expected_prev, entry.prev_hash
                )));
            }
            let recomputed = AuditLogEntry::compute_hash(
                &entry.prev_hash,
                &entry.ts,
                &entry.event_type,
                &entry.tenant,
                &entry.user,
                entry.severity,
                &entry.details_json,
            );
            if recomputed != entry.hash {
                return Err(crate::SolverError::integrity(format!(
                    "entry {} hash mismatch: stored {}, recomputed {}",
                    entry.seq, entry.hash, recomputed
                )));
            }
            expected_prev = entry.hash.clone();
        }
        Ok(())
    }
}
