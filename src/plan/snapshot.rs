//! Snapshots and the plan store (spec.md §3 / §4.7): publish creates an
//! ACTIVE snapshot and atomically supersedes the previous one, writing both
//! changes and an audit-log entry in a single transaction. There is always
//! exactly one ACTIVE snapshot per `(tenant, site)`.

use super::{EvidencePack, PlanVersion};
use crate::audit_log::{AuditLog, Severity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnapshotStatus {
    Active,
    Superseded,
    Archived,
}

/// An immutable copy of a plan produced on publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub snapshot_id: crate::Id,
    pub plan_version_id: crate::Id,
    pub version_number: u32,
    pub status: SnapshotStatus,
    pub published_at: String,
    pub published_by: String,
    pub freeze_until: String,
    pub evidence_hash: String,
}

/// Versioned plan snapshots, keyed by `(tenant, site)`. Each key holds at
/// most one ACTIVE snapshot at a time; publishing a new one supersedes the
/// prior ACTIVE atomically (from this single-threaded caller's point of
/// view — the outer repository layer is responsible for the advisory lock
/// described in spec.md §5 that makes this atomic across processes).
#[derive(Debug, Default)]
pub struct PlanStore {
    snapshots: HashMap<(String, String), Vec<Snapshot>>,
}

impl PlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current ACTIVE snapshot for `(tenant, site)`, if any.
    pub fn active(&self, tenant: &str, site: &str) -> Option<&Snapshot> {
        self.snapshots
            .get(&(tenant.to_string(), site.to_string()))?
            .iter()
            .find(|s| s.status == SnapshotStatus::Active)
    }

    /// Publishes `plan`: creates a new ACTIVE snapshot, moves any existing
    /// ACTIVE snapshot for this `(tenant, site)` to SUPERSEDED, and appends a
    /// `plan_published` audit-log entry — all as one operation so a caller
    /// never observes two ACTIVE snapshots or an audit log entry without a
    /// matching snapshot change.
    #[allow(clippy::too_many_arguments)]
    pub fn publish(
        &mut self,
        tenant: &str,
        site: &str,
        plan: &PlanVersion,
        published_at: impl Into<String>,
        published_by: impl Into<String>,
        freeze_until: impl Into<String>,
        evidence: &EvidencePack,
        audit_log: &mut AuditLog,
    ) -> crate::SolverResult<Snapshot> {
        if plan.state != crate::plan::PlanState::Published {
            return Err(crate::SolverError::policy(
                "NOT_PUBLISHED",
                "plan must be in the PUBLISHED state before a snapshot is recorded",
            ));
        }

        let published_at = published_at.into();
        let published_by = published_by.into();
        let key = (tenant.to_string(), site.to_string());

        let new_snapshot = Snapshot {
            snapshot_id: crate::generate_id(),
            plan_version_id: plan.id.clone(),
            version_number: plan.version,
            status: SnapshotStatus::Active,
            published_at: published_at.clone(),
            published_by: published_by.clone(),
            freeze_until: freeze_until.into(),
            evidence_hash: evidence.hash.clone(),
        };

        let entry = self.snapshots.entry(key).or_default();
        for existing in entry.iter_mut() {
            if existing.status == SnapshotStatus::Active {
                existing.status = SnapshotStatus::Superseded;
            }
        }
        entry.push(new_snapshot.clone());

        audit_log.append(
            published_at,
            "plan_published",
            tenant,
            published_by,
            Severity::Info,
            serde_json::json!({
                "plan_version_id": plan.id,
                "snapshot_id": new_snapshot.snapshot_id,
                "output_hash": plan.output.output_hash,
            })
            .to_string(),
        );

        Ok(new_snapshot)
    }

    /// All snapshots ever recorded for `(tenant, site)`, oldest first.
    pub fn history(&self, tenant: &str, site: &str) -> &[Snapshot] {
        self.snapshots
            .get(&(tenant.to_string(), site.to_string()))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditReport, CheckOutcome};
    use crate::master::LexCost;
    use crate::plan::{KillSwitch, PlanOutput, PlanVersion};

    fn published_plan(id: &str, version: u32) -> PlanVersion {
        let report = AuditReport {
            outcomes: vec![CheckOutcome::pass("coverage")],
        };
        let output = PlanOutput::new(
            id.into(),
            version,
            "forecast-1".into(),
            94,
            vec![],
            LexCost::from_columns(&[]),
            "cfg".into(),
            report,
        );
        let off = KillSwitch::new(false);
        let mut plan = PlanVersion::new_draft(output, 720);
        plan.lock(&off).unwrap();
        plan.publish(&off).unwrap();
        plan
    }

    #[test]
    fn first_publish_creates_a_lone_active_snapshot() {
        let mut store = PlanStore::new();
        let mut log = AuditLog::new();
        let evidence = EvidencePack::build("{}", "{}", "", "{}", "{}");
        let plan = published_plan("p1", 1);

        let snap = store
            .publish("acme", "site-1", &plan, "t0", "alice", "t0+12h", &evidence, &mut log)
            .unwrap();
        assert_eq!(snap.status, SnapshotStatus::Active);
        assert_eq!(store.active("acme", "site-1").unwrap().snapshot_id, snap.snapshot_id);
        assert_eq!(log.entries().len(), 1);
    }

    #[test]
    fn second_publish_supersedes_the_first_and_exactly_one_remains_active() {
        let mut store = PlanStore::new();
        let mut log = AuditLog::new();
        let evidence = EvidencePack::build("{}", "{}", "", "{}", "{}");

        let plan1 = published_plan("p1", 1);
        let plan2 = published_plan("p2", 2);

        store
            .publish("acme", "site-1", &plan1, "t0", "alice", "t0+12h", &evidence, &mut log)
            .unwrap();
        store
            .publish("acme", "site-1", &plan2, "t1", "alice", "t1+12h", &evidence, &mut log)
            .unwrap();

        let history = store.history("acme", "site-1");
        assert_eq!(history.len(), 2);
        let active_count = history.iter().filter(|s| s.status == SnapshotStatus::Active).count();
        assert_eq!(active_count, 1);
        assert_eq!(store.active("acme", "site-1").unwrap().plan_version_id, "p2");
    }

    #[test]
    fn publish_refuses_a_plan_not_in_the_published_state() {
        let mut store = PlanStore::new();
        let mut log = AuditLog::new();
        let evidence = EvidencePack::build("{}", "{}", "", "{}", "{}");

        let report = AuditReport {
            outcomes: vec![CheckOutcome::pass("coverage")],
        };
        let output = PlanOutput::new(
            "p1".into(),
            1,
            "forecast-1".into(),
            94,
            vec![],
            LexCost::from_columns(&[]),
            "cfg".into(),
            report,
        );
        let draft = PlanVersion::new_draft(output, 720);

        assert!(store
            .publish("acme", "site-1", &draft, "t0", "alice", "t0+12h", &evidence, &mut log)
            .is_err());
    }
}
