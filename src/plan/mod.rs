//! Plan lifecycle (spec.md §3 / §7): plan versions move through
//! `DRAFT -> SOLVED -> APPROVED -> LOCKED -> PUBLISHED` (or `FAILED` /
//! `SUPERSEDED`) and are never mutated once LOCKED or PUBLISHED. A new plan
//! version is always a new row with its own fingerprint and [`PlanOutput`].

mod evidence;
mod kill_switch;
mod snapshot;

pub use evidence::EvidencePack;
pub use kill_switch::KillSwitch;
pub use snapshot::{PlanStore, Snapshot, SnapshotStatus};

use crate::audit::AuditReport;
use crate::master::LexCost;
use crate::model::Column;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanState {
    Draft,
    Solved,
    Approved,
    Locked,
    Published,
    Failed,
    Superseded,
}

/// The canonical plan JSON described in spec.md §6: stable key order,
/// ISO-8601 UTC timestamps as plain strings, integer minutes, `null` for
/// absent optionals. Any whitespace change in its serialized form produces a
/// different hash — callers must serialize via `serde_json::to_string`
/// (compact, no re-formatting) before hashing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPlanJson {
    pub plan_version_id: crate::Id,
    pub forecast_version_id: String,
    pub seed: u64,
    pub config_hash: String,
    pub drivers: Vec<CanonicalDriver>,
    pub assignments: Vec<CanonicalAssignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalDriver {
    pub index: usize,
    pub driver_type: crate::model::DriverType,
    pub weekly_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalAssignment {
    pub driver_index: usize,
    pub day: u8,
    pub tour_instance_id: String,
    pub block_kind: crate::model::BlockKind,
}

impl CanonicalPlanJson {
    pub fn from_columns(
        plan_version_id: crate::Id,
        forecast_version_id: String,
        seed: u64,
        config_hash: String,
        columns: &[Column],
    ) -> Self {
        let mut drivers = Vec::with_capacity(columns.len());
        let mut assignments = Vec::new();
        for (index, column) in columns.iter().enumerate() {
            drivers.push(CanonicalDriver {
                index,
                driver_type: column.driver_type,
                weekly_hours: column.weekly_hours,
            });
            for (day, block) in &column.days {
                for tour in &block.tours {
                    assignments.push(CanonicalAssignment {
                        driver_index: index,
                        day: *day,
                        tour_instance_id: tour.instance_id(),
                        block_kind: block.block_kind,
                    });
                }
            }
        }
        assignments.sort_by(|a, b| {
            (a.driver_index, a.day, a.tour_instance_id.as_str())
                .cmp(&(b.driver_index, b.day, b.tour_instance_id.as_str()))
        });
        Self {
            plan_version_id,
            forecast_version_id,
            seed,
            config_hash,
            drivers,
            assignments,
        }
    }

    /// `output_hash` from spec.md §3: `hex(SHA-256(canonical JSON))`. Uses
    /// compact `serde_json` output, matching "any whitespace change produces
    /// a different hash".
    pub fn output_hash(&self) -> String {
        let compact = serde_json::to_string(self).expect("CanonicalPlanJson always serializes");
        crate::sha256_hex(compact)
    }
}

/// One immutable solved payload: the columns a solve selected, the config
/// that produced them, and the audit report that cleared (or didn't clear)
/// it to lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanOutput {
    pub plan_id: crate::Id,
    pub version: u32,
    pub forecast_version_id: String,
    pub seed: u64,
    pub columns: Vec<Column>,
    pub lex_cost: LexCost,
    pub solver_config_hash: String,
    pub audit_report: AuditReport,
    pub output_hash: String,
}

impl PlanOutput {
    pub fn new(
        plan_id: crate::Id,
        version: u32,
        forecast_version_id: String,
        seed: u64,
        columns: Vec<Column>,
        lex_cost: LexCost,
        solver_config_hash: String,
        audit_report: AuditReport,
    ) -> Self {
        let canonical = CanonicalPlanJson::from_columns(
            plan_id.clone(),
            forecast_version_id.clone(),
            seed,
            solver_config_hash.clone(),
            &columns,
        );
        let output_hash = canonical.output_hash();
        Self {
            plan_id,
            version,
            forecast_version_id,
            seed,
            columns,
            lex_cost,
            solver_config_hash,
            audit_report,
            output_hash,
        }
    }
}

/// A plan version: the mutable wrapper (state, freeze window) around an
/// otherwise-immutable [`PlanOutput`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanVersion {
    pub id: crate::Id,
    pub version: u32,
    pub state: PlanState,
    pub output: PlanOutput,
    /// Minutes from now inside which tour assignments are frozen against repair.
    pub freeze_horizon_min: u32,
}

impl PlanVersion {
    pub fn new_draft(output: PlanOutput, freeze_horizon_min: u32) -> Self {
        Self {
            id: output.plan_id.clone(),
            version: output.version,
            state: PlanState::Draft,
            output,
            freeze_horizon_min,
        }
    }

    /// DRAFT -> SOLVED, once the master problem has produced an incumbent.
    pub fn mark_solved(&mut self) -> crate::SolverResult<()> {
        if self.state != PlanState::Draft {
            return Err(crate::SolverError::policy(
                "NOT_DRAFT",
                format!("plan {} must be DRAFT to mark SOLVED, is {:?}", self.id, self.state),
            ));
        }
        self.state = PlanState::Solved;
        Ok(())
    }

    /// SOLVED -> APPROVED, gated on the audit report being lockable.
    pub fn approve(&mut self) -> crate::SolverResult<()> {
        if self.state != PlanState::Solved {
            return Err(crate::SolverError::policy(
                "NOT_SOLVED",
                format!("plan {} must be SOLVED to approve, is {:?}", self.id, self.state),
            ));
        }
        if !self.output.audit_report.is_lockable() {
            return Err(crate::SolverError::policy(
                "AUDIT_FAILED",
                "cannot approve a plan with a FAIL-status audit check",
            ));
        }
        self.state = PlanState::Approved;
        Ok(())
    }

    /// DRAFT/SOLVED -> FAILED, e.g. the master returned INFEASIBLE.
    pub fn mark_failed(&mut self) -> crate::SolverResult<()> {
        if !matches!(self.state, PlanState::Draft | PlanState::Solved) {
            return Err(crate::SolverError::policy(
                "ALREADY_TERMINAL",
                format!("plan {} is already {:?}", self.id, self.state),
            ));
        }
        self.state = PlanState::Failed;
        Ok(())
    }

    /// DRAFT/APPROVED -> LOCKED. Refuses if the audit report isn't lockable,
    /// or if the kill switch is set. Accepts a plain DRAFT too so a caller
    /// that skips the explicit approve step still gets the same guarantee.
    pub fn lock(&mut self, kill_switch: &KillSwitch) -> crate::SolverResult<()> {
        if kill_switch.is_active() {
            return Err(crate::SolverError::policy(
                "KILL_SWITCH_ACTIVE",
                "kill switch is engaged",
            ));
        }
        if !matches!(self.state, PlanState::Draft | PlanState::Approved) {
            return Err(crate::SolverError::policy(
                "ALREADY_LOCKED",
                format!("plan {} is already {:?}", self.id, self.state),
            ));
        }
        if !self.output.audit_report.is_lockable() {
            return Err(crate::SolverError::policy(
                "AUDIT_FAILED",
                "cannot lock a plan with a FAIL-status audit check",
            ));
        }
        self.state = PlanState::Locked;
        Ok(())
    }

    /// LOCKED -> PUBLISHED. A plan can only be published once locked.
    pub fn publish(&mut self, kill_switch: &KillSwitch) -> crate::SolverResult<()> {
        if kill_switch.is_active() {
            return Err(crate::SolverError::policy(
                "KILL_SWITCH_ACTIVE",
                "kill switch is engaged",
            ));
        }
        if self.state != PlanState::Locked {
            return Err(crate::SolverError::policy(
                "NOT_LOCKED",
                format!("plan {} must be LOCKED before PUBLISHED, is {:?}", self.id, self.state),
            ));
        }
        self.state = PlanState::Published;
        Ok(())
    }

    /// PUBLISHED -> SUPERSEDED, when a later plan version publishes over it.
    pub fn supersede(&mut self) -> crate::SolverResult<()> {
        if self.state != PlanState::Published {
            return Err(crate::SolverError::policy(
                "NOT_PUBLISHED",
                format!("plan {} must be PUBLISHED to supersede, is {:?}", self.id, self.state),
            ));
        }
        self.state = PlanState::Superseded;
        Ok(())
    }

    /// Any mutation attempt on a LOCKED or PUBLISHED plan must go through a
    /// new version instead. Returns an error describing why in-place
    /// mutation is refused; callers should create a new [`PlanVersion`].
    pub fn guard_immutable(&self) -> crate::SolverResult<()> {
        match self.state {
            PlanState::Draft | PlanState::Solved | PlanState::Approved => Ok(()),
            PlanState::Locked
            | PlanState::Published
            | PlanState::Failed
            | PlanState::Superseded => Err(crate::SolverError::policy(
                "IMMUTABLE",
                format!("plan {} is {:?} and cannot be mutated in place", self.id, self.state),
            )),
        }
    }

    /// True if `tour_day` falls inside this plan's freeze window measured
    /// from `now_absolute_min` (both absolute minute-of-week).
    pub fn is_frozen(&self, now_absolute_min: u32, tour_absolute_min: u32) -> bool {
        tour_absolute_min.saturating_sub(now_absolute_min) < self.freeze_horizon_min
    }
}
