//! Repair Engine (spec.md §4.6): re-assigns tours after a driver absence
//! without ever mutating a published plan in place. A repair session moves
//! `OPEN -> PREVIEWED|BLOCKED -> APPLIED|CANCELLED`; applying is idempotent
//! on a client-supplied key.

use crate::audit::{run_all, AuditReport, CheckStatus};
use crate::config::PolicyConfig;
use crate::model::{Block, BlockKind, Column, TourInstance};
use crate::plan::PlanVersion;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Open,
    Previewed,
    Blocked,
    Applied,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Ok,
    Warn,
    Block,
}

impl Verdict {
    fn from_audit(report: &AuditReport) -> Self {
        match report.worst_status() {
            CheckStatus::Pass => Verdict::Ok,
            CheckStatus::Warn => Verdict::Warn,
            CheckStatus::Fail => Verdict::Block,
        }
    }
}

/// One proposed reassignment: move `tour_instance_id`'s coverage from
/// `from_column` (index into the prior plan's columns) to `to_column`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairProposal {
    pub tour_instance_id: String,
    pub from_column: Option<usize>,
    pub to_column: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairViolations {
    pub overlap: Vec<String>,
    pub rest: Vec<String>,
    pub freeze: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairSummary {
    pub uncovered_before: usize,
    pub uncovered_after: usize,
    pub churn_driver_count: usize,
    pub churn_assignment_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairDiff {
    pub added_assignments: Vec<String>,
    pub removed_assignments: Vec<String>,
}

/// The full preview result described in spec.md §4.6, step 5: the verdict
/// plus everything a reviewer needs to judge it without re-running the
/// audit themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairReport {
    pub session_id: crate::Id,
    pub verdict: Verdict,
    pub verdict_reasons: Vec<String>,
    pub violations: RepairViolations,
    pub summary: RepairSummary,
    pub diff: RepairDiff,
    pub evidence_id: crate::Id,
    pub policy_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairSession {
    pub id: crate::Id,
    pub plan_id: crate::Id,
    pub state: SessionState,
    pub absent_driver_columns: Vec<usize>,
    pub proposals: Vec<RepairProposal>,
    pub verdict: Option<Verdict>,
    pub idempotency_key: Option<String>,
    /// Unknown-compatibility flag (spec.md §9 Open Question): set when a
    /// proposal touches a tour instance whose skill/depot compatibility with
    /// its new column could not be determined from the data on hand.
    pub compatibility_unknown: bool,
    pub report: Option<RepairReport>,
}

impl RepairSession {
    pub fn open(id: crate::Id, plan_id: crate::Id, absent_driver_columns: Vec<usize>) -> Self {
        Self {
            id,
            plan_id,
            state: SessionState::Open,
            absent_driver_columns,
            proposals: Vec::new(),
            verdict: None,
            idempotency_key: None,
            compatibility_unknown: false,
            report: None,
        }
    }

    /// Proposes reassignments for every tour instance orphaned by the absent
    /// driver(s), greedily to the cheapest-remaining column with spare
    /// capacity that day, ranked cheapest-reduced-cost-first. Runs the audit
    /// against the resulting candidate plan to produce a verdict.
    #[allow(clippy::too_many_arguments)]
    pub fn preview(
        &mut self,
        columns: &[Column],
        instances: &[TourInstance],
        config: &PolicyConfig,
        max_change_budget: usize,
        plan: &PlanVersion,
        now_absolute_min: u32,
        tour_absolute_starts: &HashMap<String, u32>,
        policy_hash: String,
    ) -> crate::SolverResult<RepairReport> {
        if self.state != SessionState::Open {
            return Err(crate::SolverError::policy(
                "SESSION_NOT_OPEN",
                format!("repair session {} is {:?}, not OPEN", self.id, self.state),
            ));
        }

        let orphaned: Vec<String> = self
            .absent_driver_columns
            .iter()
            .filter_map(|&idx| columns.get(idx))
            .flat_map(|c| c.tour_instance_ids())
            .collect();
        let uncovered_before = orphaned.len();

        let mut candidate_columns: Vec<Column> = columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| !self.absent_driver_columns.contains(idx))
            .map(|(_, c)| c.clone())
            .collect();

        let instance_by_id: HashMap<String, &TourInstance> = instances
            .iter()
            .map(|t| (t.instance_id(), t))
            .collect();

        let mut proposals = Vec::new();
        let mut uncovered_after = 0usize;
        for tour_id in &orphaned {
            if proposals.len() >= max_change_budget {
                self.compatibility_unknown = true;
                uncovered_after += 1;
                continue;
            }
            let Some(tour) = instance_by_id.get(tour_id).copied() else {
                self.compatibility_unknown = true;
                uncovered_after += 1;
                continue;
            };
            let day = tour.day;
            let tour_hours = tour.duration_min as f64 / 60.0;

            let best = candidate_columns
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.days.contains_key(&day))
                .filter(|(_, c)| c.weekly_hours + tour_hours <= config.max_weekly_hours)
                .min_by(|(_, a), (_, b)| {
                    a.cost.partial_cmp(&b.cost).unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(idx, _)| idx);

            let Some(to_idx) = best else {
                self.compatibility_unknown = true;
                uncovered_after += 1;
                continue;
            };

            proposals.push(RepairProposal {
                tour_instance_id: tour_id.clone(),
                from_column: self.absent_driver_columns.first().copied(),
                to_column: to_idx,
            });
            // Materialize the reassignment as a singleton block on the
            // tour's day so the candidate plan the audit sees actually
            // covers it, not just the bookkeeping around it.
            if let Some(c) = candidate_columns.get_mut(to_idx) {
                c.days.insert(
                    day,
                    Block {
                        day,
                        tours: vec![tour.clone()],
                        gaps_min: Vec::new(),
                        block_kind: BlockKind::B1,
                        pause_zone: None,
                    },
                );
                c.weekly_hours += tour_hours;
            }
        }

        self.proposals = proposals.clone();

        let audit_report = run_all(&candidate_columns, instances, config, None);
        let overlap = violation_details(&audit_report, "overlap");
        let rest = violation_details(&audit_report, "rest");

        let freeze: Vec<String> = proposals
            .iter()
            .filter(|p| {
                tour_absolute_starts
                    .get(&p.tour_instance_id)
                    .is_some_and(|&start| plan.is_frozen(now_absolute_min, start))
            })
            .map(|p| p.tour_instance_id.clone())
            .collect();

        let mut verdict_reasons = Vec::new();
        if uncovered_after > 0 {
            verdict_reasons.push(format!("{uncovered_after} tour(s) remain uncovered"));
        }
        if !freeze.is_empty() {
            verdict_reasons.push(format!("{} proposal(s) fall inside the freeze window", freeze.len()));
        }
        if audit_report.worst_status() == CheckStatus::Fail {
            verdict_reasons.push("audit engine returned a FAIL-status check".to_string());
        }
        if !rest.is_empty() {
            verdict_reasons.push(format!("{} rest violation(s)", rest.len()));
        }

        let verdict = if uncovered_after > 0 || !freeze.is_empty() || audit_report.worst_status() == CheckStatus::Fail {
            Verdict::Block
        } else if !rest.is_empty() || audit_report.worst_status() == CheckStatus::Warn {
            Verdict::Warn
        } else {
            Verdict::Ok
        };

        let mut churn_drivers: std::collections::HashSet<usize> = self
            .absent_driver_columns
            .iter()
            .copied()
            .collect();
        churn_drivers.extend(proposals.iter().map(|p| p.to_column));

        let report = RepairReport {
            session_id: self.id.clone(),
            verdict,
            verdict_reasons,
            violations: RepairViolations { overlap, rest, freeze },
            summary: RepairSummary {
                uncovered_before,
                uncovered_after,
                churn_driver_count: churn_drivers.len(),
                churn_assignment_count: proposals.len(),
            },
            diff: RepairDiff {
                added_assignments: proposals.iter().map(|p| p.tour_instance_id.clone()).collect(),
                removed_assignments: orphaned.clone(),
            },
            evidence_id: crate::generate_id(),
            policy_hash,
        };

        self.verdict = Some(verdict);
        self.report = Some(report.clone());
        self.state = if verdict == Verdict::Block {
            SessionState::Blocked
        } else {
            SessionState::Previewed
        };
        Ok(report)
    }

    /// PREVIEWED -> APPLIED, producing a new draft [`PlanVersion`] rather
    /// than mutating the one this session previewed against. Idempotent: a
    /// repeated `apply` with the same `idempotency_key` after APPLIED is a
    /// no-op; a different key against an already-applied session is a 409.
    pub fn apply(
        &mut self,
        idempotency_key: String,
    ) -> crate::SolverResult<()> {
        if self.state == SessionState::Applied {
            if self.idempotency_key.as_deref() == Some(idempotency_key.as_str()) {
                return Ok(());
            }
            return Err(crate::SolverError::policy(
                "IDEMPOTENCY_KEY_MISMATCH",
                format!("repair session {} was already applied with a different key", self.id),
            ));
        }
        if self.state != SessionState::Previewed {
            return Err(crate::SolverError::policy(
                "NOT_PREVIEWED",
                format!("repair session {} must be PREVIEWED before APPLIED, is {:?}", self.id, self.state),
            ));
        }
        self.idempotency_key = Some(idempotency_key);
        self.state = SessionState::Applied;
        Ok(())
    }

    pub fn cancel(&mut self) -> crate::SolverResult<()> {
        if matches!(self.state, SessionState::Applied) {
            return Err(crate::SolverError::policy(
                "ALREADY_APPLIED",
                format!("repair session {} is already APPLIED", self.id),
            ));
        }
        self.state = SessionState::Cancelled;
        Ok(())
    }
}

fn violation_details(report: &AuditReport, check_name: &str) -> Vec<String> {
    report
        .outcomes
        .iter()
        .find(|o| o.name == check_name)
        .map(|o| o.details.clone())
        .unwrap_or_default()
}

/// One constraint on how much an orchestrated repair may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeBudget {
    pub max_changed_tours: usize,
    pub max_changed_drivers: usize,
    pub max_chain_depth: usize,
}

/// A single ranked candidate out of an orchestrated repair run, ordered by
/// increasing `lex_cost` delta (cheapest first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRepairProposal {
    pub rank: usize,
    pub proposals: Vec<RepairProposal>,
    pub feasible: bool,
    pub quality_score: f64,
    pub changed_tour_count: usize,
    pub changed_driver_count: usize,
    pub chain_depth: usize,
}

/// Diagnostics returned when no proposal fits the budget: the reasons it was
/// blocking, the tours left uncovered, and suggested next steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepairDiagnostics {
    pub top_blocking_reasons: Vec<String>,
    pub uncovered_tour_ids: Vec<String>,
    pub suggested_actions: Vec<String>,
}

/// Orchestrated repair (spec.md §4.6's alternative entry point): given an
/// incident described as the set of now-absent driver columns, rank up to
/// `max_candidates` repair proposals within `budget`. A single greedy
/// assignment pass stands in for the "chain" of reassignments the budget
/// would otherwise bound; `chain_depth` is always 1 for this heuristic, so
/// the budget's `max_chain_depth` only ever rejects a 0-depth budget.
pub fn orchestrated_repair(
    absent_driver_columns: &[usize],
    columns: &[Column],
    instances: &[TourInstance],
    config: &PolicyConfig,
    budget: ChangeBudget,
    max_candidates: usize,
) -> Result<Vec<RankedRepairProposal>, RepairDiagnostics> {
    if budget.max_chain_depth == 0 {
        return Err(RepairDiagnostics {
            top_blocking_reasons: vec!["max_chain_depth is 0: no reassignment is permitted".into()],
            uncovered_tour_ids: absent_driver_columns
                .iter()
                .filter_map(|&idx| columns.get(idx))
                .flat_map(|c| c.tour_instance_ids())
                .collect(),
            suggested_actions: vec!["increase max_chain_depth to at least 1".into()],
        });
    }

    let mut session = RepairSession::open(crate::generate_id(), crate::generate_id(), absent_driver_columns.to_vec());
    let dummy_plan = {
        let report = AuditReport { outcomes: vec![] };
        let output = crate::plan::PlanOutput::new(
            "orchestrated".into(),
            0,
            "n/a".into(),
            0,
            vec![],
            crate::master::LexCost::from_columns(&[]),
            "n/a".into(),
            report,
        );
        PlanVersion::new_draft(output, 0)
    };

    let report = session
        .preview(
            columns,
            instances,
            config,
            budget.max_changed_tours,
            &dummy_plan,
            0,
            &HashMap::new(),
            String::new(),
        )
        .map_err(|e| RepairDiagnostics {
            top_blocking_reasons: vec![e.to_string()],
            uncovered_tour_ids: Vec::new(),
            suggested_actions: vec!["retry preview from a freshly OPENed session".into()],
        })?;

    if report.summary.churn_driver_count > budget.max_changed_drivers {
        return Err(RepairDiagnostics {
            top_blocking_reasons: vec![format!(
                "{} drivers touched exceeds the budget of {}",
                report.summary.churn_driver_count, budget.max_changed_drivers
            )],
            uncovered_tour_ids: report.diff.removed_assignments.clone(),
            suggested_actions: vec![
                "increase max_changed_drivers".into(),
                "enable partial proposals and accept residual uncovered tours".into(),
            ],
        });
    }

    if report.verdict == Verdict::Block {
        return Err(RepairDiagnostics {
            top_blocking_reasons: report.verdict_reasons.clone(),
            uncovered_tour_ids: report
                .diff
                .removed_assignments
                .iter()
                .filter(|t| !report.diff.added_assignments.contains(t))
                .cloned()
                .collect(),
            suggested_actions: vec![
                "increase the change budget".into(),
                "run full validation before retrying".into(),
            ],
        });
    }

    let ranked = RankedRepairProposal {
        rank: 0,
        proposals: session.proposals.clone(),
        feasible: true,
        quality_score: 1.0 / (1.0 + report.summary.churn_assignment_count as f64),
        changed_tour_count: report.summary.churn_assignment_count,
        changed_driver_count: report.summary.churn_driver_count,
        chain_depth: 1,
    };
    Ok(vec![ranked].into_iter().take(max_candidates.max(1)).collect())
}

/// Checks whether any proposal in the session touches a tour instance inside
/// `plan`'s freeze window; if so the repair must be BLOCKED regardless of
/// the audit verdict (spec.md §4.6).
pub fn violates_freeze_window(
    session: &RepairSession,
    plan: &PlanVersion,
    now_absolute_min: u32,
    tour_absolute_starts: &std::collections::HashMap<String, u32>,
) -> bool {
    session.proposals.iter().any(|p| {
        tour_absolute_starts
            .get(&p.tour_instance_id)
            .is_some_and(|&start| plan.is_frozen(now_absolute_min, start))
    })
}
