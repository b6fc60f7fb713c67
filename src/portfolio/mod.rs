//! Portfolio Controller (spec.md §4.4): profiles an instance and picks a
//! solver path, splitting the user's time budget into phases.

use crate::model::TourInstance;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverPath {
    Fast,
    Balanced,
    Heavy,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstanceProfile {
    pub n_tours: usize,
    pub blocks_per_tour_avg: f64,
    pub peakiness_index: f64,
    pub pt_pressure_proxy: f64,
    pub pool_pressure: f64,
    pub lower_bound_drivers: usize,
}

impl InstanceProfile {
    pub fn profile(instances: &[TourInstance], blocks_per_tour_avg: f64, max_weekly_hours: f64) -> Self {
        let n_tours = instances.len();
        let mut per_day: std::collections::HashMap<u8, usize> = std::collections::HashMap::new();
        for t in instances {
            *per_day.entry(t.day).or_insert(0) += 1;
        }
        let avg_per_day = if per_day.is_empty() {
            0.0
        } else {
            n_tours as f64 / per_day.len() as f64
        };
        let peak = per_day.values().copied().max().unwrap_or(0) as f64;
        let peakiness_index = if avg_per_day > 0.0 {
            peak / avg_per_day
        } else {
            0.0
        };

        let total_work_min: u32 = instances.iter().map(|t| t.duration_min).sum();
        let lower_bound_drivers =
            ((total_work_min as f64 / 60.0) / max_weekly_hours).ceil().max(1.0) as usize;

        // Proxy for how much part-time coverage is likely needed: short tours
        // relative to a full day push PT pressure up.
        let short_tours = instances.iter().filter(|t| t.duration_min < 240).count();
        let pt_pressure_proxy = if n_tours > 0 {
            short_tours as f64 / n_tours as f64
        } else {
            0.0
        };

        let pool_pressure = blocks_per_tour_avg;

        Self {
            n_tours,
            blocks_per_tour_avg,
            peakiness_index,
            pt_pressure_proxy,
            pool_pressure,
            lower_bound_drivers,
        }
    }

    /// Picks FAST / BALANCED / HEAVY per spec.md §4.4's thresholds.
    pub fn select_path(&self) -> SolverPath {
        if self.pool_pressure > 8.0 {
            SolverPath::Heavy
        } else if self.peakiness_index > 2.0 || self.pt_pressure_proxy > 0.35 {
            SolverPath::Balanced
        } else {
            SolverPath::Fast
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseBudget {
    pub phase1_s: f64,
    pub lns_s: f64,
    pub phase2_s: f64,
}

impl SolverPath {
    /// Splits `time_budget_s` into fixed fractional phases per path.
    pub fn budget_split(self, time_budget_s: u64) -> PhaseBudget {
        let total = time_budget_s as f64;
        match self {
            SolverPath::Fast => PhaseBudget {
                phase1_s: total * 0.20,
                lns_s: total * 0.70,
                phase2_s: total * 0.10,
            },
            SolverPath::Balanced => PhaseBudget {
                phase1_s: total * 0.30,
                lns_s: total * 0.50,
                phase2_s: total * 0.20,
            },
            SolverPath::Heavy => PhaseBudget {
                phase1_s: total * 0.60,
                lns_s: total * 0.10,
                phase2_s: total * 0.30,
            },
        }
    }
}

/// Reason codes recorded when the stagnation detector forces a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FallbackReason {
    Stagnation,
    RepairFailureRateExceeded,
}

/// Ordered fallback ladder `FAST -> BALANCED -> HEAVY`.
pub fn next_fallback(path: SolverPath) -> Option<SolverPath> {
    match path {
        SolverPath::Fast => Some(SolverPath::Balanced),
        SolverPath::Balanced => Some(SolverPath::Heavy),
        SolverPath::Heavy => None,
    }
}

/// Early-stop detector: GOOD_ENOUGH when `score <= (1+eps) * lower_bound`.
pub fn is_good_enough(score: f64, lower_bound: f64, eps: f64) -> bool {
    score <= (1.0 + eps) * lower_bound
}

/// Stagnation: no improvement across `window` consecutive scores, or a repair
/// failure rate at/above `threshold`.
pub fn detect_stagnation(recent_scores: &[f64], window: usize, repair_failure_rate: f64, threshold: f64) -> Option<FallbackReason> {
    if repair_failure_rate >= threshold {
        return Some(FallbackReason::RepairFailureRateExceeded);
    }
    if recent_scores.len() >= window {
        let tail = &recent_scores[recent_scores.len() - window..];
        if tail.windows(2).all(|w| w[1] >= w[0]) {
            return Some(FallbackReason::Stagnation);
        }
    }
    None
}
