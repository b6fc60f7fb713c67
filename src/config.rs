//! Policy configuration knobs (spec.md §6), loaded from TOML.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub time_budget_s: u64,
    pub pass2_min_time_s: u64,
    pub seed: u64,
    pub max_weekly_hours: f64,
    pub min_rest_minutes: u32,
    pub freeze_horizon_min: u32,
    pub pt_penalty: f64,
    pub cap_quota_2er: f64,
    pub kill_switch: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            time_budget_s: 180,
            pass2_min_time_s: 30,
            seed: 94,
            max_weekly_hours: 55.0,
            min_rest_minutes: 660,
            freeze_horizon_min: 720,
            pt_penalty: 150_000.0,
            cap_quota_2er: 0.30,
            kill_switch: false,
        }
    }
}

impl PolicyConfig {
    pub fn from_toml_str(s: &str) -> crate::SolverResult<Self> {
        toml::from_str(s)
            .map_err(|e| crate::SolverError::validation("config", e.to_string()))
    }

    /// Deterministic config fingerprint used as `solver_config_hash` in the
    /// Plan Version data model (spec.md §3).
    pub fn config_hash(&self) -> String {
        let canonical = serde_json::to_string(self).expect("PolicyConfig always serializes");
        crate::sha256_hex(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_documented_defaults() {
        let c = PolicyConfig::default();
        assert_eq!(c.time_budget_s, 180);
        assert_eq!(c.seed, 94);
        assert_eq!(c.max_weekly_hours, 55.0);
        assert_eq!(c.min_rest_minutes, 660);
        assert_eq!(c.freeze_horizon_min, 720);
        assert_eq!(c.pt_penalty, 150_000.0);
        assert_eq!(c.cap_quota_2er, 0.30);
        assert!(!c.kill_switch);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let c = PolicyConfig::from_toml_str("seed = 7\nkill_switch = true\n").unwrap();
        assert_eq!(c.seed, 7);
        assert!(c.kill_switch);
        assert_eq!(c.max_weekly_hours, 55.0);
    }

    #[test]
    fn config_hash_is_deterministic_and_sensitive() {
        let a = PolicyConfig::default();
        let mut b = PolicyConfig::default();
        assert_eq!(a.config_hash(), b.config_hash());
        b.seed = 95;
        assert_ne!(a.config_hash(), b.config_hash());
    }
}
