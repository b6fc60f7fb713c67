//! Evidence packs (spec.md §4.7): on publish, a content-addressed archive of
//! the canonical forecast, plan JSON, assignments CSV, audit results, and
//! KPIs, manifested with a SHA-256 checksum per member. The evidence store
//! itself (blob storage) is out of scope; this type models the pure
//! construction of the manifest and its content address.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidencePack {
    /// member filename -> its raw contents.
    pub members: BTreeMap<String, String>,
    /// member filename -> SHA-256 hex of its contents.
    pub checksums: BTreeMap<String, String>,
    /// Content address of the whole pack: SHA-256 over the canonical-JSON
    /// checksum manifest. Plans hold only this hash (a weak reference).
    pub hash: String,
}

impl EvidencePack {
    pub fn build(
        canonical_forecast_json: impl Into<String>,
        plan_json: impl Into<String>,
        assignments_csv: impl Into<String>,
        audit_results_json: impl Into<String>,
        kpis_json: impl Into<String>,
    ) -> Self {
        let mut members = BTreeMap::new();
        members.insert("forecast.json".to_string(), canonical_forecast_json.into());
        members.insert("plan.json".to_string(), plan_json.into());
        members.insert("assignments.csv".to_string(), assignments_csv.into());
        members.insert("audit.json".to_string(), audit_results_json.into());
        members.insert("kpis.json".to_string(), kpis_json.into());

        let checksums: BTreeMap<String, String> = members
            .iter()
            .map(|(name, contents)| (name.clone(), crate::sha256_hex(contents.as_bytes())))
            .collect();

        let manifest = serde_json::to_string(&checksums).expect("checksum map always serializes");
        let hash = crate::sha256_hex(manifest);

        Self {
            members,
            checksums,
            hash,
        }
    }
}
