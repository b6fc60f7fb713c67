//! SOLVEREIGN — driver-roster scheduling and optimization engine.
//!
//! Given a weekly forecast of delivery tours, SOLVEREIGN builds legal per-driver
//! day blocks, generates weekly roster columns, solves a set-partitioning master
//! problem to minimize headcount, audits the result against eight deterministic
//! checks, and manages the immutable plan lifecycle (snapshots, freeze windows,
//! hash-chained evidence). A repair engine re-assigns tours after driver
//! absences without ever mutating a published plan in place.

pub mod audit;
pub mod audit_log;
pub mod block;
pub mod column;
pub mod config;
pub mod constraints;
pub mod error;
pub mod master;
pub mod model;
pub mod outbox;
pub mod plan;
pub mod portfolio;
pub mod repair;
pub mod security;
pub mod solution_space;
pub mod units;

pub use error::{SolverError, SolverResult};
pub use units::{convert, SameDim};

/// Identifier type used for tours, drivers, plans, and every other entity.
pub type Id = String;

/// Generates a new unique identifier (UUID v4).
pub fn generate_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}

/// Computes the lowercase hex SHA-256 digest of a byte sequence.
pub fn sha256_hex(data: impl AsRef<[u8]>) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data.as_ref());
    hex::encode(hasher.finalize())
}
