//! Crate-wide error taxonomy.
//!
//! Mirrors §7 of the design: validation, policy, solver, integrity, transport,
//! and security errors are distinct variants with stable machine-readable codes
//! so callers (CLI, eventual HTTP layer) can map them to exit codes / status codes
//! without string matching.

use thiserror::Error;

pub type SolverResult<T> = Result<T, SolverError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverError {
    /// Malformed input, unknown tenant, invalid timestamp. Never mutates state.
    #[error("validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    /// Deterministic refusal: plan locked, freeze window, kill switch, idempotency mismatch.
    #[error("policy refusal [{code}]: {message}")]
    Policy { code: &'static str, message: String },

    /// Infeasible, budget overrun, stagnation. Best incumbent (if any) is returned alongside.
    #[error("solver error [{code}]: {message}")]
    Solver { code: &'static str, message: String },

    /// Hash-chain break or reproducibility failure. Severity S0; plan never reaches PUBLISHED.
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// Provider 5xx/timeout after exhausting retries.
    #[error("transport error: {0}")]
    Transport(String),

    /// Bad signature, replay, body mismatch. Never retried.
    #[error("security error [{code}]: {message}")]
    Security { code: &'static str, message: String },

    /// Programmer-bug invariant violation. Should abort the current task, never the process.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl SolverError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn policy(code: &'static str, message: impl Into<String>) -> Self {
        Self::Policy {
            code,
            message: message.into(),
        }
    }

    pub fn solver(code: &'static str, message: impl Into<String>) -> Self {
        Self::Solver {
            code,
            message: message.into(),
        }
    }

    pub fn security(code: &'static str, message: impl Into<String>) -> Self {
        Self::Security {
            code,
            message: message.into(),
        }
    }

    pub fn integrity(message: impl Into<String>) -> Self {
        Self::Integrity(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// CLI/process exit code per the external-interface contract in §6.
    ///
    /// `AUDIT_FAILED` is a [`SolverError::Policy`] variant rather than
    /// [`SolverError::Integrity`] (it's a deterministic refusal, not a
    /// hash-chain or reproducibility break) but spec.md §6 still assigns it
    /// the same exit code as an audit failure (`4`), not the generic `5`
    /// every other policy refusal gets.
    pub fn exit_code(&self) -> i32 {
        match self {
            SolverError::Validation { .. } => 2,
            SolverError::Solver { .. } => 3,
            SolverError::Integrity(_) => 4,
            SolverError::Policy { code: "AUDIT_FAILED", .. } => 4,
            SolverError::Policy { .. } | SolverError::Security { .. } => 5,
            SolverError::Transport(_) | SolverError::Internal(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_match_the_cli_contract() {
        assert_eq!(SolverError::validation("f", "m").exit_code(), 2);
        assert_eq!(SolverError::solver("INFEASIBLE", "m").exit_code(), 3);
        assert_eq!(SolverError::integrity("m").exit_code(), 4);
        assert_eq!(SolverError::policy("AUDIT_FAILED", "m").exit_code(), 4);
        assert_eq!(SolverError::policy("KILL_SWITCH_ACTIVE", "m").exit_code(), 5);
        assert_eq!(SolverError::security("REPLAY_ATTACK", "m").exit_code(), 5);
    }
}
