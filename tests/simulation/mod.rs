//! Simulation testing framework for deterministic referral tree workloads.

pub mod context;
pub mod invariants;

pub use context::WorkloadContext;
pub use invariants::{InvariantViolation, ReferenceModel, SnapshotChecker, TreeOperation};
pub use workload::{WorkloadConfig, WorkloadResult, WorkloadRunner};
