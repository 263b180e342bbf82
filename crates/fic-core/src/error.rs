//! Structured error type for every stage of a fault-injection campaign.

use std::path::PathBuf;

use thiserror::Error;

/// The seven error categories a campaign can surface.
///
/// `PlanRejected` is the one variant callers are expected to downgrade to a
/// log line rather than treat as fatal: the planner produces it whenever a
/// fault model declines to act on a site, which happens routinely (an
/// out-of-range retarget, a site too close to the end of a section) and is
/// not itself a defect.
#[derive(Debug, Error)]
pub enum FaultCampaignError {
    #[error("invalid ELF input {path}: {reason}")]
    InvalidElf { path: PathBuf, reason: String },

    #[error("fault plan rejected at offset {offset:#x}: {reason}")]
    PlanRejected { offset: u64, reason: String },

    #[error("failed to materialise {path}: {source}")]
    MaterialiseIoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("run of {binary} timed out after {timeout_secs}s")]
    ExecutionTimeout { binary: PathBuf, timeout_secs: u64 },

    #[error("failed to execute {binary}: {source}")]
    ExecutionIoError {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("result sink error: {0}")]
    ResultSinkError(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FaultCampaignError>;
