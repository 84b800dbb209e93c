use std::fmt;

use thiserror::Error;

use crate::provider::CatalogError;
use crate::sync::batch::BatchError;

/// Stage of a run in which a remote call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Identify,
    Resolve,
    Locate,
    Compare,
    Create,
    Clear,
    Add,
    Export,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Identify => "identify",
            Phase::Resolve => "resolve",
            Phase::Locate => "locate",
            Phase::Compare => "compare",
            Phase::Create => "create",
            Phase::Clear => "clear",
            Phase::Add => "add",
            Phase::Export => "export",
        };
        f.pad(s)
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    /// No usable catalog handle. Raised before any remote call.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{phase} failed: {source}")]
    Transport {
        phase: Phase,
        #[source]
        source: CatalogError,
    },

    /// A batch mutation failed part way; chunks before `chunk` were applied.
    #[error("{phase} failed at batch {} of {total}: {source}", .chunk + 1)]
    Batch {
        phase: Phase,
        chunk: usize,
        total: usize,
        #[source]
        source: CatalogError,
    },

    #[error("no playlist named '{0}' owned by the current account")]
    PlaylistNotFound(String),
}

impl SyncError {
    pub fn transport(phase: Phase) -> impl FnOnce(CatalogError) -> SyncError {
        move |source| SyncError::Transport { phase, source }
    }

    pub fn batch(phase: Phase) -> impl FnOnce(BatchError) -> SyncError {
        move |err| SyncError::Batch {
            phase,
            chunk: err.chunk,
            total: err.total,
            source: err.source,
        }
    }

    /// The phase a remote failure happened in, if any.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            SyncError::Transport { phase, .. } | SyncError::Batch { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_display_pads() {
        assert_eq!(format!("{:<8}|", Phase::Add), "add     |");
    }

    #[test]
    fn test_batch_message_is_one_based() {
        let err = SyncError::batch(Phase::Clear)(BatchError {
            mutation: crate::sync::batch::Mutation::Remove,
            chunk: 0,
            total: 2,
            source: CatalogError::Api {
                status: 500,
                message: "oops".to_string(),
            },
        });

        assert_eq!(err.to_string(), "clear failed at batch 1 of 2: catalog API error 500: oops");
    }
}
