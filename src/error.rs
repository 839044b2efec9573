//! Error types for heap operations, cost construction and search runs.

use thiserror::Error;

/// Error type for heap operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The handle does not refer to an entry currently held by this heap
    /// (it was removed, or it was issued by another heap)
    #[error("entry is no longer part of this heap")]
    InvalidEntryState,
    /// The requested key is greater than the entry's current key
    #[error("new key is greater than the current key")]
    InvalidKeyUpdate,
}

/// Error raised when a cost value cannot be represented.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostError {
    /// Floating point costs must be totally ordered, NaN is not.
    #[error("cost must not be NaN")]
    NotANumber,
}

/// Boxed error raised by a problem-specific collaborator.
pub type DomainError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error that aborts a running search.
///
/// Solutions accepted by the manager before the failure stay available.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The generator failed to expand a node.
    #[error("successor generation failed at depth {depth}")]
    Generator {
        depth: usize,
        #[source]
        source: DomainError,
    },

    /// The heuristic failed to estimate a node.
    #[error("heuristic estimation failed at depth {depth}")]
    Heuristic {
        depth: usize,
        #[source]
        source: DomainError,
    },
}

impl SearchError {
    pub(crate) fn generator<E>(depth: usize, err: E) -> Self
    where
        E: Into<DomainError>,
    {
        SearchError::Generator {
            depth,
            source: err.into(),
        }
    }

    pub(crate) fn heuristic<E>(depth: usize, err: E) -> Self
    where
        E: Into<DomainError>,
    {
        SearchError::Heuristic {
            depth,
            source: err.into(),
        }
    }

    /// Depth of the node being processed when the collaborator failed.
    pub fn depth(&self) -> usize {
        match self {
            SearchError::Generator { depth, .. } | SearchError::Heuristic { depth, .. } => *depth,
        }
    }
}
