/// Ingestion state definitions for tracking upstream paging progress
///
/// The source ingester moves through these states exactly once per run.
use std::fmt;

/// Represents the current state of the source ingester
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestionState {
    // ===== Active States =====
    /// Nothing has been requested yet
    Uninitialized,

    /// The total item count is being fetched
    FetchingTotal,

    /// Index pages are being fetched and their items discovered
    PagingActive,

    // ===== Terminal States =====
    /// The early-stop count was reached before the index ran out
    Stopped,

    /// Every page of the index was processed
    Exhausted,
}

impl IngestionState {
    /// Returns true if this is a terminal state (no further paging happens)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Exhausted)
    }

    /// Returns true if the state machine may move from `self` to `next`
    pub fn can_transition_to(&self, next: IngestionState) -> bool {
        matches!(
            (self, next),
            (Self::Uninitialized, Self::FetchingTotal)
                | (Self::FetchingTotal, Self::PagingActive)
                | (Self::PagingActive, Self::Stopped)
                | (Self::PagingActive, Self::Exhausted)
        )
    }

    /// Returns the lowercase name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::FetchingTotal => "fetching_total",
            Self::PagingActive => "paging_active",
            Self::Stopped => "stopped",
            Self::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for IngestionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
