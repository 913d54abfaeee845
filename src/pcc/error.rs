//! Error types for the PCC engine's fallible, caller-facing operations.
//!
//! Internal invariant fixups (an interval whose `end_time_us` is zero, a
//! loss count that outruns bytes sent, a ring slot overrun) are *not*
//! routed through this type — per `SPEC_FULL.md` §7 they are logged via
//! `tracing` and repaired in place so the transport never sees a failure.
//! `PccError` exists for the smaller set of operations that can genuinely
//! fail: building a [`SackBlock`](super::ack::SackBlock) from malformed
//! host input, and the registry failing to reserve space for a new
//! connection.

use core::fmt;

/// Unified error type for PCC engine construction and input validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PccError {
    /// A SACK block's `start_seq` is after its `end_seq` under wrap-aware
    /// ordering.
    InvalidSackRange {
        /// Block start sequence number.
        start: u32,
        /// Block end sequence number.
        end: u32,
    },
    /// The registry could not reserve space for a new connection entry.
    /// Mirrors the spec's "allocation failure on Controller construction"
    /// error kind (§7): the hook becomes a no-op for this connection.
    ControllerAllocationFailed {
        /// Connection the allocation was attempted for.
        connection: u64,
    },
}

impl fmt::Display for PccError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSackRange { start, end } => {
                write!(f, "invalid SACK range: start {start} after end {end}")
            }
            Self::ControllerAllocationFailed { connection } => write!(
                f,
                "failed to allocate PCC controller for connection {connection}"
            ),
        }
    }
}

impl std::error::Error for PccError {}

/// Result alias for PCC fallible operations.
pub type Result<T> = std::result::Result<T, PccError>;
