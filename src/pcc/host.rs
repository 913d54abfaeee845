//! The external interface the engine consumes from, and writes back to,
//! the host transport (`SPEC_FULL.md` §6).
//!
//! The host stack itself — segmentation, retransmission, RTT estimation,
//! SACK parsing — is out of scope (§1); this module only defines the flat
//! data records that cross the boundary. Per the "no dynamic dispatch"
//! design note (§9), the engine never calls back into a `dyn Trait`: the
//! host reads a `HostSnapshot` it already has lying around, hands it to a
//! hook, and applies the returned `HostUpdate` to its own socket state.

use super::error::{PccError, Result};
use super::seq::seq_lt;
use std::time::Instant;

/// Opaque per-connection identifier used by [`super::module::PccModule`] to
/// key its controller registry. Stands in for the host's connection-scoped
/// opaque handle type named in the design notes (§9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    /// Wrap a raw connection identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// A single SACK block as delivered by the peer: `(start_seq, end_seq)`.
/// `(0, 0)` denotes an absent block, matching the host wire encoding
/// described in §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SackBlock {
    /// First sequence number covered by this block.
    pub start_seq: u32,
    /// One past the last sequence number covered by this block.
    pub end_seq: u32,
}

impl SackBlock {
    /// An absent block (`(0, 0)`).
    pub const ABSENT: Self = Self {
        start_seq: 0,
        end_seq: 0,
    };

    /// Whether this block is the absent sentinel.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        self.start_seq == 0 && self.end_seq == 0
    }

    /// Decode a SACK block from raw host fields, validating that
    /// `start_seq` is strictly before `end_seq` under wrap-aware ordering
    /// (§7's "decoding a `SackBlock` from raw host fields" fallible path).
    /// The absent sentinel `(0, 0)` always decodes successfully.
    pub fn try_new(start_seq: u32, end_seq: u32) -> Result<Self> {
        let block = Self { start_seq, end_seq };
        if block.is_absent() || seq_lt(start_seq, end_seq) {
            Ok(block)
        } else {
            Err(PccError::InvalidSackRange { start: start_seq, end: end_seq })
        }
    }
}

/// Host transport state read by the engine at hook entry.
#[derive(Debug, Clone, Copy)]
pub struct HostSnapshot {
    /// Next sequence number the transport will send (`snd_nxt`).
    pub next_seq_to_send: u32,
    /// Highest cumulatively acknowledged sequence number.
    pub snd_una: u32,
    /// Up to four SACK blocks; unused slots are [`SackBlock::ABSENT`].
    pub sack_blocks: [SackBlock; 4],
    /// Monotonic count of data segments sent on this connection so far.
    pub data_segs_out: u64,
    /// Maximum segment size in bytes.
    pub advmss: u32,
    /// Smoothed RTT estimate, microseconds. Zero if unknown.
    pub srtt_us: u32,
    /// Monotonic wall-clock reading at hook entry.
    pub now: Instant,
}

/// Pacing decisions the engine hands back for the host to apply to its own
/// socket state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostUpdate {
    /// New pacing rate, bytes/second (`sk_pacing_rate`).
    pub pacing_rate: u64,
    /// Congestion window to publish, in segments (`snd_cwnd`). The engine
    /// always requests a large constant here, effectively disabling
    /// window-based limits per §4.5.
    pub cwnd: u32,
    /// Optional `snd_wnd` override; `None` unless [`super::config::Config::clamp_snd_wnd`]
    /// is set.
    pub snd_wnd: Option<u32>,
}

/// An ACK sample delivered to `on_pkts_acked`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AckSample {
    /// RTT microseconds sampled from this ACK, if any (`<= 0` means none).
    pub rtt_us: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_accepts_a_well_ordered_block() {
        let block = SackBlock::try_new(1000, 2000).unwrap();
        assert_eq!(block, SackBlock { start_seq: 1000, end_seq: 2000 });
    }

    #[test]
    fn try_new_accepts_the_absent_sentinel() {
        let block = SackBlock::try_new(0, 0).unwrap();
        assert!(block.is_absent());
    }

    #[test]
    fn try_new_rejects_end_before_start() {
        let err = SackBlock::try_new(2000, 1000).unwrap_err();
        assert_eq!(err, PccError::InvalidSackRange { start: 2000, end: 1000 });
    }

    #[test]
    fn try_new_accepts_a_block_spanning_wraparound() {
        let near_max = u32::MAX - 10;
        let block = SackBlock::try_new(near_max, 5).unwrap();
        assert_eq!(block.start_seq, near_max);
        assert_eq!(block.end_seq, 5);
    }
}
