//! A single monitor interval: one experimental slot in the ring
//! (`SPEC_FULL.md` §3).

use super::fixed::Fixed64;
use super::fsm::State;
use super::host::SackBlock;
use std::time::Instant;

/// One monitor interval's bookkeeping. Fields mirror §3 of the spec
/// directly; there is deliberately no behavior here beyond simple field
/// mutation — the ring, FSM and ack-accounting modules own the logic that
/// drives these transitions.
#[derive(Debug, Clone, Copy)]
pub struct MonitorInterval {
    /// Whether this slot is currently in use.
    pub valid: bool,
    /// Quartet slot this interval occupies, `0` if none.
    pub decision_id: u8,
    /// FSM state at the moment this interval was opened.
    pub state_at_start: State,
    /// Monotonic time the interval opened.
    pub start_time: Instant,
    /// Planned duration of the interval, microseconds.
    pub end_time_us: u64,
    /// First sequence number to be sent in this interval.
    pub snd_start_seq: u32,
    /// Highest sequence number sent while this interval was current.
    pub snd_end_seq: u32,
    /// Highest sequence known delivered or SACK-bounded.
    pub last_acked_seq: u32,
    /// Count of data segments attributed to this interval.
    pub segments_sent: u32,
    /// Aggregated gap bytes inferred from SACK holes.
    pub bytes_lost: u64,
    /// The pacing rate this interval was opened with, bytes/second.
    pub target_rate: u64,
    /// Signed utility, computed on close.
    pub utility: Fixed64,
    /// Measured delivery rate, computed on close.
    pub actual_rate: u64,
    /// Last RTT sample at open time, microseconds.
    pub rtt_snapshot: u64,
}

impl MonitorInterval {
    /// A blank, invalid interval, used to seed a fresh ring slot.
    #[must_use]
    pub fn blank(now: Instant) -> Self {
        Self {
            valid: false,
            decision_id: 0,
            state_at_start: State::Start,
            start_time: now,
            end_time_us: 0,
            snd_start_seq: 0,
            snd_end_seq: 0,
            last_acked_seq: 0,
            segments_sent: 0,
            bytes_lost: 0,
            target_rate: 0,
            utility: Fixed64::ZERO,
            actual_rate: 0,
            rtt_snapshot: 0,
        }
    }

    /// Elapsed time since this interval opened, microseconds.
    #[must_use]
    pub fn elapsed_us(&self, now: Instant) -> u64 {
        now.saturating_duration_since(self.start_time)
            .as_micros()
            .min(u128::from(u64::MAX)) as u64
    }

    /// Whether the interval has sent anything yet.
    #[must_use]
    pub const fn has_sent(&self) -> bool {
        self.snd_end_seq != self.snd_start_seq
    }

    /// Apply a non-absent SACK block against this interval, per the
    /// gap-accounting algorithm of §4.3. No-op if the block is absent or
    /// the interval isn't waiting on more data than has already been
    /// acked.
    pub(super) fn apply_sack_block(&mut self, block: SackBlock) {
        use super::seq::{seq_gt, seq_lt, seq_min};

        if block.is_absent() {
            return;
        }
        if seq_lt(self.last_acked_seq, self.snd_end_seq) {
            let gap_end = seq_min(block.start_seq, self.snd_end_seq);
            if seq_lt(self.last_acked_seq, gap_end) {
                let gap = u64::from(super::seq::seq_diff(self.last_acked_seq, gap_end));
                self.bytes_lost = self.bytes_lost.saturating_add(gap);
            }
        }
        if seq_gt(block.end_seq, self.last_acked_seq) {
            self.last_acked_seq = block.end_seq;
        }
    }
}
