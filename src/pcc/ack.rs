//! Converts a cumulative ACK and up to four SACK blocks into per-interval
//! `last_acked_seq` advancement and `bytes_lost` deltas (`SPEC_FULL.md`
//! §4.3).
//!
//! The RTT-sample bookkeeping (step 1 of the algorithm) lives on
//! [`super::controller::Controller`], since `last_rtt` is connection-wide
//! state, not something this module touches. This module is the pure,
//! easily-tested remainder: sort the blocks, then walk every valid
//! interval applying the gap-accounting rule.

use super::host::SackBlock;
use super::interval::MonitorInterval;
use super::seq::{seq_gt, seq_lt};
use tracing::trace;

/// Sort up to four SACK blocks by `start_seq` using wrap-aware ordering.
/// A simple insertion sort is sufficient for four elements and keeps the
/// absent (`(0,0)`) sentinels predictably ordered.
fn sort_blocks(blocks: &mut [SackBlock; 4]) {
    for i in 1..blocks.len() {
        let mut j = i;
        while j > 0 && seq_lt(blocks[j].start_seq, blocks[j - 1].start_seq) {
            blocks.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Apply one ACK event's cumulative ACK and SACK blocks against every
/// valid interval in the ring.
pub fn apply(slots: &mut [MonitorInterval], snd_una: u32, sack_blocks: &mut [SackBlock; 4]) {
    sort_blocks(sack_blocks);

    for (index, slot) in slots.iter_mut().enumerate() {
        if !slot.valid {
            continue;
        }

        if seq_gt(snd_una, slot.last_acked_seq) {
            slot.last_acked_seq = snd_una;
        }

        for block in sack_blocks.iter() {
            slot.apply_sack_block(*block);
        }

        trace!(
            index,
            last_acked_seq = slot.last_acked_seq,
            bytes_lost = slot.bytes_lost,
            "applied ack event to interval"
        );
    }
}
