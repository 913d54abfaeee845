//! The fixed-capacity monitor-interval ring (`SPEC_FULL.md` §4.1).
//!
//! The ring only owns interval bookkeeping — opening a slot, recording
//! send progress, the graduation timer, and finding slots whose send
//! window has elapsed. It does not call into the FSM or the utility
//! computation itself; [`super::controller::Controller`] sequences those
//! (§2: "ControllerAPI hooks ... sequence the above"), which keeps the
//! ring a plain, independently testable data structure, matching how the
//! host crate's `LossManager` and `Scheduler` stay self-contained and let
//! a higher-level caller decide when to invoke them.

use super::config::{Config, RING_CAPACITY};
use super::fsm::State;
use super::interval::MonitorInterval;
use super::seq::seq_gt;
use std::time::Instant;
use tracing::warn;

/// Ring of `RING_CAPACITY` monitor intervals.
#[derive(Debug, Clone)]
pub struct MonitorRing {
    slots: [MonitorInterval; RING_CAPACITY],
    current_index: usize,
}

impl MonitorRing {
    /// Build an empty ring with every slot invalid, anchored at `now`.
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self {
            slots: [MonitorInterval::blank(now); RING_CAPACITY],
            current_index: 0,
        }
    }

    /// Index of the current (sending) slot.
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current_index
    }

    /// Index immediately before `index`, wrapping modulo the ring capacity.
    #[must_use]
    pub const fn previous_index(index: usize) -> usize {
        (index + RING_CAPACITY - 1) % RING_CAPACITY
    }

    /// Immutable access to the current slot.
    #[must_use]
    pub fn current(&self) -> &MonitorInterval {
        &self.slots[self.current_index]
    }

    /// Mutable access to the current slot.
    pub fn current_mut(&mut self) -> &mut MonitorInterval {
        &mut self.slots[self.current_index]
    }

    /// Read-only access to an arbitrary slot.
    #[must_use]
    pub fn get(&self, index: usize) -> &MonitorInterval {
        &self.slots[index]
    }

    /// Every slot, for `AckAccounting` to walk (not just the current one).
    pub fn slots_mut(&mut self) -> &mut [MonitorInterval; RING_CAPACITY] {
        &mut self.slots
    }

    /// Initialize the current slot per §4.1 `open_current`.
    #[allow(clippy::too_many_arguments)]
    pub fn open_current(
        &mut self,
        now: Instant,
        target_rate: u64,
        rtt_us: u64,
        state_at_start: State,
        decision_id: u8,
        next_seq_to_send: u32,
        config: &Config,
    ) {
        let duration_us = ((rtt_us as f64) * config.interval_rtt_multiplier) as u64;
        let slot = self.current_mut();
        slot.valid = true;
        slot.decision_id = decision_id;
        slot.state_at_start = state_at_start;
        slot.start_time = now;
        slot.end_time_us = duration_us;
        slot.snd_start_seq = next_seq_to_send;
        slot.snd_end_seq = 0;
        slot.last_acked_seq = next_seq_to_send;
        slot.segments_sent = 0;
        slot.bytes_lost = 0;
        slot.target_rate = target_rate;
        slot.utility = super::fixed::Fixed64::ZERO;
        slot.actual_rate = 0;
        slot.rtt_snapshot = rtt_us;
    }

    /// Record send progress on the current slot.
    pub fn note_sent(&mut self, delta_segments: u32, new_next_seq: u32) {
        let slot = self.current_mut();
        slot.segments_sent = slot.segments_sent.saturating_add(delta_segments);
        slot.snd_end_seq = new_next_seq;
    }

    /// Apply the graduation rule to the current slot (§4.5). Returns
    /// `true` if the ring advanced to a new current slot.
    pub fn advance_if_due(&mut self, now: Instant, config: &Config) -> bool {
        let elapsed = self.current().elapsed_us(now);
        if self.current().segments_sent < config.min_segments_per_interval {
            let slot = self.current_mut();
            while slot.end_time_us <= elapsed {
                slot.end_time_us = slot.end_time_us.saturating_add(config.undersample_extension_us);
            }
            return false;
        }

        if self.current().has_sent() && elapsed > self.current().end_time_us {
            self.current_mut().end_time_us = elapsed;
            let next_index = (self.current_index + 1) % RING_CAPACITY;
            if self.slots[next_index].valid {
                warn!(
                    index = next_index,
                    "ring slot still valid when advancing onto it, forcibly invalidating"
                );
                self.slots[next_index].valid = false;
            }
            self.current_index = next_index;
            return true;
        }

        false
    }

    /// Return the indices of every slot whose send window has elapsed and
    /// whose ACK frontier has caught up to everything sent — i.e. the
    /// slots `Controller::do_checks` should close this pass. Visited in
    /// index order (§4.1: "this order is not visible externally").
    #[must_use]
    pub fn closable_slots(&self, now: Instant) -> Vec<usize> {
        let mut ready = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            if !slot.valid {
                continue;
            }
            let elapsed = slot.elapsed_us(now);
            let window_elapsed = elapsed >= slot.end_time_us;
            let acks_caught_up = !seq_gt(slot.snd_end_seq, slot.last_acked_seq);
            if window_elapsed && acks_caught_up {
                ready.push(index);
            }
        }
        ready
    }

    /// Invalidate a slot after it has been closed and its FSM/utility
    /// hooks have run.
    pub fn invalidate(&mut self, index: usize) {
        self.slots[index].valid = false;
    }
}
