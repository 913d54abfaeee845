//! `ControllerAPI`: the per-connection hooks the host transport calls,
//! sequencing the ring, FSM, ack-accounting and utility components
//! (`SPEC_FULL.md` §4.5, §2).

use super::ack;
use super::config::Config;
use super::fsm::{ClosedInterval, Fsm, PreviousInterval};
use super::host::{AckSample, HostSnapshot, HostUpdate};
use super::ring::MonitorRing;
use super::utility;
use std::time::Instant;
use tracing::trace;

/// Sentinel `ssthresh` value meaning "no window limit" (`u32::MAX`,
/// matching `TCP_INFINITE_SSTHRESH`-style conventions).
pub const INFINITE_SSTHRESH: u32 = u32::MAX;

/// Congestion window (segments) published to effectively disable
/// window-based limits, per §4.5's "set cwnd = LARGE_CWND".
pub const LARGE_CWND: u32 = 1_000_000;

/// Per-connection PCC state: the ring, the FSM, and the accounting needed
/// to drive both from host ACK events.
#[derive(Debug, Clone)]
pub struct Controller {
    config: Config,
    ring: MonitorRing,
    fsm: Fsm,
    last_rtt_us: u64,
    snd_count: u64,
    last_data_segs_out: u64,
}

impl Controller {
    /// Construct a fresh controller, anchored at `now`. The ring's current
    /// slot starts invalid; the first hook call opens it (§4.5 step d).
    #[must_use]
    pub fn new(config: Config, now: Instant) -> Self {
        Self {
            fsm: Fsm::new(&config),
            ring: MonitorRing::new(now),
            last_rtt_us: 0,
            snd_count: 0,
            last_data_segs_out: 0,
            config,
        }
    }

    /// The ring, for diagnostics and tests.
    #[must_use]
    pub fn ring(&self) -> &MonitorRing {
        &self.ring
    }

    /// The FSM, for diagnostics and tests.
    #[must_use]
    pub fn fsm(&self) -> &Fsm {
        &self.fsm
    }

    /// Total segments ever sent on this connection (`snd_count`).
    #[must_use]
    pub const fn snd_count(&self) -> u64 {
        self.snd_count
    }

    /// `on_ssthresh_query`: run the housekeeping pass and report no window
    /// limit.
    pub fn on_ssthresh_query(&mut self, host: &HostSnapshot) -> u32 {
        self.do_checks(host);
        INFINITE_SSTHRESH
    }

    /// `on_pkts_acked`: record the RTT sample, run ack accounting, run the
    /// housekeeping pass, and report the window override.
    pub fn on_pkts_acked(&mut self, host: &HostSnapshot, ack_sample: AckSample) -> HostUpdate {
        if ack_sample.rtt_us > 0 {
            self.last_rtt_us = ack_sample.rtt_us as u64;
        }
        self.run_ack_accounting(host);
        let mut update = self.do_checks(host);
        update.cwnd = LARGE_CWND;
        update
    }

    /// `on_in_ack_event`: ack accounting only, no rate publication.
    pub fn on_in_ack_event(&mut self, host: &HostSnapshot) {
        self.run_ack_accounting(host);
    }

    fn run_ack_accounting(&mut self, host: &HostSnapshot) {
        let mut blocks = host.sack_blocks;
        ack::apply(self.ring.slots_mut(), host.snd_una, &mut blocks);
    }

    /// §4.5 `do_checks`: update send progress, advance the ring, close
    /// anything due, and open a fresh interval if needed. Returns the
    /// pacing rate/cwnd/snd_wnd the host should now apply.
    fn do_checks(&mut self, host: &HostSnapshot) -> HostUpdate {
        let delta = host.data_segs_out.saturating_sub(self.last_data_segs_out);
        if delta > 0 {
            let delta_segments = u32::try_from(delta).unwrap_or(u32::MAX);
            self.ring.note_sent(delta_segments, host.next_seq_to_send);
            self.snd_count = self.snd_count.saturating_add(delta);
            self.last_data_segs_out = host.data_segs_out;
        }

        self.ring.advance_if_due(host.now, &self.config);

        for index in self.ring.closable_slots(host.now) {
            self.close_interval(index, host);
        }

        if !self.ring.current().valid {
            self.open_interval(host);
        }

        HostUpdate {
            pacing_rate: self.ring.current().target_rate.max(self.config.min_rate),
            cwnd: LARGE_CWND,
            snd_wnd: self.config.clamp_snd_wnd.then_some(self.config.snd_wnd_clamp),
        }
    }

    fn open_interval(&mut self, host: &HostSnapshot) {
        let rtt_us = if host.srtt_us > 0 {
            u64::from(host.srtt_us)
        } else {
            self.last_rtt_us
        };
        let decision = self.fsm.on_open(&self.config);
        self.ring.open_current(
            host.now,
            decision.target_rate,
            rtt_us,
            decision.state_at_start,
            decision.decision_id,
            host.next_seq_to_send,
            &self.config,
        );
    }

    fn close_interval(&mut self, index: usize, host: &HostSnapshot) {
        let mss = host.advmss.max(1);
        let snapshot = *self.ring.get(index);
        let result = utility::compute(&snapshot, mss, &self.config);

        let previous_index = MonitorRing::previous_index(index);
        let previous_slot = self.ring.get(previous_index);
        // `target_rate == 0` is only possible for a slot that has never
        // been opened (every opened interval's rate is clamped to
        // `min_rate`), so it doubles as the "nothing to compare against
        // yet" sentinel rather than a dedicated flag.
        let previous = (previous_slot.target_rate > 0).then(|| PreviousInterval {
            target_rate: previous_slot.target_rate,
            actual_rate: previous_slot.actual_rate,
            utility: previous_slot.utility,
        });

        self.fsm.on_close(
            ClosedInterval {
                state_at_start: snapshot.state_at_start,
                decision_id: snapshot.decision_id,
                target_rate: snapshot.target_rate,
                utility: result.utility,
                actual_rate: result.actual_rate,
                eligible: result.eligible,
            },
            previous,
            self.snd_count,
            &self.config,
        );

        trace!(index, utility = %result.utility, actual_rate = result.actual_rate, "interval closed");

        let slot = &mut self.ring.slots_mut()[index];
        slot.utility = result.utility;
        slot.actual_rate = result.actual_rate;
        self.ring.invalidate(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcc::host::SackBlock;
    use std::time::Duration;

    fn snapshot(now: Instant, next_seq: u32, snd_una: u32, data_segs_out: u64) -> HostSnapshot {
        HostSnapshot {
            next_seq_to_send: next_seq,
            snd_una,
            sack_blocks: [SackBlock::ABSENT; 4],
            data_segs_out,
            advmss: 1460,
            srtt_us: 30_000,
            now,
        }
    }

    #[test]
    fn first_hook_opens_an_interval_at_initial_rate() {
        let now = Instant::now();
        let mut controller = Controller::new(Config::default(), now);
        let update = controller.on_ssthresh_query(&snapshot(now, 0, 0, 0));
        assert_eq!(update, INFINITE_SSTHRESH);
        assert!(controller.ring().current().valid);
        assert_eq!(controller.ring().current().target_rate, 1_000_000);
    }

    #[test]
    fn loss_free_stream_ramps_through_six_start_intervals() {
        let config = Config::default();
        let now = Instant::now();
        let mut controller = Controller::new(config, now);
        let mut t = now;
        let mut seq = 0u32;
        let mut segs = 0u64;
        let mut observed_rates = Vec::new();

        for _ in 0..6 {
            // Drive enough sends to clear the under-sampling floor, then
            // let the window elapse with ACKs fully caught up.
            segs += 25;
            seq += 25 * 1460;
            let mut snap = snapshot(t, seq, seq, segs);
            let update = controller.on_pkts_acked(&snap, AckSample { rtt_us: 30_000 });
            observed_rates.push(update.pacing_rate);

            let end_time_us = controller.ring().current().end_time_us;
            t += Duration::from_micros(end_time_us + 1);
            snap.now = t;
            snap.snd_una = seq;
            controller.on_pkts_acked(&snap, AckSample { rtt_us: 30_000 });
        }

        assert_eq!(controller.fsm().state(), crate::pcc::fsm::State::Start);
        assert!(observed_rates[0] <= 2_000_000);
    }

    #[test]
    fn sack_driven_loss_updates_current_interval() {
        let now = Instant::now();
        let mut controller = Controller::new(Config::default(), now);
        controller.on_ssthresh_query(&snapshot(now, 0, 0, 0));
        // Put the current slot in a known state matching scenario 6.
        {
            let slot = controller.ring.current_mut();
            slot.snd_end_seq = 3000;
            slot.last_acked_seq = 1000;
        }
        let mut snap = snapshot(now, 3000, 1000, 0);
        snap.sack_blocks[0] = SackBlock { start_seq: 2000, end_seq: 3000 };
        controller.on_in_ack_event(&snap);
        let slot = controller.ring().current();
        assert_eq!(slot.bytes_lost, 1000);
        assert_eq!(slot.last_acked_seq, 3000);
    }

    #[test]
    fn pacing_rate_is_never_below_min_rate() {
        let now = Instant::now();
        let mut controller = Controller::new(Config::default(), now);
        let update = controller.on_pkts_acked(&snapshot(now, 0, 0, 0), AckSample::default());
        assert!(update.pacing_rate >= Config::default().min_rate);
    }
}
