//! End-to-end scenarios driven entirely through the public hook API.

use pcc_pacer::{AckSample, Config, Controller, ConnectionId, HostSnapshot, PccModule, SackBlock};
use std::time::{Duration, Instant};

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
fn cold_start_publishes_an_initial_rate_at_or_above_the_floor() {
    let mut controller = Controller::new(Config::default(), Instant::now());
    let now = Instant::now();
    let update = controller.on_pkts_acked(&snapshot(now, 0, 0, 0), AckSample::default());
    assert!(update.pacing_rate >= Config::default().min_rate);
    assert_eq!(update.cwnd, pcc_pacer::LARGE_CWND);
}

#[test]
fn sack_driven_loss_is_visible_through_the_public_ring_accessor() {
    let now = Instant::now();
    let mut controller = Controller::new(Config::default(), now);
    controller.on_ssthresh_query(&snapshot(now, 0, 0, 0));

    // Drive sends so the current interval's sequence range covers the gap
    // named in the scenario.
    let with_sends = snapshot(now, 3000, 0, 3000 / 1460);
    controller.on_pkts_acked(&with_sends, AckSample { rtt_us: 30_000 });

    let mut with_sack = snapshot(now, 3000, 1000, 3000 / 1460);
    with_sack.sack_blocks[0] = SackBlock { start_seq: 2000, end_seq: 3000 };
    controller.on_in_ack_event(&with_sack);

    let current = controller.ring().current();
    assert!(current.bytes_lost > 0, "the SACK gap should be recorded as loss");
    assert_eq!(current.last_acked_seq, 3000);
}

#[test]
fn module_tracks_independent_connections() {
    let mut module = PccModule::new(Config::default());
    let now = Instant::now();
    let a = ConnectionId::new(1);
    let b = ConnectionId::new(2);

    // `init` only reports the rate to publish; it allocates nothing.
    module.init(a);
    module.init(b);
    assert_eq!(module.connection_count(), 0);

    // Only connection `a` sends data; `b` stays idle. Both still get their
    // own controller on first real hook invocation.
    let busy = snapshot(now, 1460 * 30, 0, 30);
    module.on_pkts_acked(a, &busy, AckSample { rtt_us: 30_000 });

    let idle = snapshot(now, 0, 0, 0);
    module.on_pkts_acked(b, &idle, AckSample { rtt_us: 30_000 });

    assert_eq!(module.connection_count(), 2);
}

#[test]
fn idle_connection_never_advances_past_the_floor_rate() {
    let mut controller = Controller::new(Config::default(), Instant::now());
    let mut now = Instant::now();
    for _ in 0..5 {
        let update = controller.on_pkts_acked(&snapshot(now, 0, 0, 0), AckSample::default());
        assert!(update.pacing_rate >= Config::default().min_rate);
        now += Duration::from_millis(50);
    }
}

#[test]
fn release_drops_connection_state_and_future_hooks_start_fresh() {
    let mut module = PccModule::new(Config::default());
    let now = Instant::now();
    let conn = ConnectionId::new(9);

    module.init(conn);
    assert_eq!(module.connection_count(), 0, "init alone must not allocate a controller");
    let busy = snapshot(now, 1460 * 30, 1460 * 30, 30);
    module.on_pkts_acked(conn, &busy, AckSample { rtt_us: 30_000 });
    module.release(conn);
    assert_eq!(module.connection_count(), 0);

    let update = module.on_ssthresh_query(conn, &snapshot(now, 0, 0, 0));
    assert_eq!(update, pcc_pacer::INFINITE_SSTHRESH);
    assert_eq!(module.connection_count(), 1, "hook lazily re-creates the connection");
}
