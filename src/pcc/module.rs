//! `PccModule`: the multi-connection registry the host's congestion-control
//! framework actually talks to (`SPEC_FULL.md` §2, §5).
//!
//! One [`Controller`] per connection, keyed by [`ConnectionId`]. The registry
//! itself holds no per-packet logic — it only locates (or lazily builds) the
//! right controller and forwards the call, matching how the host crate's
//! connection-keyed maps (e.g. its endpoint/session tables) stay thin
//! dispatchers around per-connection state.

use super::config::Config;
use super::controller::Controller;
use super::error::{PccError, Result};
use super::host::{AckSample, ConnectionId, HostSnapshot, HostUpdate};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, warn};

/// Identifier a host registers this congestion-control module under.
pub const MODULE_NAME: &str = "pcc";

/// Registry of per-connection [`Controller`]s.
#[derive(Debug, Default)]
pub struct PccModule {
    config: Config,
    controllers: HashMap<ConnectionId, Controller>,
}

impl PccModule {
    /// Build a registry that hands out controllers built from `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            controllers: HashMap::new(),
        }
    }

    /// Number of connections currently tracked, for diagnostics.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.controllers.len()
    }

    /// `init`: report the rate to publish before any monitor interval has
    /// opened. The `Controller` itself is *not* allocated here — per the
    /// lifecycle note in `SPEC_FULL.md` §3, it is lazily constructed on the
    /// first of `on_ssthresh_query`/`on_pkts_acked`/`on_in_ack_event`
    /// (`controller_mut`, below).
    #[must_use]
    pub fn init(&self, connection: ConnectionId) -> HostUpdate {
        debug!(connection = connection.0, "pcc connection registered");
        HostUpdate {
            pacing_rate: self.config.initial_rate,
            cwnd: super::controller::LARGE_CWND,
            snd_wnd: None,
        }
    }

    /// `ssthresh` query: housekeeping pass, no window limit reported.
    pub fn on_ssthresh_query(&mut self, connection: ConnectionId, host: &HostSnapshot) -> u32 {
        match self.controller_mut(connection, host.now) {
            Some(controller) => controller.on_ssthresh_query(host),
            None => super::controller::INFINITE_SSTHRESH,
        }
    }

    /// `pkts_acked`: ack accounting, housekeeping, and the new pacing
    /// decision to publish.
    pub fn on_pkts_acked(
        &mut self,
        connection: ConnectionId,
        host: &HostSnapshot,
        ack: AckSample,
    ) -> HostUpdate {
        match self.controller_mut(connection, host.now) {
            Some(controller) => controller.on_pkts_acked(host, ack),
            None => HostUpdate {
                pacing_rate: self.config.initial_rate,
                cwnd: super::controller::LARGE_CWND,
                snd_wnd: None,
            },
        }
    }

    /// `in_ack_event`: ack accounting only.
    pub fn on_in_ack_event(&mut self, connection: ConnectionId, host: &HostSnapshot) {
        if let Some(controller) = self.controller_mut(connection, host.now) {
            controller.on_in_ack_event(host);
        }
    }

    /// `cong_control`: present in the hook table for API completeness but
    /// inert — this engine paces via `pacing_rate`/`cwnd`, not via a
    /// per-ACK congestion_control override (§6).
    pub fn on_cong_control(&mut self, _connection: ConnectionId, _host: &HostSnapshot) {}

    /// `release`: drop a connection's controller.
    pub fn release(&mut self, connection: ConnectionId) {
        if self.controllers.remove(&connection).is_some() {
            debug!(connection = connection.0, "pcc controller released");
        }
    }

    fn controller_mut(&mut self, connection: ConnectionId, now: Instant) -> Option<&mut Controller> {
        if !self.controllers.contains_key(&connection) {
            if let Err(err) = self.try_allocate(connection, now) {
                warn!(connection = connection.0, error = %err, "hook is a no-op for this connection");
                return None;
            }
        }
        self.controllers.get_mut(&connection)
    }

    /// The one place a `Controller` is actually constructed and inserted
    /// (§7's "allocation failure on Controller construction" error kind).
    fn try_allocate(&mut self, connection: ConnectionId, now: Instant) -> Result<()> {
        self.controllers
            .try_reserve(1)
            .map_err(|_| PccError::ControllerAllocationFailed { connection: connection.0 })?;
        self.controllers.insert(connection, Controller::new(self.config.clone(), now));
        debug!(connection = connection.0, "pcc controller lazily allocated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pcc::host::SackBlock;

    fn snapshot(now: Instant) -> HostSnapshot {
        HostSnapshot {
            next_seq_to_send: 0,
            snd_una: 0,
            sack_blocks: [SackBlock::ABSENT; 4],
            data_segs_out: 0,
            advmss: 1460,
            srtt_us: 30_000,
            now,
        }
    }

    #[test]
    fn init_reports_initial_rate_without_allocating_a_controller() {
        let module = PccModule::new(Config::default());
        let update = module.init(ConnectionId::new(1));
        assert_eq!(update.pacing_rate, Config::default().initial_rate);
        assert_eq!(module.connection_count(), 0, "Controller must stay unallocated until a real hook fires");
    }

    #[test]
    fn calling_init_repeatedly_never_allocates_a_controller() {
        let module = PccModule::new(Config::default());
        module.init(ConnectionId::new(1));
        module.init(ConnectionId::new(1));
        assert_eq!(module.connection_count(), 0);
    }

    #[test]
    fn hooks_lazily_create_a_controller_if_init_was_skipped() {
        let mut module = PccModule::new(Config::default());
        let now = Instant::now();
        let ssthresh = module.on_ssthresh_query(ConnectionId::new(7), &snapshot(now));
        assert_eq!(ssthresh, super::super::controller::INFINITE_SSTHRESH);
        assert_eq!(module.connection_count(), 1);
    }

    #[test]
    fn release_removes_the_controller() {
        let mut module = PccModule::new(Config::default());
        let now = Instant::now();
        module.on_ssthresh_query(ConnectionId::new(3), &snapshot(now));
        assert_eq!(module.connection_count(), 1);
        module.release(ConnectionId::new(3));
        assert_eq!(module.connection_count(), 0);
    }

    #[test]
    fn distinct_connections_get_independent_controllers() {
        let mut module = PccModule::new(Config::default());
        let now = Instant::now();
        module.on_ssthresh_query(ConnectionId::new(1), &snapshot(now));
        module.on_ssthresh_query(ConnectionId::new(2), &snapshot(now));
        assert_eq!(module.connection_count(), 2);
    }
}
