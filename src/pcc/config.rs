//! Tunable constants for the PCC engine, following the host crate's
//! `CongestionConfig`/`LossConfig` convention of a plain struct with a
//! `Default` impl rather than a CLI or on-disk format (which stays out of
//! scope per `SPEC_FULL.md` §1).

/// Capacity of the monitor-interval ring (`N` in `SPEC_FULL.md` §3).
pub const RING_CAPACITY: usize = 30;

/// Number of monitor intervals in one decision-making quartet.
pub const QUARTET_LEN: usize = 4;

/// Configuration for a [`super::controller::Controller`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Minimum pacing rate, bytes/second. Rates are always clamped to at
    /// least this value.
    pub min_rate: u64,
    /// Initial pacing rate published before the first monitor interval
    /// opens, bytes/second.
    pub initial_rate: u64,
    /// Per-step rate change applied during decision-making and
    /// rate-adjustment, expressed as a fraction (`0.01` = 1%).
    pub step_epsilon: f64,
    /// Minimum segments that must be sent in an interval before its
    /// duration is allowed to elapse (the under-sampling guard of §4.5).
    pub min_segments_per_interval: u32,
    /// Amount an under-sampled interval's `end_time_us` is extended by,
    /// repeatedly, until it exceeds elapsed time.
    pub undersample_extension_us: u64,
    /// Monitor interval duration as a multiple of sRTT (`4/3` in the spec).
    pub interval_rtt_multiplier: f64,
    /// Center of the loss-rate sigmoid gate (`0.05` = 5% loss).
    pub loss_gate_center: f64,
    /// Steepness of the loss-rate sigmoid gate (`100.0` in the spec).
    pub loss_gate_steepness: f64,
    /// `snd_count` threshold beyond which a downward utility swing is
    /// allowed to trigger decision-making (`snd_count > 3` in the spec).
    pub min_snd_count_for_decisions: u64,
    /// Whether to clamp `snd_wnd` via [`crate::pcc::host::HostUpdate`]
    /// (Open Question in §9: ambiguous in the source, later revision sets
    /// it). Disabled by default; the later-revision value is
    /// [`Self::snd_wnd_clamp`].
    pub clamp_snd_wnd: bool,
    /// The `snd_wnd` value applied when [`Self::clamp_snd_wnd`] is set
    /// (~16 MiB, matching the later revision named in §6).
    pub snd_wnd_clamp: u32,
    /// Whether to pseudo-randomly shuffle the four decision directions
    /// instead of using the fixed `(+,-,+,-)` pattern. The spec's design
    /// notes (§9) say the shuffle helper exists but is unused upstream and
    /// that implementers should not guess the intent; this flag makes the
    /// choice explicit and defaults to the documented fixed pattern.
    pub shuffle_decision_directions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_rate: 800_000,
            initial_rate: 1_000_000,
            step_epsilon: 0.01,
            min_segments_per_interval: 20,
            undersample_extension_us: 50,
            interval_rtt_multiplier: 4.0 / 3.0,
            loss_gate_center: 0.05,
            loss_gate_steepness: 100.0,
            min_snd_count_for_decisions: 3,
            clamp_snd_wnd: false,
            snd_wnd_clamp: 16 * 1024 * 1024,
            shuffle_decision_directions: false,
        }
    }
}

impl Config {
    /// Clamp a candidate rate to `[min_rate, u64::MAX]`.
    #[must_use]
    pub fn clamp_rate(&self, rate: f64) -> u64 {
        if rate.is_nan() || rate < self.min_rate as f64 {
            self.min_rate
        } else if rate >= u64::MAX as f64 {
            u64::MAX
        } else {
            rate as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_constants() {
        let config = Config::default();
        assert_eq!(config.min_rate, 800_000);
        assert_eq!(config.initial_rate, 1_000_000);
    }

    #[test]
    fn clamp_rate_enforces_floor() {
        let config = Config::default();
        assert_eq!(config.clamp_rate(100.0), config.min_rate);
        assert_eq!(config.clamp_rate(2_000_000.0), 2_000_000);
    }

    #[test]
    fn clamp_rate_rejects_nan() {
        let config = Config::default();
        assert_eq!(config.clamp_rate(f64::NAN), config.min_rate);
    }
}
