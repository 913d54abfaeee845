//! Fixed-point utility computation (`SPEC_FULL.md` §4.4).
//!
//! `utility = (sent_bytes - bytes_lost)/time_s * sigmoid_penalty(p) - bytes_lost/time_s`
//! where `p` is the fractional loss rate and `sigmoid_penalty` lightly
//! penalises utility below 5% loss and heavily above it.

use super::config::Config;
use super::fixed::Fixed64;
use super::interval::MonitorInterval;
use tracing::warn;

/// Outcome of computing utility for one interval.
#[derive(Debug, Clone, Copy)]
pub struct UtilityResult {
    /// The computed signed utility.
    pub utility: Fixed64,
    /// Measured delivery rate, bytes/second.
    pub actual_rate: u64,
    /// Whether this interval had any data to judge
    /// (`segments_sent > 0`); `false` means `utility` is the inert zero
    /// value named in the spec's boundary behavior, not a real score.
    pub eligible: bool,
}

/// `1 - 1 / (1 + exp(-steepness * (p - center)))`.
fn sigmoid_penalty(p: Fixed64, center: f64, steepness: f64) -> Fixed64 {
    let exponent = Fixed64::from_f64(-steepness) * (p - Fixed64::from_f64(center));
    let denom = Fixed64::ONE + exponent.exp();
    Fixed64::ONE - Fixed64::ONE.saturating_div(denom)
}

/// Compute utility and measured rate for a closed interval.
///
/// `mss` is the transport's advertised maximum segment size, bytes.
#[must_use]
pub fn compute(interval: &MonitorInterval, mss: u32, config: &Config) -> UtilityResult {
    if interval.segments_sent == 0 {
        return UtilityResult {
            utility: Fixed64::ZERO,
            actual_rate: 0,
            eligible: false,
        };
    }

    if interval.end_time_us == 0 {
        warn!("monitor interval closed with end_time_us == 0");
    }

    let sent_bytes = u64::from(interval.segments_sent) * u64::from(mss);
    let length_us = interval.end_time_us + 1;

    if interval.bytes_lost > sent_bytes {
        warn!(
            bytes_lost = interval.bytes_lost,
            sent_bytes, "bytes_lost exceeds sent_bytes, clamping"
        );
    }
    let bytes_lost = interval.bytes_lost.min(sent_bytes);

    let sent_fp = Fixed64::from_int(sent_bytes as i64);
    let lost_fp = Fixed64::from_int(bytes_lost as i64);
    let length_us_fp = Fixed64::from_int(length_us as i64);
    let micros_per_sec = Fixed64::from_int(1_000_000);

    let actual_rate_fp = sent_fp * micros_per_sec / length_us_fp;
    let actual_rate = actual_rate_fp.to_f64().max(0.0) as u64;

    if actual_rate > interval.target_rate {
        warn!(
            actual_rate,
            target_rate = interval.target_rate,
            "measured rate exceeds target rate (pacer overshoot)"
        );
    }

    let time_s = length_us_fp / micros_per_sec;
    let loss_ratio = lost_fp.saturating_div(sent_fp);

    let penalty = sigmoid_penalty(loss_ratio, config.loss_gate_center, config.loss_gate_steepness);
    let delivered = sent_fp - lost_fp;
    let utility = (delivered / time_s) * penalty - (lost_fp / time_s);

    UtilityResult {
        utility,
        actual_rate,
        eligible: true,
    }
}
