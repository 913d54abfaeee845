//! The seven-state rate-selection FSM (`SPEC_FULL.md` §4.2).
//!
//! States are entered and left at two points only: when a monitor interval
//! *opens* (the FSM picks that interval's rate) and when one *closes* (the
//! FSM interprets its utility). Both transitions are table-driven here,
//! matching the two tables in the spec as closely as Rust control flow
//! allows rather than collapsing them into one generic step function.

use super::config::Config;
use super::fixed::Fixed64;
use tracing::debug;

/// FSM state. No terminal state — the engine runs for the connection's
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Exponential ramp from the initial rate.
    Start,
    /// First slot of a decision-making quartet (+epsilon).
    Dm1,
    /// Second slot (-epsilon).
    Dm2,
    /// Third slot (+epsilon).
    Dm3,
    /// Fourth slot (-epsilon).
    Dm4,
    /// Quartet complete; filler intervals run at `next_rate` until the
    /// fourth slot's ACKs land and `MakeDecision` fires.
    WaitForDecision,
    /// Monotone rate walk in `direction`, step size growing with `tries`.
    RateAdjustment,
}

/// What the FSM decided for a newly-opened interval.
#[derive(Debug, Clone, Copy)]
pub struct OpenDecision {
    /// The state the interval was opened under (stamped onto the interval
    /// as `state_at_start`).
    pub state_at_start: State,
    /// Pacing rate chosen for this interval, already clamped to
    /// `[min_rate, u64::MAX]`.
    pub target_rate: u64,
    /// Quartet slot this interval occupies, or `0` if it isn't part of one.
    pub decision_id: u8,
}

/// Everything the FSM needs to know about an interval that just closed.
#[derive(Debug, Clone, Copy)]
pub struct ClosedInterval {
    /// The state the interval was opened under.
    pub state_at_start: State,
    /// Quartet slot this interval occupied, or `0`.
    pub decision_id: u8,
    /// The rate the interval was opened with.
    pub target_rate: u64,
    /// Computed utility (zero if the interval was never eligible).
    pub utility: Fixed64,
    /// Measured delivery rate.
    pub actual_rate: u64,
    /// Whether utility was actually computed for this interval
    /// (`segments_sent > 0`); ineligible intervals never participate in
    /// the Start-exit comparison.
    pub eligible: bool,
}

/// The immediately preceding ring slot's outcome, consulted by the
/// Start/RateAdjustment-exit rule.
#[derive(Debug, Clone, Copy)]
pub struct PreviousInterval {
    /// The previous interval's target (requested) rate.
    pub target_rate: u64,
    /// The previous interval's measured delivery rate.
    pub actual_rate: u64,
    /// The previous interval's utility.
    pub utility: Fixed64,
}

/// A single quartet slot's recorded outcome, used by `MakeDecision`.
#[derive(Debug, Clone, Copy, Default)]
struct QuartetSlot {
    utility: Fixed64,
    target_rate: u64,
}

/// The rate-selection FSM plus its decision-making bookkeeping.
#[derive(Debug, Clone)]
pub struct Fsm {
    state: State,
    next_rate: f64,
    decision_attempts: u32,
    rate_adjustment_tries: u32,
    direction: i8,
    quartet: [Option<QuartetSlot>; 4],
}

impl Fsm {
    /// Construct a fresh FSM in `Start` state seeded with the configured
    /// initial rate.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            state: State::Start,
            // `on_open`'s Start arm doubles `next_rate`; seeding at half the
            // configured initial rate makes the very first interval open at
            // exactly `initial_rate`, matching the doubling sequence tested
            // below (1M, 2M, 4M, ...).
            next_rate: config.initial_rate as f64 / 2.0,
            decision_attempts: 0,
            rate_adjustment_tries: 0,
            direction: 1,
            quartet: [None; 4],
        }
    }

    /// Current FSM state.
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Number of consecutive inconsistent-quartet attempts (`decision_attempts`).
    #[must_use]
    pub const fn decision_attempts(&self) -> u32 {
        self.decision_attempts
    }

    /// Current rate-adjustment step count (`rate_adjustment_tries`).
    #[must_use]
    pub const fn rate_adjustment_tries(&self) -> u32 {
        self.rate_adjustment_tries
    }

    /// Current rate-adjustment direction, `+1` or `-1`.
    #[must_use]
    pub const fn direction(&self) -> i8 {
        self.direction
    }

    /// The seed rate the next interval will open with (pre-table; `on_open`
    /// applies the per-state formula on top of this).
    #[must_use]
    pub fn next_rate(&self) -> f64 {
        self.next_rate
    }

    /// Whether the quartet buffer currently holds no samples (used by
    /// tests asserting `MakeDecision` resets it).
    #[must_use]
    pub fn quartet_is_empty(&self) -> bool {
        self.quartet.iter().all(Option::is_none)
    }

    /// Apply the open-time transition table (§4.2 "On open").
    pub fn on_open(&mut self, config: &Config) -> OpenDecision {
        let state_at_start = self.state;
        let (chosen, new_state, decision_id) = match self.state {
            State::Start => (self.next_rate * 2.0, State::Start, 0u8),
            State::Dm1 => (
                self.next_rate * (1.0 + config.step_epsilon * f64::from(self.decision_attempts)),
                State::Dm2,
                1,
            ),
            State::Dm2 => (
                self.next_rate * (1.0 - config.step_epsilon * f64::from(self.decision_attempts)),
                State::Dm3,
                2,
            ),
            State::Dm3 => (
                self.next_rate * (1.0 + config.step_epsilon * f64::from(self.decision_attempts)),
                State::Dm4,
                3,
            ),
            State::Dm4 => (
                self.next_rate * (1.0 - config.step_epsilon * f64::from(self.decision_attempts)),
                State::WaitForDecision,
                4,
            ),
            State::RateAdjustment => {
                let candidate = self.next_rate
                    * (1.0
                        + config.step_epsilon
                            * f64::from(self.direction)
                            * f64::from(self.rate_adjustment_tries));
                if candidate <= 0.0 {
                    debug!(
                        direction = self.direction,
                        tries = self.rate_adjustment_tries,
                        "rate adjustment sign overflow, snapping back to next_rate"
                    );
                    self.rate_adjustment_tries = 1;
                    (self.next_rate, State::RateAdjustment, 0)
                } else {
                    self.rate_adjustment_tries += 1;
                    (candidate, State::RateAdjustment, 0)
                }
            }
            State::WaitForDecision => (self.next_rate, State::WaitForDecision, 0),
        };

        let target_rate = config.clamp_rate(chosen);
        if matches!(state_at_start, State::Start | State::RateAdjustment) {
            self.next_rate = target_rate as f64;
        }
        self.state = new_state;

        debug!(
            ?state_at_start,
            ?new_state,
            target_rate,
            decision_id,
            "monitor interval opened"
        );

        OpenDecision {
            state_at_start,
            target_rate,
            decision_id,
        }
    }

    /// Apply the close-time transition table (§4.2 "On close").
    pub fn on_close(
        &mut self,
        closed: ClosedInterval,
        previous: Option<PreviousInterval>,
        snd_count: u64,
        config: &Config,
    ) {
        let triggers_exit = matches!(closed.state_at_start, State::Start | State::RateAdjustment)
            && closed.eligible
            && snd_count > config.min_snd_count_for_decisions;

        if triggers_exit {
            if let Some(previous) = previous {
                if closed.utility < previous.utility {
                    self.state = State::Dm1;
                    self.decision_attempts = 1;
                    self.next_rate = if closed.state_at_start == State::Start {
                        previous.actual_rate as f64
                    } else {
                        previous.target_rate as f64
                    };
                    debug!(
                        next_rate = self.next_rate,
                        "utility regressed, entering decision-making"
                    );
                    return;
                }
            }
        }

        if (1..=4).contains(&closed.decision_id) {
            let slot = QuartetSlot {
                utility: closed.utility,
                target_rate: closed.target_rate,
            };
            self.quartet[usize::from(closed.decision_id) - 1] = Some(slot);
        }

        if closed.decision_id == 4 {
            self.make_decision();
        }
    }

    fn make_decision(&mut self) {
        let (Some(q0), Some(q1), Some(q2), Some(q3)) =
            (self.quartet[0], self.quartet[1], self.quartet[2], self.quartet[3])
        else {
            debug!("MakeDecision invoked with an incomplete quartet, treating as inconsistent");
            self.state = State::Dm1;
            self.decision_attempts += 1;
            return;
        };

        if q0.utility > q1.utility && q2.utility > q3.utility {
            self.direction = 1;
            self.next_rate = q0.target_rate as f64;
            self.state = State::RateAdjustment;
            self.rate_adjustment_tries = 1;
            self.quartet = [None; 4];
            self.decision_attempts = 0;
            debug!(next_rate = self.next_rate, "quartet consistent, direction +1");
        } else if q0.utility < q1.utility && q2.utility < q3.utility {
            self.direction = -1;
            self.next_rate = q1.target_rate as f64;
            self.state = State::RateAdjustment;
            self.rate_adjustment_tries = 1;
            self.quartet = [None; 4];
            self.decision_attempts = 0;
            debug!(next_rate = self.next_rate, "quartet consistent, direction -1");
        } else {
            self.state = State::Dm1;
            self.decision_attempts += 1;
            debug!(
                attempts = self.decision_attempts,
                "quartet inconsistent, retrying decision-making"
            );
        }
    }
}
