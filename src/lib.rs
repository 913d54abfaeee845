//! pcc-pacer - Performance-oriented Congestion Control pacing engine for a
//! sender-side transport.
//!
//! This library implements the PCC decision-making loop described in its
//! design docs: a fixed-capacity ring of monitor intervals, a seven-state
//! rate-selection FSM that runs online randomized experiments over short
//! windows, SACK-based loss accounting, and the fixed-point utility math
//! that interprets each experiment's outcome.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pcc_pacer::{Config, ConnectionId, HostSnapshot, PccModule, SackBlock};
//! use std::time::Instant;
//!
//! let mut module = PccModule::new(Config::default());
//! let now = Instant::now();
//! let connection = ConnectionId::new(1);
//! let _initial_update = module.init(connection);
//!
//! let snapshot = HostSnapshot {
//!     next_seq_to_send: 0,
//!     snd_una: 0,
//!     sack_blocks: [SackBlock::ABSENT; 4],
//!     data_segs_out: 0,
//!     advmss: 1460,
//!     srtt_us: 30_000,
//!     now,
//! };
//! let _ssthresh = module.on_ssthresh_query(connection, &snapshot);
//! ```
//!
//! # Features
//!
//! - **Wrap-aware sequence arithmetic** - `tcp_seq_*`-style comparisons over
//!   32-bit sequence numbers
//! - **Fixed-point utility math** - deterministic `Fixed64` (Q32.32) scoring
//! - **No dynamic dispatch** - the host boundary is two plain data records,
//!   `HostSnapshot` and `HostUpdate`, not a trait object

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod pcc;

pub use pcc::{
    AckSample, Config, Controller, ConnectionId, Fixed64, HostSnapshot, HostUpdate,
    INFINITE_SSTHRESH, LARGE_CWND, MODULE_NAME, MonitorInterval, MonitorRing, PccError, PccModule,
    QUARTET_LEN, RING_CAPACITY, Result, SackBlock, State,
};
