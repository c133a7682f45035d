// src/common/timing.rs

use std::time::Duration;

// Delays follow the MGC3130 datasheet startup figures plus the margins the
// reference firmware tooling uses in practice. The handshake window is the
// only timing that is latency-critical: the transfer line must be asserted
// for as short a span as possible.

// === Reset / initialization ===

/// Duration of each half of the power-on reset pulse (low, then high).
pub const RESET_PULSE: Duration = Duration::from_millis(40);
/// Settle time after the firmware frame before runtime parameters may be set.
pub const FIRMWARE_SETTLE: Duration = Duration::from_millis(200);
/// Gap between the two runtime parameter writes.
pub const INTER_COMMAND_GAP: Duration = Duration::from_millis(100);

// === Polling ===

/// How long to wait for the transfer line to signal data ready.
pub const HANDSHAKE_WINDOW: Duration = Duration::from_millis(5);
/// Sleep between transfer line polls inside the handshake window.
pub const HANDSHAKE_POLL_INTERVAL: Duration = Duration::from_millis(1);
/// Sleep between poll loop iterations.
pub const POLL_INTERVAL: Duration = Duration::from_millis(5);

// === Air-wheel scaling ===

/// Counter ticks per full hand revolution.
pub const AIRWHEEL_COUNTS_PER_REV: f64 = 32.0;
/// Degrees per full revolution, for the reported rotation value.
pub const DEGREES_PER_REVOLUTION: f64 = 360.0;
/// Default rejection bound for per-frame rotation deltas, in revolutions.
///
/// An 8-bit counter wrapping between two samples shows up as a near-±8
/// revolution jump; anything at or beyond this bound is treated as
/// wraparound and dropped. The right bound depends on polling cadence, so
/// [`SensorDecoder`](crate::protocol::SensorDecoder) lets callers override it.
pub const AIRWHEEL_DELTA_LIMIT: f64 = 0.5;
