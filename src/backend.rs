//! Input backend contract and axis normalization.
//!
//! A backend wraps one device API behind a small polling capability so the
//! orchestrator never depends on a specific driver. Implementations must be
//! polling-based: no blocking reads inside [`InputBackend::poll`], or the
//! fixed tick rate would drift.
//!
//! "Device not present" is data, not an error: `poll` reports it as a
//! disconnected snapshot with neutral fields and recovers by itself when
//! the device reappears. The only failure that aborts startup is
//! [`InputBackend::init`].

use crate::snapshot::Snapshot;
use crate::Result;

/// Polling capability over one device API.
///
/// Selected once at startup by configuration (see [`crate::backends::create`]);
/// backends are never mixed at runtime.
pub trait InputBackend: Send {
    /// Acquire the device API. Driver unavailable or permission denied here
    /// is fatal for the process; everything later is in-band.
    fn init(&mut self) -> Result<()>;

    /// Sample the current device state without blocking.
    fn poll(&mut self) -> Snapshot;

    /// Release the device API. The poll loop calls this exactly once on exit.
    fn shutdown(&mut self);

    /// Short label for logs.
    fn name(&self) -> &str;
}

/// Normalize a signed 16-bit stick axis into `[-1.0, 1.0]`.
///
/// The raw range is asymmetric, so the halves use separate divisors:
/// -32768 maps to exactly -1.0 and +32767 to exactly +1.0. A single shared
/// divisor would bias one extreme off its endpoint.
#[inline]
pub fn normalize_thumb(v: i16) -> f32 {
    if v >= 0 {
        f32::from(v) / 32767.0
    } else {
        f32::from(v) / 32768.0
    }
}

/// Normalize an 8-bit trigger magnitude into `[0.0, 1.0]`.
#[inline]
pub fn normalize_trigger(v: u8) -> f32 {
    f32::from(v) / 255.0
}
