// src/common/hal_traits.rs

use std::fmt::Debug;
use std::ops::{Add, Sub};
use std::time::Duration;

/// Hardware access required by the driver: the I2C bus plus the two control
/// lines (transfer-status and reset) that always ship together with it.
///
/// All operations are blocking. The transfer line is bidirectional: the
/// device drives it low to signal data ready, and the host drives it low
/// while reading to keep the device from updating its buffers mid-read.
/// Implementations start with the line configured as an input with pull-up.
pub trait Sense3dIo {
    /// Associated error type for bus and pin faults.
    type Error: Debug;

    /// Writes a byte buffer to the device.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Reads exactly `buf.len()` bytes from the device.
    ///
    /// A short read is an error; the driver never consumes partial frames.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Samples the transfer-status line. High means no data pending.
    fn transfer_is_high(&mut self) -> Result<bool, Self::Error>;

    /// Reconfigures the transfer line as an output driven low.
    fn transfer_assert_low(&mut self) -> Result<(), Self::Error>;

    /// Returns the transfer line to input mode, releasing it to the device.
    fn transfer_release(&mut self) -> Result<(), Self::Error>;

    /// Drives the reset line high (device running).
    fn reset_high(&mut self) -> Result<(), Self::Error>;

    /// Drives the reset line low (device held in reset).
    fn reset_low(&mut self) -> Result<(), Self::Error>;
}

/// Minimal requirements on a timer's instant type: copyable, advanceable by
/// a `Duration`, subtractable, and comparable.
pub trait Sense3dInstant:
    Copy + Add<Duration, Output = Self> + Sub<Self, Output = Duration> + PartialOrd
{
}

impl<T> Sense3dInstant for T where
    T: Copy + Add<Duration, Output = T> + Sub<T, Output = Duration> + PartialOrd
{
}

/// Abstraction over time, so the handshake window and protocol delays can
/// be driven by a virtual clock in tests.
pub trait Sense3dTimer {
    /// Monotonic instant type used for deadline arithmetic.
    type Instant: Sense3dInstant;

    /// Returns the current instant.
    fn now(&self) -> Self::Instant;

    /// Blocks for at least `duration`.
    fn delay(&mut self, duration: Duration);
}

/// [`Sense3dTimer`] backed by the host clock.
///
/// HAL implementations on a hosted target can embed this and delegate
/// `now`/`delay` to it.
#[derive(Debug, Default, Copy, Clone)]
pub struct StdTimer;

impl Sense3dTimer for StdTimer {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
