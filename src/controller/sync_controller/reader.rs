// src/controller/sync_controller/reader.rs

use log::debug;

use crate::common::{
    error::Sense3dError,
    frame::FrameRead,
    hal_traits::{Sense3dIo, Sense3dTimer},
    timing,
};

/// Performs one handshake/read cycle for a frame of exactly `N` bytes.
///
/// Protocol:
/// 1. Poll the transfer line for up to [`timing::HANDSHAKE_WINDOW`],
///    sleeping [`timing::HANDSHAKE_POLL_INTERVAL`] between polls, waiting
///    for the device to pull it low (data ready).
/// 2. Still high at the deadline: `NoData`. The idle case, not an error.
/// 3. Low: immediately drive the line as an output held low. This freezes
///    the device's internal buffers so the read cannot be torn.
/// 4. Read exactly `N` bytes from the bus. A bus fault becomes `Failed`
///    rather than an error, preserving keep-polling behavior.
/// 5. The line is returned to input mode on every exit path once asserted.
///    Failing to release it wedges the device, so a release fault is the
///    one hard error this function produces from the read phase.
pub(crate) fn read_frame<IF, const N: usize>(
    interface: &mut IF,
) -> Result<FrameRead<N>, Sense3dError<IF::Error>>
where
    IF: Sense3dIo + Sense3dTimer,
{
    let deadline = interface.now() + timing::HANDSHAKE_WINDOW;
    loop {
        if !interface.transfer_is_high().map_err(Sense3dError::Io)? {
            break;
        }
        if interface.now() >= deadline {
            return Ok(FrameRead::NoData);
        }
        interface.delay(timing::HANDSHAKE_POLL_INTERVAL);
    }

    // Hold the transfer line low so the device does not update its data
    // buffers while the host reads.
    interface.transfer_assert_low().map_err(Sense3dError::Io)?;

    let mut frame = [0u8; N];
    let read = interface.read_exact(&mut frame);
    let released = interface.transfer_release();

    released.map_err(Sense3dError::Io)?;
    match read {
        Ok(()) => Ok(FrameRead::Frame(frame)),
        Err(err) => {
            debug!("bus read of {} bytes failed: {:?}", N, err);
            Ok(FrameRead::Failed)
        }
    }
}
