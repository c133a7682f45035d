// src/common/error.rs

use std::fmt::Debug;

/// Driver-level errors, generic over the HAL implementation's error type.
#[derive(Debug, thiserror::Error)]
pub enum Sense3dError<E>
where
    E: Debug,
{
    /// Underlying bus or pin error from the HAL implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// The device never signaled data ready while a frame was required.
    #[error("no frame available from the sensor")]
    NoFrame,

    /// The bus read faulted while a frame was required.
    #[error("bus read failed while fetching a required frame")]
    ReadFailed,

    /// The frame read during initialization was not a firmware info frame.
    #[error("unexpected frame type {found:#04x}, expected firmware info")]
    UnexpectedFrame { found: u8 },

    /// The firmware identification frame reported an unusable library.
    #[error(transparent)]
    Firmware(#[from] FirmwareError),

    /// `start()` was called while the polling loop is already running.
    #[error("controller is already polling")]
    AlreadyRunning,

    /// The controller has been closed and released its bus handle.
    #[error("controller has been closed")]
    Closed,
}

/// Failures reported by the firmware validity byte.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FirmwareError {
    /// Validity byte 0x00: no valid GestIC library could be located.
    #[error("no valid GestIC library is present on the device")]
    NoLibrary,

    /// Validity byte 0x0A: the stored library is invalid or an update
    /// was interrupted.
    #[error("the stored GestIC library is invalid or the last update failed")]
    CorruptLibrary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firmware_error_wraps_transparently() {
        let err: Sense3dError<()> = FirmwareError::NoLibrary.into();
        assert!(matches!(err, Sense3dError::Firmware(FirmwareError::NoLibrary)));
        assert_eq!(
            err.to_string(),
            "no valid GestIC library is present on the device"
        );
    }

    #[test]
    fn test_io_error_displays_inner_debug() {
        let err: Sense3dError<&str> = Sense3dError::Io("EREMOTEIO");
        assert_eq!(err.to_string(), "I/O error: \"EREMOTEIO\"");
    }
}
