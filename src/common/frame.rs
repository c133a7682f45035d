// src/common/frame.rs

/// Length in bytes of the firmware identification frame sent after reset.
pub const FIRMWARE_FRAME_LEN: usize = 132;
/// Length in bytes of one sensor data frame.
pub const SENSOR_FRAME_LEN: usize = 26;

/// Fixed I2C address of the MGC3130.
pub const DEVICE_ADDRESS: u8 = 0x42;

/// Offset of the frame type marker (common to both frame kinds).
pub const MSG_TYPE_OFFSET: usize = 3;
/// Type marker of the firmware identification frame.
pub const FLAG_FIRMWARE_INFO: u8 = 0x83;
/// Type marker of a sensor data frame.
pub const FLAG_SENSOR_DATA: u8 = 0x91;

// === Sensor frame layout ===

/// Bitfield naming which payload sections the frame carries.
pub const CONFIG_MASK_OFFSET: usize = 4;
/// 8-bit frame counter at 200 Hz. Reported by the device, unused here.
pub const TIMESTAMP_OFFSET: usize = 6;
/// Bitfield naming which payload sections hold currently valid data.
pub const SYS_INFO_OFFSET: usize = 7;
/// Raw gesture code (0 = none).
pub const GESTURE_OFFSET: usize = 10;
/// Touch action mask, 2 bytes little-endian.
pub const TOUCH_OFFSET: usize = 14;
/// Running 8-bit air-wheel rotation counter.
pub const AIRWHEEL_OFFSET: usize = 18;
/// X position, 2 bytes little-endian.
pub const X_OFFSET: usize = 20;
/// Y position, 2 bytes little-endian.
pub const Y_OFFSET: usize = 22;
/// Z position, 2 bytes little-endian.
pub const Z_OFFSET: usize = 24;

// Config mask bits (payload sections present in the frame).
pub const DATA_GESTURE: u8 = 1 << 1;
pub const DATA_TOUCH: u8 = 1 << 2;
pub const DATA_AIRWHEEL: u8 = 1 << 3;
pub const DATA_XYZ: u8 = 1 << 4;

// System info bits (payload sections currently valid).
pub const SYS_POSITION: u8 = 1;
pub const SYS_AIRWHEEL: u8 = 1 << 1;

// === Firmware identification frame layout ===

/// Firmware validity byte (0x00 = no library, 0x0A = corrupt library).
pub const FW_VALID_OFFSET: usize = 4;
/// Hardware revision, 2 bytes.
pub const FW_HW_REV_OFFSET: usize = 5;
/// Parameter table start address, stored divided by 128.
pub const FW_PARAM_START_OFFSET: usize = 7;
/// Loaded GestIC library version, 2 bytes.
pub const FW_LIB_VERSION_OFFSET: usize = 8;
/// Library loader platform byte.
pub const FW_LOADER_PLATFORM_OFFSET: usize = 10;
/// Firmware start address, stored divided by 128.
pub const FW_START_ADDR_OFFSET: usize = 11;
/// NUL-terminated ASCII firmware version string fills the rest of the frame.
pub const FW_VERSION_STRING_OFFSET: usize = 12;

// === Host -> device command buffers ===
// These two writes are the entire write-side wire protocol. The device's
// command set is fixed; there is nothing to build at runtime.

/// Locks data output to: DSP status, gesture, touch, air-wheel, xyz position.
pub const CMD_OUTPUT_LOCK: [u8; 16] = [
    0x10, 0x00, 0x00, 0xa2, 0xa1, 0x00, 0x00, 0x00, 0x1f, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff,
];

/// Enables auto-calibration triggers (gesture-triggered, negative, idle,
/// out-of-range values, AFA frequency adjustment).
pub const CMD_AUTO_CALIBRATION: [u8; 16] = [
    0x10, 0x00, 0x00, 0xa2, 0x80, 0x00, 0x00, 0x00, 0x3f, 0x00, 0x00, 0x00, 0x3f, 0x00, 0x00, 0x00,
];

/// Outcome of one handshake/read cycle.
///
/// `NoData` (the transfer line never went low) and `Failed` (the bus read
/// itself faulted) are distinct conditions: the first is the normal idle
/// case, the second is worth counting.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FrameRead<const N: usize> {
    /// The device had nothing to report within the handshake window.
    NoData,
    /// The bus read faulted after the handshake; the frame was lost.
    Failed,
    /// A complete frame of exactly `N` bytes.
    Frame([u8; N]),
}

impl<const N: usize> FrameRead<N> {
    /// Returns the frame bytes, if a frame was read.
    pub fn frame(&self) -> Option<&[u8; N]> {
        match self {
            FrameRead::Frame(frame) => Some(frame),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_markers_are_distinct() {
        assert_ne!(FLAG_FIRMWARE_INFO, FLAG_SENSOR_DATA);
        assert!(MSG_TYPE_OFFSET < SENSOR_FRAME_LEN);
        assert!(FW_VERSION_STRING_OFFSET < FIRMWARE_FRAME_LEN);
    }

    #[test]
    fn test_command_buffers_target_runtime_parameters() {
        // Both commands are 0xA2 (set runtime parameter) messages of length 0x10.
        assert_eq!(CMD_OUTPUT_LOCK[0], 0x10);
        assert_eq!(CMD_OUTPUT_LOCK[3], 0xa2);
        assert_eq!(CMD_AUTO_CALIBRATION[0], 0x10);
        assert_eq!(CMD_AUTO_CALIBRATION[3], 0xa2);
    }

    #[test]
    fn test_frame_read_accessor() {
        let read: FrameRead<4> = FrameRead::Frame([1, 2, 3, 4]);
        assert_eq!(read.frame(), Some(&[1, 2, 3, 4]));
        assert_eq!(FrameRead::<4>::NoData.frame(), None);
        assert_eq!(FrameRead::<4>::Failed.frame(), None);
    }
}
