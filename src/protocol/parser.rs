// src/protocol/parser.rs

use arrayvec::ArrayVec;

use crate::common::{
    error::FirmwareError,
    frame::{
        AIRWHEEL_OFFSET, CONFIG_MASK_OFFSET, DATA_AIRWHEEL, DATA_GESTURE, DATA_TOUCH, DATA_XYZ,
        FIRMWARE_FRAME_LEN, FW_HW_REV_OFFSET, FW_LIB_VERSION_OFFSET, FW_LOADER_PLATFORM_OFFSET,
        FW_PARAM_START_OFFSET, FW_START_ADDR_OFFSET, FW_VALID_OFFSET, FW_VERSION_STRING_OFFSET,
        GESTURE_OFFSET, SENSOR_FRAME_LEN, SYS_AIRWHEEL, SYS_INFO_OFFSET, SYS_POSITION,
        TOUCH_OFFSET, X_OFFSET, Y_OFFSET, Z_OFFSET,
    },
    timing::{AIRWHEEL_COUNTS_PER_REV, AIRWHEEL_DELTA_LIMIT, DEGREES_PER_REVOLUTION},
    types::{Event, FirmwareInfo, GestureType, MoveEvent, TouchType},
};

/// Upper bound on events a single sensor frame can produce:
/// 1 position + 15 touch actions + 1 gesture + 1 air-wheel.
pub const MAX_EVENTS_PER_FRAME: usize = 18;

/// Parses the 132-byte firmware identification frame.
///
/// Fails when the validity byte reports an unusable GestIC library. The
/// version string is the ASCII region from offset 12, truncated at the
/// first NUL; bytes after the terminator are garbage and discarded.
///
/// The caller is responsible for having checked the frame type marker.
pub fn parse_firmware_info(
    frame: &[u8; FIRMWARE_FRAME_LEN],
) -> Result<FirmwareInfo, FirmwareError> {
    let valid = frame[FW_VALID_OFFSET];
    match valid {
        0x00 => return Err(FirmwareError::NoLibrary),
        0x0A => return Err(FirmwareError::CorruptLibrary),
        _ => {}
    }

    let version_region = &frame[FW_VERSION_STRING_OFFSET..];
    let version_bytes = version_region
        .iter()
        .position(|&byte| byte == 0)
        .map_or(version_region, |nul| &version_region[..nul]);
    let version = String::from_utf8_lossy(version_bytes).into_owned();

    Ok(FirmwareInfo {
        valid,
        hardware_rev: [frame[FW_HW_REV_OFFSET], frame[FW_HW_REV_OFFSET + 1]],
        param_start_addr: u32::from(frame[FW_PARAM_START_OFFSET]) * 128,
        lib_loaded_version: [
            frame[FW_LIB_VERSION_OFFSET],
            frame[FW_LIB_VERSION_OFFSET + 1],
        ],
        loader_platform: frame[FW_LOADER_PLATFORM_OFFSET],
        fw_start_addr: u32::from(frame[FW_START_ADDR_OFFSET]) * 128,
        version,
        received: true,
    })
}

/// Stateful decoder for 26-byte sensor data frames.
///
/// The only state is the running air-wheel counter. It has a single writer:
/// whichever loop feeds frames into [`decode`](Self::decode). The decoder is
/// otherwise pure; it performs no I/O and never fails.
#[derive(Debug, Clone)]
pub struct SensorDecoder {
    /// Air-wheel counter value seen in the previous frame.
    last_rotation: u8,
    /// Per-frame rotation delta magnitude (in revolutions) at or beyond
    /// which a sample is treated as counter wraparound and dropped.
    airwheel_delta_limit: f64,
}

impl Default for SensorDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorDecoder {
    /// Creates a decoder with the default wraparound bound
    /// ([`timing::AIRWHEEL_DELTA_LIMIT`](crate::common::timing::AIRWHEEL_DELTA_LIMIT)).
    pub fn new() -> Self {
        SensorDecoder {
            last_rotation: 0,
            airwheel_delta_limit: AIRWHEEL_DELTA_LIMIT,
        }
    }

    /// Creates a decoder with a custom wraparound bound, for hosts polling
    /// at a different cadence than the stock 5 ms loop.
    pub fn with_delta_limit(airwheel_delta_limit: f64) -> Self {
        SensorDecoder {
            last_rotation: 0,
            airwheel_delta_limit,
        }
    }

    /// Air-wheel counter value from the most recently decoded frame.
    pub fn last_rotation(&self) -> u8 {
        self.last_rotation
    }

    /// Decodes one sensor frame into zero or more events.
    ///
    /// Four independent checks run in fixed order (position, touch, gesture,
    /// air-wheel); each contributes zero or more events. Which checks fire
    /// is governed by the frame's config mask and sys-info bitfields.
    pub fn decode(&mut self, frame: &[u8; SENSOR_FRAME_LEN]) -> ArrayVec<Event, MAX_EVENTS_PER_FRAME> {
        let mut events = ArrayVec::new();
        let config_mask = frame[CONFIG_MASK_OFFSET];
        let sys_info = frame[SYS_INFO_OFFSET];

        // Position: present in the frame and flagged valid.
        if config_mask & DATA_XYZ != 0 && sys_info & SYS_POSITION != 0 {
            let x = u16::from_le_bytes([frame[X_OFFSET], frame[X_OFFSET + 1]]);
            let y = u16::from_le_bytes([frame[Y_OFFSET], frame[Y_OFFSET + 1]]);
            let z = u16::from_le_bytes([frame[Z_OFFSET], frame[Z_OFFSET + 1]]);
            events.push(Event::Move(MoveEvent {
                x: i32::from(x),
                y: i32::from(y),
                z: i32::from(z),
            }));
        }

        // Touch: every set bit in the action mask emits one event, walking
        // bit 14 down to bit 0 in TouchType table order.
        if config_mask & DATA_TOUCH != 0 {
            let action = u16::from_le_bytes([frame[TOUCH_OFFSET], frame[TOUCH_OFFSET + 1]]);
            let mut probe = 1u16 << 14;
            for touch in TouchType::ALL {
                if action & probe != 0 {
                    events.push(Event::Touch(touch));
                }
                probe >>= 1;
            }
        }

        // Gesture: raw code 0 means none.
        if config_mask & DATA_GESTURE != 0 && frame[GESTURE_OFFSET] != 0 {
            events.push(Event::Gesture(GestureType::from_raw(frame[GESTURE_OFFSET])));
        }

        // Air-wheel: delta of the running 8-bit counter, scaled to
        // revolutions. Deltas at or beyond the wraparound bound are dropped.
        if config_mask & DATA_AIRWHEEL != 0 && sys_info & SYS_AIRWHEEL != 0 {
            let counter = frame[AIRWHEEL_OFFSET];
            let delta =
                (f64::from(counter) - f64::from(self.last_rotation)) / AIRWHEEL_COUNTS_PER_REV;
            if delta != 0.0
                && delta > -self.airwheel_delta_limit
                && delta < self.airwheel_delta_limit
            {
                events.push(Event::AirWheel(delta * DEGREES_PER_REVOLUTION));
            }
            // The counter tracks the device even when the delta is rejected.
            self.last_rotation = counter;
        }

        events
    }
}
