// src/common/types.rs

// --- Gestures ---

/// Closed set of gestures the MGC3130 firmware reports.
///
/// `Garbage` doubles as the fallback for any raw code outside the table.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum GestureType {
    Garbage = 0,
    FlickWestToEast,
    FlickEastToWest,
    FlickSouthToNorth,
    FlickNorthToSouth,
    CircleClockwise,
    CircleCounterclockwise,
}

impl GestureType {
    /// All gestures, in raw-code order (raw code = table index + 1).
    pub const ALL: [GestureType; 7] = [
        GestureType::Garbage,
        GestureType::FlickWestToEast,
        GestureType::FlickEastToWest,
        GestureType::FlickSouthToNorth,
        GestureType::FlickNorthToSouth,
        GestureType::CircleClockwise,
        GestureType::CircleCounterclockwise,
    ];

    /// Maps a raw gesture code to its gesture.
    ///
    /// The firmware numbers gestures from 1; any code outside the table
    /// (including 0) degrades to [`GestureType::Garbage`] rather than
    /// failing, matching the best-effort nature of the stream.
    pub fn from_raw(raw: u8) -> Self {
        usize::from(raw)
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index))
            .copied()
            .unwrap_or(GestureType::Garbage)
    }
}

// --- Touch / tap zones ---

/// Touch, tap and double-tap events for the five electrode zones.
///
/// Variant order matters: it is the order of bits 14 down to 0 in the
/// 15-bit touch action mask, and the order in which simultaneous touch
/// events are emitted from a single frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TouchType {
    DoubleTapCenter,
    DoubleTapEast,
    DoubleTapNorth,
    DoubleTapWest,
    DoubleTapSouth,
    TapCenter,
    TapEast,
    TapNorth,
    TapWest,
    TapSouth,
    TouchCenter,
    TouchEast,
    TouchNorth,
    TouchWest,
    TouchSouth,
}

impl TouchType {
    /// All touch actions, from bit 14 down to bit 0 of the action mask.
    pub const ALL: [TouchType; 15] = [
        TouchType::DoubleTapCenter,
        TouchType::DoubleTapEast,
        TouchType::DoubleTapNorth,
        TouchType::DoubleTapWest,
        TouchType::DoubleTapSouth,
        TouchType::TapCenter,
        TouchType::TapEast,
        TouchType::TapNorth,
        TouchType::TapWest,
        TouchType::TapSouth,
        TouchType::TouchCenter,
        TouchType::TouchEast,
        TouchType::TouchNorth,
        TouchType::TouchWest,
        TouchType::TouchSouth,
    ];
}

// --- Position ---

/// A 3-axis position sample.
///
/// Each axis is reconstructed from a little-endian 16-bit field and widened,
/// so values sit in `0..=65535`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MoveEvent {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

// --- Event stream ---

/// One decoded sensor event.
///
/// A single frame can yield several events; they are produced in the fixed
/// decode order position, touch, gesture, air-wheel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Event {
    Move(MoveEvent),
    Touch(TouchType),
    Gesture(GestureType),
    /// Air-wheel rotation delta in degrees.
    AirWheel(f64),
}

// --- Firmware identification ---

/// Contents of the firmware identification frame the device sends once
/// after reset. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareInfo {
    /// Raw validity byte (already checked to be a usable value).
    pub valid: u8,
    /// Hardware revision bytes.
    pub hardware_rev: [u8; 2],
    /// Parameter table start address (stored byte x 128).
    pub param_start_addr: u32,
    /// Loaded GestIC library version bytes.
    pub lib_loaded_version: [u8; 2],
    /// Library loader platform identifier.
    pub loader_platform: u8,
    /// Firmware start address (stored byte x 128).
    pub fw_start_addr: u32,
    /// Firmware version string, truncated at the first NUL.
    pub version: String,
    /// Whether the firmware frame was received (always true for parsed info).
    pub received: bool,
}
