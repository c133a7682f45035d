// src/protocol/mod.rs

// Pure decode logic for the two frame kinds. No I/O lives here; the
// controller feeds exact-length frames in and dispatches the events out.
pub mod parser;

pub use parser::{parse_firmware_info, SensorDecoder, MAX_EVENTS_PER_FRAME};
