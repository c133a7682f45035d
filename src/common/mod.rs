// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod timing;
pub mod types;

// --- Re-export key types/traits for easier access ---

// From error.rs
pub use error::{FirmwareError, Sense3dError};

// From frame.rs
pub use frame::{FrameRead, FIRMWARE_FRAME_LEN, SENSOR_FRAME_LEN};

// From hal_traits.rs
pub use hal_traits::{Sense3dInstant, Sense3dIo, Sense3dTimer, StdTimer};

// From types.rs
pub use types::{Event, FirmwareInfo, GestureType, MoveEvent, TouchType};

// From timing.rs (constants - users access via common::timing::*)
