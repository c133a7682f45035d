// src/lib.rs

//! Driver for the Microchip MGC3130 (GestIC) 3D gesture and position
//! sensor, reached over I2C plus a transfer-status handshake line and a
//! reset line.
//!
//! The hardware is abstracted behind [`Sense3dIo`] and [`Sense3dTimer`];
//! implement both for your platform's bus/GPIO types, hand the interface to
//! [`Sense3dController`], and register listeners for the event kinds you
//! care about:
//!
//! ```no_run
//! # use sense3d::{Sense3dController, Sense3dIo, Sense3dTimer, StdTimer};
//! # use std::time::Duration;
//! # struct MyBoard;
//! # impl Sense3dIo for MyBoard {
//! #     type Error = std::io::Error;
//! #     fn write(&mut self, _: &[u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn read_exact(&mut self, _: &mut [u8]) -> Result<(), Self::Error> { Ok(()) }
//! #     fn transfer_is_high(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! #     fn transfer_assert_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn transfer_release(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn reset_high(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! #     fn reset_low(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Sense3dTimer for MyBoard {
//! #     type Instant = std::time::Instant;
//! #     fn now(&self) -> Self::Instant { std::time::Instant::now() }
//! #     fn delay(&mut self, d: Duration) { StdTimer.delay(d) }
//! # }
//! let mut controller = Sense3dController::new(MyBoard);
//! let firmware = controller.init()?;
//! println!("firmware {}", firmware.version);
//!
//! controller.set_on_gesture(|gesture| println!("gesture: {gesture:?}"));
//! controller.set_on_airwheel(|degrees| println!("air-wheel: {degrees:.1}"));
//!
//! controller.start()?;
//! std::thread::sleep(Duration::from_secs(20));
//! controller.stop();
//! controller.close();
//! # Ok::<(), sense3d::Sense3dError<std::io::Error>>(())
//! ```

pub mod common;
pub mod controller;
pub mod protocol;

// Re-export key types for convenience
pub use common::error::{FirmwareError, Sense3dError};
pub use common::frame::FrameRead;
pub use common::hal_traits::{Sense3dInstant, Sense3dIo, Sense3dTimer, StdTimer};
pub use common::types::{Event, FirmwareInfo, GestureType, MoveEvent, TouchType};
pub use controller::{LifecycleState, Sense3dController};
pub use protocol::{parse_firmware_info, SensorDecoder};
