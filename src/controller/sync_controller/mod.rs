// src/controller/sync_controller/mod.rs

mod listeners;
pub(crate) mod reader;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use log::{debug, info, warn};

use crate::common::{
    error::Sense3dError,
    frame::{
        FrameRead, CMD_AUTO_CALIBRATION, CMD_OUTPUT_LOCK, FIRMWARE_FRAME_LEN, FLAG_FIRMWARE_INFO,
        FLAG_SENSOR_DATA, MSG_TYPE_OFFSET, SENSOR_FRAME_LEN,
    },
    hal_traits::{Sense3dIo, Sense3dTimer},
    timing,
    types::{FirmwareInfo, GestureType, MoveEvent, TouchType},
};
use crate::protocol::{parse_firmware_info, SensorDecoder};

use listeners::{lock_slot, Listeners};
use reader::read_frame;

/// Where the controller is in its `init -> start -> stop -> close` life.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LifecycleState {
    /// Constructed; the device has not been reset and configured.
    Uninitialized,
    /// Initialized; ready to start polling.
    Ready,
    /// The background poll thread is running.
    Polling,
    /// Polling has been stopped; `start()` may be called again.
    Stopped,
    /// The bus handle has been released; the controller is inert.
    Closed,
}

/// Hardware plus decode state, held under one lock and shared with the
/// poll thread. Dropping it releases the bus handle.
struct Io<IF> {
    interface: IF,
    decoder: SensorDecoder,
}

/// State shared between the owning thread and the poll thread.
struct Shared<IF> {
    io: Mutex<Option<Io<IF>>>,
    running: AtomicBool,
    listeners: Listeners,
    // Transient read conditions are absorbed by the poll loop; these
    // counters are the observable record of how often that happens.
    read_errors: AtomicU64,
    unexpected_frames: AtomicU64,
}

/// Synchronous controller for the MGC3130 gesture sensor.
///
/// Owns initialization sequencing, the background polling loop, and the
/// event listener registry. Generic over a [`Sense3dIo`] + [`Sense3dTimer`]
/// interface, so any host with an I2C bus and two GPIO lines can drive it.
///
/// Lifecycle: [`init`](Self::init) resets and configures the device,
/// [`start`](Self::start)/[`stop`](Self::stop) bracket the poll thread, and
/// [`close`](Self::close) releases the bus. Listener registration is safe
/// from any thread, including while polling.
pub struct Sense3dController<IF> {
    shared: Arc<Shared<IF>>,
    poll_handle: Option<JoinHandle<()>>,
    state: LifecycleState,
}

impl<IF> Sense3dController<IF>
where
    IF: Sense3dIo + Sense3dTimer + Send + 'static,
{
    /// Wraps a HAL interface in a controller with default decode settings.
    pub fn new(interface: IF) -> Self {
        Self::with_decoder(interface, SensorDecoder::new())
    }

    /// Wraps a HAL interface with a caller-configured decoder (e.g. a
    /// custom air-wheel wraparound bound for a non-standard poll cadence).
    pub fn with_decoder(interface: IF, decoder: SensorDecoder) -> Self {
        Sense3dController {
            shared: Arc::new(Shared {
                io: Mutex::new(Some(Io { interface, decoder })),
                running: AtomicBool::new(false),
                listeners: Listeners::default(),
                read_errors: AtomicU64::new(0),
                unexpected_frames: AtomicU64::new(0),
            }),
            poll_handle: None,
            state: LifecycleState::Uninitialized,
        }
    }

    // --- Initialization ---

    /// Resets and configures the chipset, returning its firmware info.
    ///
    /// Drives the power-on reset pulse, reads the firmware identification
    /// frame the device emits afterwards, then locks data output to the
    /// five reported categories and enables auto-calibration. Any missing,
    /// mistyped or invalid firmware frame is fatal.
    pub fn init(&mut self) -> Result<FirmwareInfo, Sense3dError<IF::Error>> {
        info!("initializing MGC3130 chipset");
        let mut guard = lock_slot(&self.shared.io);
        let io = guard.as_mut().ok_or(Sense3dError::Closed)?;

        io.interface.reset_low().map_err(Sense3dError::Io)?;
        io.interface.delay(timing::RESET_PULSE);
        io.interface.reset_high().map_err(Sense3dError::Io)?;
        io.interface.delay(timing::RESET_PULSE);

        let frame = match read_frame::<IF, FIRMWARE_FRAME_LEN>(&mut io.interface)? {
            FrameRead::Frame(frame) => frame,
            FrameRead::NoData => return Err(Sense3dError::NoFrame),
            FrameRead::Failed => return Err(Sense3dError::ReadFailed),
        };
        if frame[MSG_TYPE_OFFSET] != FLAG_FIRMWARE_INFO {
            warn!(
                "expected firmware info after reset, got frame type {:#04x}",
                frame[MSG_TYPE_OFFSET]
            );
            return Err(Sense3dError::UnexpectedFrame {
                found: frame[MSG_TYPE_OFFSET],
            });
        }
        let firmware = parse_firmware_info(&frame)?;

        io.interface.delay(timing::FIRMWARE_SETTLE);
        debug!("locking data output: dsp status, gesture, touch, air-wheel, position");
        io.interface.write(&CMD_OUTPUT_LOCK).map_err(Sense3dError::Io)?;
        io.interface.delay(timing::INTER_COMMAND_GAP);
        debug!("enabling auto-calibration triggers");
        io.interface
            .write(&CMD_AUTO_CALIBRATION)
            .map_err(Sense3dError::Io)?;

        self.state = LifecycleState::Ready;
        info!(
            "MGC3130 initialization complete, firmware version {:?}",
            firmware.version
        );
        Ok(firmware)
    }

    // --- Polling lifecycle ---

    /// Spawns the background polling loop.
    ///
    /// Exactly one poll thread may be alive per controller; a second call
    /// without an intervening [`stop`](Self::stop) fails with
    /// [`Sense3dError::AlreadyRunning`].
    pub fn start(&mut self) -> Result<(), Sense3dError<IF::Error>> {
        if self.state == LifecycleState::Closed {
            return Err(Sense3dError::Closed);
        }
        if self.shared.running.load(Ordering::Acquire)
            || self.poll_handle.as_ref().is_some_and(|h| !h.is_finished())
        {
            return Err(Sense3dError::AlreadyRunning);
        }
        // Reap a handle left over from a loop that exited on its own.
        if let Some(handle) = self.poll_handle.take() {
            let _ = handle.join();
        }

        self.shared.running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        self.poll_handle = Some(std::thread::spawn(move || poll_loop(&shared)));
        self.state = LifecycleState::Polling;
        Ok(())
    }

    /// Stops the polling loop and waits for the poll thread to exit.
    ///
    /// Idempotent; safe to call when nothing is running. A wedged bus read
    /// delays the join until it returns, by design: there is no per-read
    /// cancellation in the protocol.
    pub fn stop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(handle) = self.poll_handle.take() {
            if handle.join().is_err() {
                warn!("poll thread panicked before shutdown");
            }
        }
        if self.state == LifecycleState::Polling {
            self.state = LifecycleState::Stopped;
        }
    }

    /// Stops polling if needed, releases the bus handle, and clears all
    /// listener registrations. Idempotent; the bus is released exactly once.
    pub fn close(&mut self) {
        if self.shared.running.load(Ordering::Acquire) || self.poll_handle.is_some() {
            self.stop();
        }
        // Dropping the Io releases the underlying bus/pin handles.
        lock_slot(&self.shared.io).take();
        self.shared.listeners.clear_all();
        self.state = LifecycleState::Closed;
    }

    // --- Observability ---

    /// Current lifecycle state, for diagnostics.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the poll thread is currently running.
    pub fn is_polling(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Number of bus read faults absorbed by the poll loop so far.
    pub fn read_errors(&self) -> u64 {
        self.shared.read_errors.load(Ordering::Relaxed)
    }

    /// Number of frames skipped for carrying an unknown type marker.
    pub fn unexpected_frames(&self) -> u64 {
        self.shared.unexpected_frames.load(Ordering::Relaxed)
    }

    // --- Listener registration ---
    // One slot per kind; setting replaces, clearing empties.

    /// Registers the gesture listener, replacing any previous one.
    pub fn set_on_gesture<F>(&self, listener: F)
    where
        F: FnMut(GestureType) + Send + 'static,
    {
        *lock_slot(&self.shared.listeners.gesture) = Some(Box::new(listener));
    }

    /// Clears the gesture listener slot.
    pub fn clear_on_gesture(&self) {
        *lock_slot(&self.shared.listeners.gesture) = None;
    }

    /// Registers the position listener, replacing any previous one.
    /// Position frames arrive at up to 200 Hz; keep this cheap.
    pub fn set_on_move<F>(&self, listener: F)
    where
        F: FnMut(MoveEvent) + Send + 'static,
    {
        *lock_slot(&self.shared.listeners.moves) = Some(Box::new(listener));
    }

    /// Clears the position listener slot.
    pub fn clear_on_move(&self) {
        *lock_slot(&self.shared.listeners.moves) = None;
    }

    /// Registers the touch/tap listener, replacing any previous one.
    pub fn set_on_touch<F>(&self, listener: F)
    where
        F: FnMut(TouchType) + Send + 'static,
    {
        *lock_slot(&self.shared.listeners.touch) = Some(Box::new(listener));
    }

    /// Clears the touch/tap listener slot.
    pub fn clear_on_touch(&self) {
        *lock_slot(&self.shared.listeners.touch) = None;
    }

    /// Registers the air-wheel listener, replacing any previous one.
    /// The value passed is the rotation delta in degrees.
    pub fn set_on_airwheel<F>(&self, listener: F)
    where
        F: FnMut(f64) + Send + 'static,
    {
        *lock_slot(&self.shared.listeners.airwheel) = Some(Box::new(listener));
    }

    /// Clears the air-wheel listener slot.
    pub fn clear_on_airwheel(&self) {
        *lock_slot(&self.shared.listeners.airwheel) = None;
    }
}

/// Body of the poll thread.
///
/// Listener callbacks run here, synchronously, in decode order; a listener
/// that blocks starves the poll cadence.
fn poll_loop<IF>(shared: &Shared<IF>)
where
    IF: Sense3dIo + Sense3dTimer,
{
    info!("polling MGC3130 chipset");
    while shared.running.load(Ordering::Acquire) {
        let mut guard = lock_slot(&shared.io);
        let Some(io) = guard.as_mut() else {
            break;
        };

        match read_frame::<IF, SENSOR_FRAME_LEN>(&mut io.interface) {
            Ok(FrameRead::NoData) => {}
            Ok(FrameRead::Failed) => {
                shared.read_errors.fetch_add(1, Ordering::Relaxed);
                debug!("sensor read failed; continuing to poll");
            }
            Ok(FrameRead::Frame(frame)) => {
                if frame[MSG_TYPE_OFFSET] == FLAG_SENSOR_DATA {
                    for event in io.decoder.decode(&frame) {
                        shared.listeners.dispatch(event);
                    }
                } else {
                    shared.unexpected_frames.fetch_add(1, Ordering::Relaxed);
                    debug!("ignoring frame with type {:#04x}", frame[MSG_TYPE_OFFSET]);
                }
            }
            Err(err) => {
                // Transfer-line faults are not recoverable from inside the
                // loop; leave restart policy to the owner.
                warn!("poll loop aborting: {err}");
                break;
            }
        }

        io.interface.delay(timing::POLL_INTERVAL);
    }
    shared.running.store(false, Ordering::Release);
    info!("stopped polling MGC3130 chipset");
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::frame::{
        CONFIG_MASK_OFFSET, DATA_GESTURE, FW_VALID_OFFSET, FW_VERSION_STRING_OFFSET,
        GESTURE_OFFSET,
    };
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicU32;
    use std::time::{Duration, Instant};

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    struct ScriptError;

    /// Operations recorded by the scripted interface, for sequence asserts.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        ResetLow,
        ResetHigh,
        Write(Vec<u8>),
    }

    /// Scripted HAL: serves queued frames, then reports the transfer line
    /// high (idle). Ops and drops are observable from outside through Arcs.
    struct ScriptedInterface {
        frames: VecDeque<Vec<u8>>,
        ops: Arc<Mutex<Vec<Op>>>,
        drops: Arc<AtomicU32>,
    }

    impl ScriptedInterface {
        fn new(frames: Vec<Vec<u8>>) -> (Self, Arc<Mutex<Vec<Op>>>, Arc<AtomicU32>) {
            let ops = Arc::new(Mutex::new(Vec::new()));
            let drops = Arc::new(AtomicU32::new(0));
            let interface = ScriptedInterface {
                frames: frames.into(),
                ops: Arc::clone(&ops),
                drops: Arc::clone(&drops),
            };
            (interface, ops, drops)
        }
    }

    impl Drop for ScriptedInterface {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Sense3dIo for ScriptedInterface {
        type Error = ScriptError;
        fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
            lock_slot(&self.ops).push(Op::Write(bytes.to_vec()));
            Ok(())
        }
        fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
            let frame = self.frames.pop_front().ok_or(ScriptError)?;
            assert_eq!(buf.len(), frame.len(), "scripted frame length mismatch");
            buf.copy_from_slice(&frame);
            Ok(())
        }
        fn transfer_is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.frames.is_empty())
        }
        fn transfer_assert_low(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
        fn transfer_release(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
        fn reset_high(&mut self) -> Result<(), Self::Error> {
            lock_slot(&self.ops).push(Op::ResetHigh);
            Ok(())
        }
        fn reset_low(&mut self) -> Result<(), Self::Error> {
            lock_slot(&self.ops).push(Op::ResetLow);
            Ok(())
        }
    }

    impl Sense3dTimer for ScriptedInterface {
        type Instant = Instant;
        fn now(&self) -> Instant {
            Instant::now()
        }
        fn delay(&mut self, _duration: Duration) {
            // Keep tests fast; a token sleep still yields the CPU.
            std::thread::sleep(Duration::from_micros(50));
        }
    }

    fn firmware_frame() -> Vec<u8> {
        let mut frame = vec![0u8; FIRMWARE_FRAME_LEN];
        frame[MSG_TYPE_OFFSET] = FLAG_FIRMWARE_INFO;
        frame[FW_VALID_OFFSET] = 0xAA;
        frame[FW_VERSION_STRING_OFFSET..FW_VERSION_STRING_OFFSET + 5]
            .copy_from_slice(b"v1.2\0");
        frame
    }

    fn gesture_frame(raw: u8) -> Vec<u8> {
        let mut frame = vec![0u8; SENSOR_FRAME_LEN];
        frame[MSG_TYPE_OFFSET] = FLAG_SENSOR_DATA;
        frame[CONFIG_MASK_OFFSET] = DATA_GESTURE;
        frame[GESTURE_OFFSET] = raw;
        frame
    }

    fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
        let give_up = Instant::now() + deadline;
        while Instant::now() < give_up {
            if done() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        done()
    }

    #[test]
    fn test_init_resets_and_configures() {
        let (interface, ops, _) = ScriptedInterface::new(vec![firmware_frame()]);
        let mut controller = Sense3dController::new(interface);

        let firmware = controller.init().unwrap();
        assert_eq!(firmware.version, "v1.2");
        assert!(firmware.received);
        assert_eq!(controller.state(), LifecycleState::Ready);

        let ops = lock_slot(&ops).clone();
        assert_eq!(
            ops,
            vec![
                Op::ResetLow,
                Op::ResetHigh,
                Op::Write(CMD_OUTPUT_LOCK.to_vec()),
                Op::Write(CMD_AUTO_CALIBRATION.to_vec()),
            ]
        );
    }

    #[test]
    fn test_init_rejects_wrong_frame_type() {
        let mut bogus = firmware_frame();
        bogus[MSG_TYPE_OFFSET] = FLAG_SENSOR_DATA;
        let (interface, _, _) = ScriptedInterface::new(vec![bogus]);
        let mut controller = Sense3dController::new(interface);

        let result = controller.init();
        assert!(matches!(
            result,
            Err(Sense3dError::UnexpectedFrame { found: FLAG_SENSOR_DATA })
        ));
        assert_eq!(controller.state(), LifecycleState::Uninitialized);
    }

    #[test]
    fn test_init_without_frame_is_fatal() {
        let (interface, _, _) = ScriptedInterface::new(vec![]);
        let mut controller = Sense3dController::new(interface);
        assert!(matches!(controller.init(), Err(Sense3dError::NoFrame)));
    }

    #[test]
    fn test_init_surfaces_firmware_validity_failure() {
        let mut frame = firmware_frame();
        frame[FW_VALID_OFFSET] = 0x00;
        let (interface, _, _) = ScriptedInterface::new(vec![frame]);
        let mut controller = Sense3dController::new(interface);
        assert!(matches!(
            controller.init(),
            Err(Sense3dError::Firmware(crate::common::FirmwareError::NoLibrary))
        ));
    }

    #[test]
    fn test_start_twice_fails_with_lifecycle_error() {
        let (interface, _, _) = ScriptedInterface::new(vec![]);
        let mut controller = Sense3dController::new(interface);

        controller.start().unwrap();
        assert!(matches!(
            controller.start(),
            Err(Sense3dError::AlreadyRunning)
        ));
        controller.stop();
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (interface, _, _) = ScriptedInterface::new(vec![]);
        let mut controller = Sense3dController::new(interface);
        controller.stop();
        controller.start().unwrap();
        controller.stop();
        controller.stop();
        assert!(!controller.is_polling());
        assert_eq!(controller.state(), LifecycleState::Stopped);
    }

    #[test]
    fn test_restart_after_stop_is_allowed() {
        let (interface, _, _) = ScriptedInterface::new(vec![]);
        let mut controller = Sense3dController::new(interface);
        controller.start().unwrap();
        controller.stop();
        controller.start().unwrap();
        controller.stop();
    }

    #[test]
    fn test_poll_dispatches_gesture_to_listener() {
        let (interface, _, _) =
            ScriptedInterface::new(vec![firmware_frame(), gesture_frame(6)]);
        let mut controller = Sense3dController::new(interface);
        controller.init().unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        controller.set_on_gesture(move |gesture| lock_slot(&sink).push(gesture));

        controller.start().unwrap();
        assert!(
            wait_until(Duration::from_secs(2), || !lock_slot(&seen).is_empty()),
            "gesture never dispatched"
        );
        controller.stop();

        assert_eq!(lock_slot(&seen).as_slice(), &[GestureType::CircleClockwise]);
    }

    #[test]
    fn test_poll_counts_skipped_unknown_frame_types() {
        let mut unknown = gesture_frame(1);
        unknown[MSG_TYPE_OFFSET] = 0x55;
        let (interface, _, _) = ScriptedInterface::new(vec![firmware_frame(), unknown]);
        let mut controller = Sense3dController::new(interface);
        controller.init().unwrap();

        let seen = Arc::new(AtomicU32::new(0));
        let sink = Arc::clone(&seen);
        controller.set_on_gesture(move |_| {
            sink.fetch_add(1, Ordering::SeqCst);
        });

        controller.start().unwrap();
        let counted =
            wait_until(Duration::from_secs(2), || controller.unexpected_frames() == 1);
        controller.stop();

        assert!(counted, "unknown frame never counted");
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_lifecycle_round_trip_releases_bus_once() {
        let (interface, _, drops) = ScriptedInterface::new(vec![firmware_frame()]);
        let mut controller = Sense3dController::new(interface);

        controller.init().unwrap();
        controller.start().unwrap();
        controller.stop();
        controller.close();

        assert!(!controller.is_polling());
        assert_eq!(controller.state(), LifecycleState::Closed);
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        // close() is idempotent; the bus is not released twice.
        controller.close();
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_clears_listeners_and_blocks_restart() {
        let (interface, _, _) = ScriptedInterface::new(vec![]);
        let mut controller = Sense3dController::new(interface);
        controller.set_on_touch(|_| {});
        controller.close();

        assert!(lock_slot(&controller.shared.listeners.touch).is_none());
        assert!(matches!(controller.start(), Err(Sense3dError::Closed)));
        assert!(matches!(controller.init(), Err(Sense3dError::Closed)));
    }

    #[test]
    fn test_close_while_polling_stops_first() {
        let (interface, _, drops) = ScriptedInterface::new(vec![]);
        let mut controller = Sense3dController::new(interface);
        controller.start().unwrap();
        controller.close();
        assert!(!controller.is_polling());
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }
}
