// src/controller/sync_controller/listeners.rs

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::common::types::{Event, GestureType, MoveEvent, TouchType};

pub type GestureListener = Box<dyn FnMut(GestureType) + Send>;
pub type MoveListener = Box<dyn FnMut(MoveEvent) + Send>;
pub type TouchListener = Box<dyn FnMut(TouchType) + Send>;
pub type AirWheelListener = Box<dyn FnMut(f64) + Send>;

/// Locks a slot, recovering from poisoning.
///
/// A listener that panicked mid-dispatch poisons its slot; the slot contents
/// are plain callback boxes with no invariants to protect, so the registry
/// keeps working for the remaining kinds.
pub(crate) fn lock_slot<T>(slot: &Mutex<T>) -> MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One replaceable listener slot per event kind.
///
/// Registering replaces any previous listener for that kind; clearing
/// empties the slot. There is no multi-subscriber fan-out. Slots are
/// individually mutex-guarded so registration from any thread is safe while
/// the poll thread dispatches.
#[derive(Default)]
pub(crate) struct Listeners {
    pub(crate) gesture: Mutex<Option<GestureListener>>,
    pub(crate) moves: Mutex<Option<MoveListener>>,
    pub(crate) touch: Mutex<Option<TouchListener>>,
    pub(crate) airwheel: Mutex<Option<AirWheelListener>>,
}

impl Listeners {
    /// Invokes the registered listener for the event's kind, if any.
    /// Runs on the poll thread; listeners for different kinds never overlap.
    pub(crate) fn dispatch(&self, event: Event) {
        match event {
            Event::Gesture(gesture) => {
                if let Some(listener) = lock_slot(&self.gesture).as_mut() {
                    listener(gesture);
                }
            }
            Event::Move(movement) => {
                if let Some(listener) = lock_slot(&self.moves).as_mut() {
                    listener(movement);
                }
            }
            Event::Touch(touch) => {
                if let Some(listener) = lock_slot(&self.touch).as_mut() {
                    listener(touch);
                }
            }
            Event::AirWheel(degrees) => {
                if let Some(listener) = lock_slot(&self.airwheel).as_mut() {
                    listener(degrees);
                }
            }
        }
    }

    pub(crate) fn clear_all(&self) {
        *lock_slot(&self.gesture) = None;
        *lock_slot(&self.moves) = None;
        *lock_slot(&self.touch) = None;
        *lock_slot(&self.airwheel) = None;
    }
}
