// src/controller/mod.rs

pub mod sync_controller;

// Re-export the public controller surface.
pub use sync_controller::{LifecycleState, Sense3dController};
