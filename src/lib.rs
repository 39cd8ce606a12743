//! Dovetail - a woodworking workshop in the browser
//!
//! Core modules:
//! - `sim`: Deterministic simulation (phases, cut targets, assembly, sawdust)
//! - `tuning`: Data-driven layout, hit radii and timing
//! - `session`: Inventory counters and crafted-item record
//! - `bench`: Host frame loop (intents in, buffered events out)
//! - `wasm`: Browser bindings consumed by the render/HUD layer

pub mod bench;
pub mod session;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use bench::Bench;
pub use session::Session;
pub use tuning::{ConfigError, Tuning};

use glam::{Vec2, Vec3};

/// Workshop configuration constants
pub mod consts {
    /// Nominal frame timestep used by scripted runs (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Largest timestep the simulation will integrate in one tick
    pub const MAX_DT: f32 = 0.1;

    /// Sawdust pool size (never grows)
    pub const PARTICLE_CAPACITY: usize = 1200;
    /// Particles per burst
    pub const BURST_SIZE: usize = 60;
    /// Ticks a burst is spread over
    pub const BURST_TICKS: u32 = 15;
    /// Downward acceleration on sawdust (units/s²)
    pub const GRAVITY: f32 = 9.8;
    /// Workshop floor height
    pub const FLOOR_Y: f32 = 0.0;

    /// Hammer taps needed to close the assembly gap
    pub const REQUIRED_TAPS: u32 = 3;
}

/// Project a world position onto the ground plane (x, z)
#[inline]
pub fn ground(pos: Vec3) -> Vec2 {
    Vec2::new(pos.x, pos.z)
}

/// Project a world position onto the board face plane (x, y)
#[inline]
pub fn face(pos: Vec3) -> Vec2 {
    Vec2::new(pos.x, pos.y)
}
