//! Deterministic workshop simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep, clamped
//! - Seeded RNG only (sawdust is the only consumer)
//! - Stable iteration order (phase-keyed BTreeMaps)
//! - No rendering or platform dependencies

pub mod assembly;
pub mod layout;
pub mod particles;
pub mod phase;
pub mod state;
pub mod targets;
pub mod tick;
pub mod timber;
pub mod view;

pub use assembly::{Assembly, AssemblyState, AssemblyStep};
pub use layout::{
    JointLayout, LayoutError, SeatLayout, compute_tail_centers, drill_hole_centers,
    polygon_contains,
};
pub use particles::{Particle, ParticlePool};
pub use phase::{Activity, Phase, Project};
pub use state::{GameEvent, Gesture, Grip, Material, PendingAdvance, WorkshopState};
pub use targets::{CutTarget, Sweep, TargetSet, Zone};
pub use tick::{TickInput, tick};
pub use timber::{Chop, Grove, Tree};
pub use view::{CameraPose, Snapshot, camera_pose};
