//! Data-driven workshop tuning
//!
//! Hit radii, delays and particle physics were tuned by eye against the
//! rendered scale. They live here rather than in the simulation so the host
//! can override any of them from JSON.

use std::collections::BTreeMap;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::Phase;
use crate::sim::layout::{JointLayout, LayoutError, SeatLayout};

/// Tuning that cannot produce a playable workshop
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn check(ok: bool, field: &'static str, reason: impl Into<String>) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: reason.into(),
        })
    }
}

/// Dovetail box joints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JointTuning {
    pub board_width: f32,
    pub board_height: f32,
    pub tail_count: usize,
    /// Share of the board width taken by all tails together
    pub tail_width_ratio: f32,
    pub flare: f32,
    /// Saw and pencil hit radius is tail width / this
    pub tail_hit_divisor: f32,
    /// Height the dragged board comes to rest at
    pub seat_height: f32,
    pub clamps: Vec<Vec3>,
}

impl Default for JointTuning {
    fn default() -> Self {
        Self {
            board_width: 2.0,
            board_height: 0.5,
            tail_count: 4,
            tail_width_ratio: 0.6,
            flare: 0.08,
            tail_hit_divisor: 1.5,
            seat_height: 0.5,
            clamps: vec![Vec3::new(-0.9, 1.0, 0.3), Vec3::new(0.9, 1.0, 0.3)],
        }
    }
}

/// Stool seat and legs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoolTuning {
    pub seat_radius: f32,
    /// Distance from the seat rim to a hole centre, along the diagonal
    pub hole_inset: f32,
    pub drill_hit_radius: f32,
    /// Height of the seat once driven onto the legs
    pub seat_height: f32,
    pub clamps: Vec<Vec3>,
}

impl Default for StoolTuning {
    fn default() -> Self {
        Self {
            seat_radius: 0.6,
            hole_inset: 0.18,
            drill_hit_radius: 0.25,
            seat_height: 0.9,
            clamps: vec![Vec3::new(-0.7, 1.0, 0.0), Vec3::new(0.7, 1.0, 0.0)],
        }
    }
}

/// Tree felling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimberTuning {
    /// Tree trunk centres on the ground plane (x, z)
    pub trees: Vec<Vec2>,
    /// Saplings that must not be hit (x, z)
    pub saplings: Vec<Vec2>,
    pub tree_radius: f32,
    pub sapling_radius: f32,
    /// Axe heights that count as a cut
    pub cut_min_y: f32,
    pub cut_max_y: f32,
    /// Seconds of chopping to fell one tree
    pub fell_seconds: f32,
    pub logs_per_tree: u32,
}

impl Default for TimberTuning {
    fn default() -> Self {
        Self {
            trees: vec![
                Vec2::new(-1.5, -1.0),
                Vec2::new(0.0, -1.6),
                Vec2::new(1.5, -0.8),
            ],
            saplings: vec![Vec2::new(-0.7, -1.3), Vec2::new(0.8, -1.2)],
            tree_radius: 0.3,
            sapling_radius: 0.25,
            cut_min_y: 0.2,
            cut_max_y: 1.0,
            fell_seconds: 1.2,
            logs_per_tree: 2,
        }
    }
}

/// Drag-then-hammer seating
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyTuning {
    /// Visible gap left above the final position before hammering
    pub gap: f32,
    /// How close the drag must come to the gap to snap
    pub tolerance: f32,
    pub required_taps: u32,
    /// Starting height of the part above its final position
    pub lift: f32,
}

impl Default for AssemblyTuning {
    fn default() -> Self {
        Self {
            gap: 0.12,
            tolerance: 0.04,
            required_taps: REQUIRED_TAPS,
            lift: 0.8,
        }
    }
}

/// Sawdust
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleTuning {
    pub capacity: usize,
    pub burst_size: usize,
    pub burst_ticks: u32,
    pub gravity: f32,
    /// Horizontal velocity damping per second
    pub drag: f32,
    pub floor_y: f32,
    /// Scale multiplier applied when a particle comes to rest
    pub pile_shrink: f32,
    /// RGB colours
    pub palette: Vec<u32>,
}

impl Default for ParticleTuning {
    fn default() -> Self {
        Self {
            capacity: PARTICLE_CAPACITY,
            burst_size: BURST_SIZE,
            burst_ticks: BURST_TICKS,
            gravity: GRAVITY,
            drag: 2.5,
            floor_y: FLOOR_Y,
            pile_shrink: 0.7,
            palette: vec![0xD9B382, 0xC49A6C, 0xE8C9A0, 0xA67C52],
        }
    }
}

/// All workshop tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub joint: JointTuning,
    pub stool: StoolTuning,
    pub timber: TimberTuning,
    pub assembly: AssemblyTuning,
    pub particles: ParticleTuning,
    /// Seconds between a phase's last action and the next phase
    pub settle_delays: BTreeMap<Phase, f32>,
    pub max_dt: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        let settle_delays = BTreeMap::from([
            (Phase::Timber, 3.5),
            (Phase::Cutting, 0.8),
            (Phase::AssemblyPrep, 0.8),
            (Phase::CuttingBack, 0.8),
            (Phase::CuttingTop, 0.8),
            (Phase::Assembly, 1.0),
            (Phase::AssemblyC, 1.0),
            (Phase::AssemblyD, 1.0),
        ]);

        Self {
            joint: JointTuning::default(),
            stool: StoolTuning::default(),
            timber: TimberTuning::default(),
            assembly: AssemblyTuning::default(),
            particles: ParticleTuning::default(),
            settle_delays,
            max_dt: MAX_DT,
        }
    }
}

impl Tuning {
    /// Parse and validate; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Settle delay after the given phase completes (0 if unlisted)
    pub fn settle_delay(&self, phase: Phase) -> f32 {
        self.settle_delays.get(&phase).copied().unwrap_or(0.0)
    }

    /// Tail saw/pencil hit radius
    pub fn tail_hit_radius(&self, layout: &JointLayout) -> f32 {
        layout.tail_width / self.joint.tail_hit_divisor
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        JointLayout::from_tuning(&self.joint)?;
        SeatLayout::from_tuning(&self.stool)?;

        let j = &self.joint;
        check(j.tail_hit_divisor > 0.0, "joint.tail_hit_divisor", "must be positive")?;
        check(!j.clamps.is_empty(), "joint.clamps", "at least one clamp is required")?;

        let s = &self.stool;
        check(s.drill_hit_radius > 0.0, "stool.drill_hit_radius", "must be positive")?;
        check(!s.clamps.is_empty(), "stool.clamps", "at least one clamp is required")?;

        let t = &self.timber;
        check(!t.trees.is_empty(), "timber.trees", "at least one tree is required")?;
        check(t.tree_radius > 0.0, "timber.tree_radius", "must be positive")?;
        check(t.sapling_radius >= 0.0, "timber.sapling_radius", "must not be negative")?;
        check(
            t.cut_min_y < t.cut_max_y,
            "timber.cut_min_y",
            format!("{} is not below cut_max_y {}", t.cut_min_y, t.cut_max_y),
        )?;
        check(t.fell_seconds > 0.0, "timber.fell_seconds", "must be positive")?;

        let a = &self.assembly;
        check(a.required_taps > 0, "assembly.required_taps", "must be at least 1")?;
        check(a.gap > 0.0, "assembly.gap", "must be positive")?;
        check(a.tolerance >= 0.0, "assembly.tolerance", "must not be negative")?;
        check(
            a.lift > a.gap + a.tolerance,
            "assembly.lift",
            format!("{} must clear gap plus tolerance", a.lift),
        )?;

        let p = &self.particles;
        check(p.capacity > 0, "particles.capacity", "must be positive")?;
        check(p.burst_ticks > 0, "particles.burst_ticks", "must be at least 1")?;
        check(p.gravity > 0.0, "particles.gravity", "must be positive")?;
        check(p.drag >= 0.0, "particles.drag", "must not be negative")?;
        check(!p.palette.is_empty(), "particles.palette", "needs at least one colour")?;
        check(
            (0.0..=1.0).contains(&p.pile_shrink),
            "particles.pile_shrink",
            "must be within 0..=1",
        )?;

        check(self.max_dt > 0.0, "max_dt", "must be positive")?;
        for (phase, delay) in &self.settle_delays {
            check(
                *delay >= 0.0,
                "settle_delays",
                format!("{phase:?} has negative delay {delay}"),
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_is_valid() {
        let tuning = Tuning::default();
        tuning.validate().unwrap();
        assert_eq!(tuning.settle_delay(Phase::Timber), 3.5);
        assert_eq!(tuning.settle_delay(Phase::Marking), 0.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning =
            Tuning::from_json(r#"{ "joint": { "tail_count": 3 }, "settle_delays": { "TIMBER": 1.0 } }"#)
                .unwrap();
        assert_eq!(tuning.joint.tail_count, 3);
        assert_eq!(tuning.joint.board_width, 2.0);
        assert_eq!(tuning.settle_delay(Phase::Timber), 1.0);
        assert_eq!(tuning.particles.capacity, PARTICLE_CAPACITY);
    }

    #[test]
    fn test_degenerate_layout_fails_at_load() {
        let err = Tuning::from_json(r#"{ "joint": { "tail_width_ratio": 1.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Layout(LayoutError::DegeneratePins { .. })
        ));
    }

    #[test]
    fn test_bad_values_rejected() {
        let mut tuning = Tuning::default();
        tuning.assembly.required_taps = 0;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigError::Invalid {
                field: "assembly.required_taps",
                ..
            })
        ));

        let mut tuning = Tuning::default();
        tuning.timber.cut_min_y = 2.0;
        assert!(tuning.validate().is_err());

        assert!(matches!(
            Tuning::from_json(r#"{ "particles": { "gravity": 0.0 } }"#),
            Err(ConfigError::Invalid {
                field: "particles.gravity",
                ..
            })
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "particles": { "drag": -1.0 } }"#),
            Err(ConfigError::Invalid {
                field: "particles.drag",
                ..
            })
        ));

        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
