//! Read-only view of the workshop for the render and HUD layers

use glam::Vec3;
use serde::Serialize;

use super::assembly::AssemblyState;
use super::phase::{Activity, Phase, Project};
use super::state::{Gesture, WorkshopState};
use super::timber::Tree;

/// Where the camera looks during a phase
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

/// Preset camera per phase. The orbit controls take over from here.
pub fn camera_pose(project: Project, phase: Phase) -> CameraPose {
    let (position, target) = match (project, phase) {
        (_, Phase::Intro) => (Vec3::new(0.0, 2.5, 5.0), Vec3::new(0.0, 0.8, 0.0)),
        (_, Phase::Timber) => (Vec3::new(0.0, 2.0, 2.5), Vec3::new(0.0, 0.5, -1.2)),
        (_, Phase::Clamping) => (Vec3::new(0.0, 2.2, 2.8), Vec3::new(0.0, 1.0, 0.0)),
        // Drilling looks down onto the seat
        (Project::Stool, Phase::Cutting) => (Vec3::new(0.0, 2.6, 1.2), Vec3::new(0.0, 0.9, 0.0)),
        (_, Phase::Marking | Phase::Cutting | Phase::CuttingBack | Phase::CuttingTop) => {
            (Vec3::new(0.0, 1.2, 2.2), Vec3::new(0.0, 0.5, 0.0))
        }
        (_, Phase::AssemblyPrep) => (Vec3::new(0.0, 1.0, 2.0), Vec3::new(0.0, 0.4, 0.0)),
        (_, Phase::Assembly | Phase::AssemblyC | Phase::AssemblyD) => {
            (Vec3::new(1.6, 1.8, 2.4), Vec3::new(0.0, 0.6, 0.0))
        }
        (_, Phase::Success) => (Vec3::new(2.5, 2.5, 3.5), Vec3::new(0.0, 0.6, 0.0)),
    };
    CameraPose { position, target }
}

/// Completion flags of one target phase
#[derive(Debug, Clone, Serialize)]
pub struct TargetView {
    pub phase: Phase,
    pub completed: Vec<bool>,
    pub anchors: Vec<Vec3>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssemblyView {
    pub phase: Phase,
    #[serde(flatten)]
    pub state: AssemblyState,
    /// Current height of the part
    pub position: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticleView {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
    pub color: u32,
    pub piled: bool,
}

/// Everything a frame needs to draw
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub project: Project,
    pub phase: Phase,
    pub activity: Option<Activity>,
    pub progress: f32,
    pub instruction: &'static str,
    /// Pencil lines on the tail board
    pub tails_marked: bool,
    /// Advance is scheduled
    pub ready: bool,
    pub gesture: Gesture,
    pub tool: Option<Vec3>,
    pub targets: Vec<TargetView>,
    pub trees: Vec<Tree>,
    pub assemblies: Vec<AssemblyView>,
    pub particles: Vec<ParticleView>,
    pub camera: CameraPose,
}

impl Snapshot {
    pub fn capture(state: &WorkshopState) -> Self {
        Self {
            project: state.project,
            phase: state.phase,
            activity: state.activity(),
            progress: state.progress(),
            instruction: state.project.instruction(state.phase),
            tails_marked: state.project == Project::Box && state.reached(Phase::Cutting),
            ready: state.pending.is_some(),
            gesture: state.gesture,
            tool: state.tool,
            targets: state
                .targets
                .iter()
                .map(|(&phase, set)| TargetView {
                    phase,
                    completed: set.completed().to_vec(),
                    anchors: set.targets().iter().map(|t| t.anchor).collect(),
                })
                .collect(),
            trees: match state.project {
                Project::Box => state.grove.trees.clone(),
                Project::Stool => Vec::new(),
            },
            assemblies: state
                .assemblies
                .iter()
                .map(|(&phase, a)| AssemblyView {
                    phase,
                    state: a.state,
                    position: a.position(),
                })
                .collect(),
            particles: state
                .particles
                .iter_active()
                .map(|p| ParticleView {
                    position: p.pos,
                    rotation: p.rot,
                    scale: p.scale,
                    color: p.color,
                    piled: p.piled,
                })
                .collect(),
            camera: camera_pose(state.project, state.phase),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn test_snapshot_of_fresh_workshop() {
        let state = WorkshopState::new(1, Tuning::default()).unwrap();
        let snap = Snapshot::capture(&state);
        assert_eq!(snap.phase, Phase::Intro);
        assert_eq!(snap.activity, Some(Activity::Manual));
        assert_eq!(snap.progress, 0.0);
        assert!(!snap.tails_marked);
        assert!(!snap.ready);
        assert_eq!(snap.trees.len(), 3);
        assert_eq!(snap.assemblies.len(), 3);
        assert!(snap.particles.is_empty());
        assert_eq!(snap.camera, camera_pose(Project::Box, Phase::Intro));
    }

    #[test]
    fn test_snapshot_serializes_for_the_host() {
        let mut state = WorkshopState::new(1, Tuning::default()).unwrap();
        state.phase = Phase::CuttingBack;
        let json = serde_json::to_value(Snapshot::capture(&state)).unwrap();
        assert_eq!(json["phase"], "CUTTING_BACK");
        assert_eq!(json["project"], "BOX");
        assert_eq!(json["tails_marked"], true);
        assert_eq!(json["assemblies"][0]["state"], "dragging");
        assert_eq!(json["gesture"], "idle");
    }

    #[test]
    fn test_every_phase_has_a_camera() {
        for project in [Project::Box, Project::Stool] {
            for &phase in project.phases() {
                let pose = camera_pose(project, phase);
                assert_ne!(pose.position, pose.target);
            }
        }
        assert_ne!(
            camera_pose(Project::Stool, Phase::Cutting),
            camera_pose(Project::Box, Phase::Cutting)
        );
    }
}
