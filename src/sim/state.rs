//! Workshop state and phase progression
//!
//! Everything the render and HUD layers read lives here as plain data. Input
//! that arrives in the wrong phase or sub-state is dropped without comment:
//! it only ever comes from UI races.

use std::collections::BTreeMap;

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::assembly::{Assembly, AssemblyState, AssemblyStep};
use super::layout::{JointLayout, SeatLayout};
use super::particles::ParticlePool;
use super::phase::{Activity, Phase, Project};
use super::targets::{Sweep, TargetSet};
use super::timber::Grove;
use crate::tuning::{ConfigError, Tuning};

/// Raw materials handed to the session layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    Log,
}

/// Something the host should react to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PhaseEntered { project: Project, phase: Phase },
    TargetCompleted { phase: Phase, index: usize, position: Vec3 },
    MaterialYielded { material: Material, amount: u32 },
    /// The axe touched a protected sapling; no chopping this contact
    SaplingStruck { position: Vec3 },
    /// Every target of the phase is done; the advance is scheduled
    PhaseReady { phase: Phase },
    PartSeated { phase: Phase },
    HammerStruck { phase: Phase, tap: u32, remaining_gap: f32 },
    AssemblyDone { phase: Phase },
    /// Camera orbit controls must follow this
    OrbitControls { enabled: bool },
    ProjectCompleted { project: Project },
}

/// What the pointer went down on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grip {
    Tool,
    Part,
}

/// Pointer capture. Moves go to the captured gesture until release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    #[default]
    Idle,
    Tool,
    Part,
}

/// Phase advance waiting out its settle delay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingAdvance {
    /// Phase that completed
    pub phase: Phase,
    /// Project epoch at scheduling time
    pub epoch: u64,
    /// Seconds left
    pub remaining: f32,
}

/// Complete workshop state
#[derive(Debug, Clone)]
pub struct WorkshopState {
    pub seed: u64,
    pub tuning: Tuning,
    pub joint: JointLayout,
    pub seat: SeatLayout,
    pub project: Project,
    /// Current phase
    pub phase: Phase,
    /// Bumped on every project start so stale advances can be recognised
    pub epoch: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub gesture: Gesture,
    /// Last tool position of the current gesture
    pub tool: Option<Vec3>,
    /// Completion flags for every target phase of the project
    pub targets: BTreeMap<Phase, TargetSet>,
    pub grove: Grove,
    /// Axe was against a sapling last tick
    sapling_contact: bool,
    /// One assembly per assembly phase of the project
    pub assemblies: BTreeMap<Phase, Assembly>,
    pub pending: Option<PendingAdvance>,
    /// Visual particles (not gameplay-affecting)
    pub particles: ParticlePool,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    rng: Pcg32,
}

impl WorkshopState {
    /// Validate the tuning, lay out the joints and open the box project
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let joint = JointLayout::from_tuning(&tuning.joint)?;
        let seat = SeatLayout::from_tuning(&tuning.stool)?;

        let mut state = Self {
            seed,
            joint,
            seat,
            project: Project::Box,
            phase: Phase::Intro,
            epoch: 0,
            time_ticks: 0,
            gesture: Gesture::Idle,
            tool: None,
            targets: BTreeMap::new(),
            grove: Grove::new(&tuning.timber),
            sapling_contact: false,
            assemblies: BTreeMap::new(),
            pending: None,
            particles: ParticlePool::new(&tuning.particles),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            tuning,
        };
        state.start_project(Project::Box);
        Ok(state)
    }

    /// Reset everything and enter INTRO of `project`
    pub fn start_project(&mut self, project: Project) {
        self.end_gesture();
        self.epoch += 1;
        if let Some(stale) = self.pending.take() {
            log::debug!("Cancelled pending advance out of {:?}", stale.phase);
        }
        self.particles.clear();
        self.grove.reset();

        self.project = project;
        self.targets = project
            .phases()
            .iter()
            .filter_map(|&phase| self.build_targets(project, phase).map(|t| (phase, t)))
            .collect();
        let seat_y = match project {
            Project::Box => self.tuning.joint.seat_height,
            Project::Stool => self.tuning.stool.seat_height,
        };
        self.assemblies = project
            .phases()
            .iter()
            .filter(|&&phase| project.activity(phase) == Some(Activity::Assemble))
            .map(|&phase| (phase, Assembly::new(seat_y, &self.tuning.assembly)))
            .collect();

        self.phase = Phase::Intro;
        log::info!("Starting {} (epoch {})", project.label(), self.epoch);
        self.events.push(GameEvent::PhaseEntered {
            project,
            phase: Phase::Intro,
        });
    }

    fn build_targets(&self, project: Project, phase: Phase) -> Option<TargetSet> {
        let targets = match project.activity(phase)? {
            Activity::Clamp => TargetSet::buttons(match project {
                Project::Box => &self.tuning.joint.clamps,
                Project::Stool => &self.tuning.stool.clamps,
            }),
            Activity::Mark | Activity::Saw => TargetSet::spans(
                &self.joint.tail_centers,
                self.tuning.tail_hit_radius(&self.joint),
                self.joint.board_height,
            ),
            Activity::Chisel => TargetSet::regions(self.joint.socket_regions()),
            Activity::Drill => TargetSet::discs(
                &self.seat.holes,
                self.tuning.stool.drill_hit_radius,
                self.tuning.stool.seat_height,
            ),
            _ => return None,
        };
        Some(targets)
    }

    fn enter_phase(&mut self, phase: Phase) {
        self.end_gesture();
        if let Some(targets) = self.targets.get_mut(&phase) {
            targets.reset();
        }
        if let Some(assembly) = self.assemblies.get_mut(&phase) {
            assembly.reset();
        }
        if phase == Phase::Timber {
            self.grove.reset();
        }

        self.phase = phase;
        log::info!("{}: entering {:?}", self.project.label(), phase);
        self.events.push(GameEvent::PhaseEntered {
            project: self.project,
            phase,
        });
        if phase == Phase::Success {
            self.events.push(GameEvent::ProjectCompleted {
                project: self.project,
            });
        }
    }

    /// Interaction style of the current phase
    pub fn activity(&self) -> Option<Activity> {
        self.project.activity(self.phase)
    }

    /// Targets of the current phase, if it has any
    pub fn active_targets(&self) -> Option<&TargetSet> {
        self.targets.get(&self.phase)
    }

    /// Assembly of the current phase, if it is an assembly phase
    pub fn assembly(&self) -> Option<&Assembly> {
        self.assemblies.get(&self.phase)
    }

    /// The current phase is `phase` or comes after it in this project
    pub fn reached(&self, phase: Phase) -> bool {
        let phases = self.project.phases();
        match (
            phases.iter().position(|&p| p == phase),
            phases.iter().position(|&p| p == self.phase),
        ) {
            (Some(target), Some(current)) => current >= target,
            _ => false,
        }
    }

    /// Progress through the current phase in 0..=1
    pub fn progress(&self) -> f32 {
        match self.activity() {
            None | Some(Activity::Manual) => 0.0,
            Some(Activity::Celebrate) => 1.0,
            Some(Activity::Harvest) => self.grove.progress(),
            Some(Activity::Assemble) => self.assembly().map_or(0.0, Assembly::progress),
            Some(_) => self.active_targets().map_or(0.0, TargetSet::progress),
        }
    }

    /// HUD "next" from INTRO
    pub fn advance(&mut self) -> bool {
        if self.phase != Phase::Intro {
            return false;
        }
        self.enter_phase(self.project.first_working_phase());
        true
    }

    /// HUD "collect" from SUCCESS; starts `next` from INTRO
    pub fn collect(&mut self, next: Project) -> bool {
        if self.phase != Phase::Success {
            return false;
        }
        self.start_project(next);
        true
    }

    /// Pointer down on the tool or the part. Returns whether the gesture
    /// was captured.
    pub fn grab(&mut self, grip: Grip) -> bool {
        if self.gesture != Gesture::Idle || self.pending.is_some() {
            return false;
        }

        let accepted = match (grip, self.activity()) {
            (Grip::Tool, Some(activity)) => activity.accepts_tool(),
            (Grip::Part, Some(Activity::Assemble)) => self
                .assembly()
                .is_some_and(|a| a.state == AssemblyState::Dragging),
            _ => false,
        };
        if !accepted {
            return false;
        }

        self.gesture = match grip {
            Grip::Tool => Gesture::Tool,
            Grip::Part => Gesture::Part,
        };
        self.events.push(GameEvent::OrbitControls { enabled: false });
        true
    }

    /// Pointer up or cancel
    pub fn release(&mut self) {
        self.end_gesture();
    }

    fn end_gesture(&mut self) {
        if self.gesture == Gesture::Idle {
            return;
        }
        self.gesture = Gesture::Idle;
        self.tool = None;
        self.sapling_contact = false;
        self.events.push(GameEvent::OrbitControls { enabled: true });
    }

    /// Pointer move, routed to the captured gesture
    pub fn drag(&mut self, pos: Vec3, dt: f32) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Tool => self.move_tool(pos, dt),
            Gesture::Part => self.move_part(pos),
        }
    }

    /// No new pointer position this tick. A held axe keeps chopping where it
    /// last was; every other tool only acts on movement.
    pub fn hold(&mut self, dt: f32) {
        if self.gesture != Gesture::Tool || self.activity() != Some(Activity::Harvest) {
            return;
        }
        if let Some(at) = self.tool {
            self.move_tool(at, dt);
        }
    }

    fn move_tool(&mut self, pos: Vec3, dt: f32) {
        self.tool = Some(pos);
        let Some(activity) = self.activity() else {
            return;
        };

        match activity {
            Activity::Harvest => {
                let chop = self.grove.chop(pos, dt);
                if chop.blocked && !self.sapling_contact {
                    log::debug!("Sapling struck at ({:.2}, {:.2})", pos.x, pos.z);
                    self.events.push(GameEvent::SaplingStruck { position: pos });
                }
                self.sapling_contact = chop.blocked;
                for (index, at) in chop.felled {
                    log::info!("Tree {} felled", index);
                    self.target_completed(index, at, activity);
                    self.events.push(GameEvent::MaterialYielded {
                        material: Material::Log,
                        amount: self.tuning.timber.logs_per_tree,
                    });
                }
                if chop.finished {
                    self.complete_phase();
                }
            }
            Activity::Mark | Activity::Saw | Activity::Chisel | Activity::Drill => {
                let Some(targets) = self.targets.get_mut(&self.phase) else {
                    return;
                };
                let sweep = targets.sweep(pos);
                self.apply_sweep(sweep, activity);
            }
            _ => {}
        }
    }

    fn move_part(&mut self, pos: Vec3) {
        let phase = self.phase;
        let Some(assembly) = self.assemblies.get_mut(&phase) else {
            return;
        };
        if assembly.drag_to(pos.y) == Some(AssemblyStep::Seated) {
            log::debug!("Part seated for {:?}", phase);
            self.events.push(GameEvent::PartSeated { phase });
        }
    }

    /// Hammer click
    pub fn tap(&mut self) {
        let phase = self.phase;
        let Some(assembly) = self.assemblies.get_mut(&phase) else {
            return;
        };
        let Some(step) = assembly.tap() else {
            return;
        };
        let at = Vec3::new(0.0, assembly.position(), 0.0);
        let required = assembly.required_taps();

        match step {
            AssemblyStep::Struck { tap, remaining_gap } => {
                log::debug!("Hammer tap {} on {:?}, gap {:.3}", tap, phase, remaining_gap);
                self.events.push(GameEvent::HammerStruck {
                    phase,
                    tap,
                    remaining_gap,
                });
                self.particles.burst(at);
            }
            AssemblyStep::Done => {
                self.events.push(GameEvent::HammerStruck {
                    phase,
                    tap: required,
                    remaining_gap: 0.0,
                });
                self.events.push(GameEvent::AssemblyDone { phase });
                self.particles.burst(at);
                self.complete_phase();
            }
            AssemblyStep::Moved | AssemblyStep::Seated => {}
        }
    }

    /// Click on a click-only target (clamps)
    pub fn click_target(&mut self, index: usize) {
        if self.activity() != Some(Activity::Clamp) {
            return;
        }
        let Some(targets) = self.targets.get_mut(&self.phase) else {
            return;
        };
        let sweep = targets.mark(index);
        self.apply_sweep(sweep, Activity::Clamp);
    }

    fn apply_sweep(&mut self, sweep: Sweep, activity: Activity) {
        for (index, anchor) in sweep.hits {
            self.target_completed(index, anchor, activity);
        }
        if sweep.finished {
            self.complete_phase();
        }
    }

    fn target_completed(&mut self, index: usize, position: Vec3, activity: Activity) {
        log::debug!("{:?} target {} complete", self.phase, index);
        self.events.push(GameEvent::TargetCompleted {
            phase: self.phase,
            index,
            position,
        });
        if activity.sheds_debris() {
            self.particles.burst(position);
        }
    }

    /// Schedule the advance out of the current phase after its settle delay
    fn complete_phase(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let phase = self.phase;
        let delay = self.tuning.settle_delay(phase);
        self.events.push(GameEvent::PhaseReady { phase });
        self.pending = Some(PendingAdvance {
            phase,
            epoch: self.epoch,
            remaining: delay,
        });
    }

    /// Per-frame update: scheduled advances and particles
    pub fn update(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, self.tuning.max_dt);
        self.time_ticks += 1;

        if let Some(mut pending) = self.pending.take() {
            pending.remaining -= dt;
            if pending.remaining > 0.0 {
                self.pending = Some(pending);
            } else if pending.epoch == self.epoch && pending.phase == self.phase {
                if let Some(next) = self.project.next(self.phase) {
                    self.enter_phase(next);
                }
            } else {
                log::debug!(
                    "Dropped stale advance out of {:?} (epoch {} != {})",
                    pending.phase,
                    pending.epoch,
                    self.epoch
                );
            }
        }

        self.particles.advance(dt, self.tuning.max_dt, &mut self.rng);
    }

    /// Take all events since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> WorkshopState {
        WorkshopState::new(42, Tuning::default()).unwrap()
    }

    fn orbit_balance(events: &[GameEvent]) -> i32 {
        events
            .iter()
            .map(|e| match e {
                GameEvent::OrbitControls { enabled: false } => 1,
                GameEvent::OrbitControls { enabled: true } => -1,
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn test_new_state_starts_box_intro() {
        let mut state = state();
        assert_eq!(state.project, Project::Box);
        assert_eq!(state.phase, Phase::Intro);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::PhaseEntered {
                project: Project::Box,
                phase: Phase::Intro
            }]
        );
        // Mark, three saws and the chisel phase each get a target set
        assert_eq!(state.targets.len(), 6);
        assert_eq!(state.assemblies.len(), 3);
    }

    #[test]
    fn test_degenerate_layout_rejected_at_construction() {
        let mut tuning = Tuning::default();
        tuning.joint.tail_width_ratio = 1.0;
        assert!(matches!(
            WorkshopState::new(1, tuning),
            Err(ConfigError::Layout(_))
        ));
    }

    #[test]
    fn test_manual_advance_only_from_intro() {
        let mut state = state();
        assert!(!state.collect(Project::Stool));
        assert!(state.advance());
        assert_eq!(state.phase, Phase::Timber);
        assert!(!state.advance());
        assert_eq!(state.phase, Phase::Timber);
    }

    #[test]
    fn test_grab_rules_and_orbit_symmetry() {
        let mut state = state();
        state.drain_events();

        // Nothing to hold in INTRO
        assert!(!state.grab(Grip::Tool));
        state.release();
        assert!(state.drain_events().is_empty());

        state.advance();
        assert!(!state.grab(Grip::Part));
        assert!(state.grab(Grip::Tool));
        assert!(!state.grab(Grip::Tool));
        assert_eq!(state.gesture, Gesture::Tool);

        // Reset while captured still hands the camera back
        state.start_project(Project::Box);
        assert_eq!(state.gesture, Gesture::Idle);
        let events = state.drain_events();
        assert_eq!(orbit_balance(&events), 0);
        assert!(events.contains(&GameEvent::OrbitControls { enabled: true }));
    }

    #[test]
    fn test_moves_without_capture_are_ignored() {
        let mut state = state();
        state.advance();
        state.phase = Phase::Marking;
        state.drag(Vec3::new(state.joint.tail_centers[0], 0.5, 0.0), 0.016);
        assert_eq!(state.active_targets().map(|t| t.completed_count()), Some(0));
    }

    #[test]
    fn test_wrong_phase_inputs_are_noops() {
        let mut state = state();
        state.advance();
        state.drain_events();

        state.tap();
        state.click_target(0);
        assert!(!state.advance());
        assert!(!state.collect(Project::Stool));
        assert!(state.drain_events().is_empty());
        assert_eq!(state.phase, Phase::Timber);
        assert!(state.pending.is_none());
    }

    #[test]
    fn test_clamp_clicks_advance_immediately() {
        let mut state = state();
        state.advance();
        state.phase = Phase::Clamping;

        state.click_target(0);
        state.click_target(0);
        assert!(state.pending.is_none());
        state.click_target(1);
        assert!(state.pending.is_some());

        state.update(0.016);
        assert_eq!(state.phase, Phase::Marking);
        // Clamps throw no sawdust
        assert_eq!(state.particles.pending_bursts(), 0);
    }

    #[test]
    fn test_settle_delay_gates_advance() {
        let mut state = state();
        state.advance();
        state.phase = Phase::Cutting;
        state.grab(Grip::Tool);
        for x in state.joint.tail_centers.clone() {
            state.drag(Vec3::new(x, 0.5, 0.0), 0.016);
        }
        assert_eq!(state.pending.map(|p| p.phase), Some(Phase::Cutting));

        // 0.8s settle at 0.1s per tick
        for _ in 0..7 {
            state.update(0.1);
            assert_eq!(state.phase, Phase::Cutting);
        }
        state.update(0.1);
        state.update(0.1);
        assert_eq!(state.phase, Phase::AssemblyPrep);
        assert_eq!(state.gesture, Gesture::Idle);
        assert_eq!(orbit_balance(&state.drain_events()), 0);
    }

    #[test]
    fn test_stale_advance_is_dropped() {
        let mut state = state();
        let old_epoch = state.epoch;
        state.start_project(Project::Stool);
        state.pending = Some(PendingAdvance {
            phase: Phase::Intro,
            epoch: old_epoch,
            remaining: 0.0,
        });
        state.update(0.016);
        assert_eq!(state.phase, Phase::Intro);
        assert!(state.pending.is_none());
    }

    #[test]
    fn test_held_axe_keeps_chopping() {
        let mut state = state();
        state.advance();
        let trunk = state.grove.next_standing().map(|(_, at)| at).unwrap();

        assert!(state.grab(Grip::Tool));
        state.drag(trunk, 1.0 / 60.0);
        // 1.2s of fell time, plus slack for float accumulation
        for _ in 0..80 {
            state.hold(1.0 / 60.0);
        }
        assert!(state.grove.trees[0].felled);
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::MaterialYielded { .. }))
        );
    }

    #[test]
    fn test_hold_only_chops_while_captured() {
        let mut state = state();
        state.advance();
        let trunk = state.grove.next_standing().map(|(_, at)| at).unwrap();
        state.grab(Grip::Tool);
        state.drag(trunk, 0.1);
        let before = state.grove.trees[0].progress;

        state.release();
        state.hold(0.1);
        assert_eq!(state.grove.trees[0].progress, before);
    }

    #[test]
    fn test_sapling_strike_reported_once_per_contact() {
        let mut tuning = Tuning::default();
        tuning.timber.trees = vec![glam::Vec2::ZERO];
        tuning.timber.saplings = vec![glam::Vec2::new(0.35, 0.0)];
        let mut state = WorkshopState::new(4, tuning).unwrap();
        state.advance();
        state.drain_events();

        let strikes = |events: &[GameEvent]| {
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::SaplingStruck { .. }))
                .count()
        };

        state.grab(Grip::Tool);
        let sapling = Vec3::new(0.3, 0.5, 0.0);
        state.drag(sapling, 0.1);
        for _ in 0..10 {
            state.hold(0.1);
        }
        assert_eq!(strikes(&state.drain_events()), 1);
        assert_eq!(state.grove.trees[0].progress, 0.0);

        // Away and back is a second strike
        state.drag(Vec3::new(-0.2, 0.5, 0.0), 0.1);
        state.drag(sapling, 0.1);
        assert_eq!(strikes(&state.drain_events()), 1);
    }

    #[test]
    fn test_reached_follows_project_order() {
        let mut state = state();
        assert!(state.reached(Phase::Intro));
        assert!(!state.reached(Phase::Marking));
        state.phase = Phase::Cutting;
        assert!(state.reached(Phase::Marking));
        assert!(!state.reached(Phase::AssemblyD));

        state.start_project(Project::Stool);
        assert!(!state.reached(Phase::Timber));
    }
}
