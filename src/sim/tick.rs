//! Per-frame simulation tick
//!
//! Applies one frame of pointer and HUD intents, then advances scheduled
//! phase changes and particles.

use glam::Vec3;

use super::assembly::AssemblyState;
use super::phase::{Activity, Project};
use super::state::{Gesture, Grip, WorkshopState};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer went down on the tool or the part
    pub grab: Option<Grip>,
    /// Pointer position in world space
    pub pointer: Option<Vec3>,
    /// Pointer up or cancel
    pub release: bool,
    /// Hammer click
    pub tap: bool,
    /// Click on a click-only target
    pub click: Option<usize>,
    /// HUD "next"
    pub advance: bool,
    /// HUD "collect", with the project to start next
    pub collect: Option<Project>,
    /// Idle/demo mode - the workshop builds by itself
    pub idle_mode: bool,
}

/// Advance the workshop by one frame
pub fn tick(state: &mut WorkshopState, input: &TickInput, dt: f32) {
    let dt = dt.clamp(0.0, state.tuning.max_dt);

    let mut input = input.clone();
    if input.idle_mode {
        input = TickInput {
            idle_mode: true,
            ..idle_input(state)
        };
    }

    if let Some(next) = input.collect {
        state.collect(next);
    }
    if input.advance {
        state.advance();
    }
    if let Some(grip) = input.grab {
        state.grab(grip);
    }
    match input.pointer {
        Some(pos) => state.drag(pos, dt),
        None => state.hold(dt),
    }
    if let Some(index) = input.click {
        state.click_target(index);
    }
    if input.tap {
        state.tap();
    }
    if input.release {
        state.release();
    }

    state.update(dt);
}

/// What a patient woodworker would do this frame
fn idle_input(state: &WorkshopState) -> TickInput {
    let mut input = TickInput::default();

    // Phase done: put the tool down and wait for the advance
    if state.pending.is_some() {
        input.release = state.gesture != Gesture::Idle;
        return input;
    }

    let hold = |input: &mut TickInput, grip: Grip, at: Vec3| {
        if state.gesture == Gesture::Idle {
            input.grab = Some(grip);
        }
        input.pointer = Some(at);
    };

    match state.activity() {
        Some(Activity::Manual) => input.advance = true,
        Some(Activity::Celebrate) => input.collect = Some(state.project.following()),
        Some(Activity::Clamp) => {
            input.click = state.active_targets().and_then(|t| t.next_open()).map(|(i, _)| i);
        }
        Some(Activity::Harvest) => {
            if let Some((_, at)) = state.grove.next_standing() {
                hold(&mut input, Grip::Tool, at);
            }
        }
        Some(Activity::Mark | Activity::Saw | Activity::Chisel | Activity::Drill) => {
            if let Some((_, target)) = state.active_targets().and_then(|t| t.next_open()) {
                hold(&mut input, Grip::Tool, target.anchor);
            }
        }
        Some(Activity::Assemble) => {
            if let Some(assembly) = state.assembly() {
                match assembly.state {
                    AssemblyState::Dragging => {
                        hold(&mut input, Grip::Part, Vec3::new(0.0, assembly.pre_seated(), 0.0));
                    }
                    AssemblyState::Hammering { .. } => {
                        input.release = state.gesture != Gesture::Idle;
                        input.tap = true;
                    }
                    AssemblyState::Done => {}
                }
            }
        }
        None => {}
    }
    input
}
