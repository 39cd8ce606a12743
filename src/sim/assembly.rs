//! Drag-then-hammer part seating
//!
//! A part starts lifted above its slot. Dragging it down (one axis only) to
//! within tolerance of the pre-seated gap snaps it there; each hammer tap
//! then closes an equal share of the gap until it sits flush.

use serde::Serialize;

use crate::tuning::AssemblyTuning;

/// Assembly sub-state; only ever moves forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AssemblyState {
    /// Free-floating above the slot, following the pointer
    Dragging,
    /// Resting at the gap, `taps` hammer blows taken so far
    Hammering { taps: u32 },
    /// Flush
    Done,
}

/// What an accepted input did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssemblyStep {
    /// Still dragging
    Moved,
    /// Snapped to the pre-seated gap; hammering may start
    Seated,
    /// A tap landed; `remaining_gap` left above the final position
    Struck { tap: u32, remaining_gap: f32 },
    /// The final tap closed the gap
    Done,
}

#[derive(Debug, Clone, Serialize)]
pub struct Assembly {
    pub state: AssemblyState,
    /// Final resting height of the part
    pub seat_y: f32,
    /// Current height above `seat_y`
    pub offset: f32,
    gap: f32,
    tolerance: f32,
    required_taps: u32,
    lift: f32,
}

impl Assembly {
    pub fn new(seat_y: f32, tuning: &AssemblyTuning) -> Self {
        Self {
            state: AssemblyState::Dragging,
            seat_y,
            offset: tuning.lift,
            gap: tuning.gap,
            tolerance: tuning.tolerance,
            required_taps: tuning.required_taps,
            lift: tuning.lift,
        }
    }

    pub fn reset(&mut self) {
        self.state = AssemblyState::Dragging;
        self.offset = self.lift;
    }

    /// Current height of the part
    pub fn position(&self) -> f32 {
        self.seat_y + self.offset
    }

    /// Height the drag snaps to before hammering
    pub fn pre_seated(&self) -> f32 {
        self.seat_y + self.gap
    }

    pub fn gap(&self) -> f32 {
        self.gap
    }

    pub fn required_taps(&self) -> u32 {
        self.required_taps
    }

    pub fn is_done(&self) -> bool {
        self.state == AssemblyState::Done
    }

    /// Fraction of the way to flush: 0 while dragging, then one share per tap
    pub fn progress(&self) -> f32 {
        match self.state {
            AssemblyState::Dragging => 0.0,
            AssemblyState::Hammering { taps } => taps as f32 / self.required_taps as f32,
            AssemblyState::Done => 1.0,
        }
    }

    /// Follow the pointer to height `y`. The part cannot be pushed below the
    /// gap by hand. Ignored outside `Dragging`.
    pub fn drag_to(&mut self, y: f32) -> Option<AssemblyStep> {
        if self.state != AssemblyState::Dragging {
            return None;
        }

        self.offset = (y - self.seat_y).clamp(self.gap, self.lift);
        if self.offset - self.gap <= self.tolerance {
            self.offset = self.gap;
            self.state = AssemblyState::Hammering { taps: 0 };
            return Some(AssemblyStep::Seated);
        }
        Some(AssemblyStep::Moved)
    }

    /// One hammer blow. Ignored outside `Hammering`.
    pub fn tap(&mut self) -> Option<AssemblyStep> {
        let AssemblyState::Hammering { taps } = self.state else {
            return None;
        };

        let taps = taps + 1;
        if taps >= self.required_taps {
            self.offset = 0.0;
            self.state = AssemblyState::Done;
            return Some(AssemblyStep::Done);
        }

        self.offset = self.gap * (1.0 - taps as f32 / self.required_taps as f32);
        self.state = AssemblyState::Hammering { taps };
        Some(AssemblyStep::Struck {
            tap: taps,
            remaining_gap: self.offset,
        })
    }
}
