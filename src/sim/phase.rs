//! Project phase tables
//!
//! Each project runs a fixed, forward-only sequence of phases. The only way
//! back is SUCCESS -> INTRO through an explicit collect.

use serde::{Deserialize, Serialize};

/// What the player is building
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Project {
    /// Dovetail box
    Box,
    Stool,
}

/// A named stage of the crafting sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Intro,
    Timber,
    Clamping,
    Marking,
    Cutting,
    AssemblyPrep,
    Assembly,
    CuttingBack,
    AssemblyC,
    CuttingTop,
    AssemblyD,
    Success,
}

/// How the player interacts during a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Waiting for the HUD's advance button
    Manual,
    /// Chop trees, avoid saplings
    Harvest,
    /// Click each clamp
    Clamp,
    /// Pencil along the tail positions
    Mark,
    /// Saw each tail
    Saw,
    /// Clear each socket from the pin board
    Chisel,
    /// Drill each leg hole
    Drill,
    /// Drag a part into place, then hammer it home
    Assemble,
    /// Finished; waiting for collect
    Celebrate,
}

impl Activity {
    /// Whether the tool can be picked up during this activity
    pub fn accepts_tool(self) -> bool {
        matches!(
            self,
            Activity::Harvest | Activity::Mark | Activity::Saw | Activity::Chisel | Activity::Drill
        )
    }

    /// Whether completing a target throws debris
    pub fn sheds_debris(self) -> bool {
        matches!(
            self,
            Activity::Harvest | Activity::Saw | Activity::Chisel | Activity::Drill
        )
    }
}

const BOX_PHASES: [Phase; 12] = [
    Phase::Intro,
    Phase::Timber,
    Phase::Clamping,
    Phase::Marking,
    Phase::Cutting,
    Phase::AssemblyPrep,
    Phase::Assembly,
    Phase::CuttingBack,
    Phase::AssemblyC,
    Phase::CuttingTop,
    Phase::AssemblyD,
    Phase::Success,
];

const STOOL_PHASES: [Phase; 5] = [
    Phase::Intro,
    Phase::Clamping,
    Phase::Cutting,
    Phase::Assembly,
    Phase::Success,
];

impl Project {
    /// Ordered phase sequence
    pub fn phases(self) -> &'static [Phase] {
        match self {
            Project::Box => &BOX_PHASES,
            Project::Stool => &STOOL_PHASES,
        }
    }

    pub fn contains(self, phase: Phase) -> bool {
        self.phases().contains(&phase)
    }

    /// Phase after `phase`, or None at SUCCESS or for a phase this project lacks
    pub fn next(self, phase: Phase) -> Option<Phase> {
        let phases = self.phases();
        let idx = phases.iter().position(|&p| p == phase)?;
        phases.get(idx + 1).copied()
    }

    /// First phase after INTRO
    pub fn first_working_phase(self) -> Phase {
        self.phases()[1]
    }

    /// Project offered after this one is collected
    pub fn following(self) -> Project {
        match self {
            Project::Box => Project::Stool,
            Project::Stool => Project::Box,
        }
    }

    pub fn activity(self, phase: Phase) -> Option<Activity> {
        if !self.contains(phase) {
            return None;
        }
        let activity = match (self, phase) {
            (_, Phase::Intro) => Activity::Manual,
            (_, Phase::Success) => Activity::Celebrate,
            (_, Phase::Timber) => Activity::Harvest,
            (_, Phase::Clamping) => Activity::Clamp,
            (_, Phase::Marking) => Activity::Mark,
            (Project::Stool, Phase::Cutting) => Activity::Drill,
            (_, Phase::Cutting | Phase::CuttingBack | Phase::CuttingTop) => Activity::Saw,
            (_, Phase::AssemblyPrep) => Activity::Chisel,
            (_, Phase::Assembly | Phase::AssemblyC | Phase::AssemblyD) => Activity::Assemble,
        };
        Some(activity)
    }

    pub fn label(self) -> &'static str {
        match self {
            Project::Box => "Dovetail Box",
            Project::Stool => "Stool",
        }
    }

    /// HUD instruction for a phase
    pub fn instruction(self, phase: Phase) -> &'static str {
        match (self, phase) {
            (Project::Box, Phase::Intro) => "Build a dovetail box. Start by gathering timber.",
            (Project::Stool, Phase::Intro) => "Build a four-legged stool. Clamp the seat blank first.",
            (_, Phase::Timber) => "Drag the axe into the big trees. Mind the saplings!",
            (_, Phase::Clamping) => "Click each clamp to lock the workpiece down.",
            (_, Phase::Marking) => "Drag the pencil across the board to mark the tails.",
            (Project::Stool, Phase::Cutting) => "Drag the drill over each leg hole.",
            (_, Phase::Cutting) => "Saw along each marked tail.",
            (_, Phase::AssemblyPrep) => "Chisel out each socket in the pin board.",
            (Project::Stool, Phase::Assembly) => "Lower the seat onto the legs, then hammer it home.",
            (_, Phase::Assembly | Phase::AssemblyC | Phase::AssemblyD) => {
                "Drag the board into the joint, then hammer it home."
            }
            (_, Phase::CuttingBack) => "Saw the tails on the back board.",
            (_, Phase::CuttingTop) => "Saw the tails on the top board.",
            (_, Phase::Success) => "Done! Collect your work.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_are_forward_only() {
        for project in [Project::Box, Project::Stool] {
            let phases = project.phases();
            assert_eq!(phases.first(), Some(&Phase::Intro));
            assert_eq!(phases.last(), Some(&Phase::Success));
            for pair in phases.windows(2) {
                assert_eq!(project.next(pair[0]), Some(pair[1]));
            }
            assert_eq!(project.next(Phase::Success), None);
        }
    }

    #[test]
    fn test_foreign_phase_has_no_successor() {
        assert_eq!(Project::Stool.next(Phase::Timber), None);
        assert_eq!(Project::Stool.activity(Phase::Marking), None);
        assert_eq!(Project::Box.next(Phase::Marking), Some(Phase::Cutting));
    }

    #[test]
    fn test_cutting_activity_depends_on_project() {
        assert_eq!(Project::Box.activity(Phase::Cutting), Some(Activity::Saw));
        assert_eq!(Project::Stool.activity(Phase::Cutting), Some(Activity::Drill));
        assert_eq!(Project::Box.first_working_phase(), Phase::Timber);
        assert_eq!(Project::Stool.first_working_phase(), Phase::Clamping);
    }

    #[test]
    fn test_tool_and_debris_flags() {
        assert!(Activity::Saw.accepts_tool());
        assert!(!Activity::Assemble.accepts_tool());
        assert!(Activity::Mark.accepts_tool());
        assert!(!Activity::Mark.sheds_debris());
        assert!(!Activity::Clamp.sheds_debris());
    }
}
