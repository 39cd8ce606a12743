//! Session record
//!
//! Counts harvested material and the pieces finished so far. Lives only as
//! long as the page; nothing is stored.

use serde::Serialize;

use crate::sim::{GameEvent, Material, Project};

/// One finished piece
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CraftedItem {
    pub project: Project,
    /// 1-based order of completion
    pub number: usize,
}

/// Raw material counters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Inventory {
    pub logs: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Session {
    pub inventory: Inventory,
    pub crafted: Vec<CraftedItem>,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one workshop event into the record
    pub fn apply(&mut self, event: &GameEvent) {
        match event {
            GameEvent::MaterialYielded {
                material: Material::Log,
                amount,
            } => {
                self.inventory.logs = self.inventory.logs.saturating_add(*amount);
            }
            GameEvent::ProjectCompleted { project } => {
                let item = CraftedItem {
                    project: *project,
                    number: self.crafted.len() + 1,
                };
                log::info!("Crafted {} #{}", project.label(), item.number);
                self.crafted.push(item);
            }
            _ => {}
        }
    }

    /// Pieces of one kind finished so far
    pub fn crafted_count(&self, project: Project) -> usize {
        self.crafted.iter().filter(|c| c.project == project).count()
    }

    pub fn is_empty(&self) -> bool {
        self.crafted.is_empty() && self.inventory.logs == 0
    }

    /// Most recently finished piece
    pub fn latest(&self) -> Option<&CraftedItem> {
        self.crafted.last()
    }

    /// Project to start after collecting `current`
    pub fn next_project(&self, current: Project) -> Project {
        current.following()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_update_record() {
        let mut session = Session::new();
        assert!(session.is_empty());

        session.apply(&GameEvent::MaterialYielded {
            material: Material::Log,
            amount: 2,
        });
        session.apply(&GameEvent::MaterialYielded {
            material: Material::Log,
            amount: 2,
        });
        session.apply(&GameEvent::OrbitControls { enabled: false });
        session.apply(&GameEvent::ProjectCompleted {
            project: Project::Box,
        });
        session.apply(&GameEvent::ProjectCompleted {
            project: Project::Stool,
        });

        assert_eq!(session.inventory.logs, 4);
        assert_eq!(session.crafted_count(Project::Box), 1);
        assert_eq!(session.crafted_count(Project::Stool), 1);
        assert_eq!(
            session.latest(),
            Some(&CraftedItem {
                project: Project::Stool,
                number: 2
            })
        );
    }

    #[test]
    fn test_next_project_alternates() {
        let session = Session::new();
        assert_eq!(session.next_project(Project::Box), Project::Stool);
        assert_eq!(session.next_project(Project::Stool), Project::Box);
    }
}
