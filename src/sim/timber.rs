//! Timber harvesting
//!
//! Trees fall after a fixed amount of chopping time with the axe inside
//! their trunk radius at cutting height. Saplings are protected: an axe
//! touching one stops all progress for that tick, even if it is also in a
//! tree.

use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::ground;
use crate::tuning::TimberTuning;

#[derive(Debug, Clone, Serialize)]
pub struct Tree {
    /// Trunk centre (x, z)
    pub center: Vec2,
    /// Chop progress in 0..=1
    pub progress: f32,
    pub felled: bool,
}

/// Result of one tick of chopping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chop {
    /// Trees felled this tick: (index, point of the cut)
    pub felled: Vec<(usize, Vec3)>,
    /// A sapling was in the way
    pub blocked: bool,
    /// True only on the tick the last tree fell
    pub finished: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Grove {
    pub trees: Vec<Tree>,
    pub saplings: Vec<Vec2>,
    tree_radius: f32,
    sapling_radius: f32,
    cut_min_y: f32,
    cut_max_y: f32,
    fell_seconds: f32,
}

impl Grove {
    pub fn new(tuning: &TimberTuning) -> Self {
        Self {
            trees: tuning
                .trees
                .iter()
                .map(|&center| Tree {
                    center,
                    progress: 0.0,
                    felled: false,
                })
                .collect(),
            saplings: tuning.saplings.clone(),
            tree_radius: tuning.tree_radius,
            sapling_radius: tuning.sapling_radius,
            cut_min_y: tuning.cut_min_y,
            cut_max_y: tuning.cut_max_y,
            fell_seconds: tuning.fell_seconds,
        }
    }

    pub fn reset(&mut self) {
        for tree in &mut self.trees {
            tree.progress = 0.0;
            tree.felled = false;
        }
    }

    pub fn felled_count(&self) -> usize {
        self.trees.iter().filter(|t| t.felled).count()
    }

    pub fn is_cleared(&self) -> bool {
        self.trees.iter().all(|t| t.felled)
    }

    /// Average chop progress over all trees
    pub fn progress(&self) -> f32 {
        if self.trees.is_empty() {
            return 1.0;
        }
        self.trees.iter().map(|t| t.progress).sum::<f32>() / self.trees.len() as f32
    }

    /// Axe height counts as a cut
    pub fn at_cutting_height(&self, tool: Vec3) -> bool {
        tool.y >= self.cut_min_y && tool.y <= self.cut_max_y
    }

    /// Axe touches a protected sapling
    pub fn hits_sapling(&self, tool: Vec3) -> bool {
        let at = ground(tool);
        self.saplings
            .iter()
            .any(|s| s.distance(at) < self.sapling_radius)
    }

    /// A good place to swing at the first standing tree
    pub fn next_standing(&self) -> Option<(usize, Vec3)> {
        let y = (self.cut_min_y + self.cut_max_y) / 2.0;
        self.trees
            .iter()
            .position(|t| !t.felled)
            .map(|i| {
                let c = self.trees[i].center;
                (i, Vec3::new(c.x, y, c.y))
            })
    }

    /// Advance chopping for one tick with the axe at `tool`
    pub fn chop(&mut self, tool: Vec3, dt: f32) -> Chop {
        let mut chop = Chop::default();
        if !self.at_cutting_height(tool) {
            return chop;
        }
        if self.hits_sapling(tool) {
            chop.blocked = true;
            return chop;
        }

        let at = ground(tool);
        let step = dt / self.fell_seconds;
        for (i, tree) in self.trees.iter_mut().enumerate() {
            if tree.felled || tree.center.distance(at) >= self.tree_radius {
                continue;
            }
            tree.progress = (tree.progress + step).min(1.0);
            if tree.progress >= 1.0 {
                tree.felled = true;
                chop.felled.push((i, Vec3::new(tree.center.x, tool.y, tree.center.y)));
            }
        }
        chop.finished = !chop.felled.is_empty() && self.is_cleared();
        chop
    }
}
