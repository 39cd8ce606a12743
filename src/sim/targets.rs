//! Cut targets and tool hit-testing
//!
//! A drag gesture supplies one tool position per tick. Each not-yet-complete
//! target whose zone contains that position flips to complete, once, and is
//! reported so the caller can throw sawdust from its anchor.

use glam::{Vec2, Vec3};
use serde::Serialize;

use super::layout::{centroid, polygon_contains};
use crate::{face, ground};

/// Hit zone of a target; each variant looks at a different projection of the
/// tool position
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Zone {
    /// Band across the board width; only the tool's x matters
    Span { x: f32, radius: f32 },
    /// Circle on the ground plane (x, z)
    Disc { center: Vec2, radius: f32 },
    /// Polygon on the board face (x, y)
    Region { polygon: Vec<Vec2> },
    /// Only completed by clicking
    Button,
}

impl Zone {
    pub fn contains(&self, tool: Vec3) -> bool {
        match self {
            Zone::Span { x, radius } => (tool.x - x).abs() < *radius,
            Zone::Disc { center, radius } => ground(tool).distance(*center) < *radius,
            Zone::Region { polygon } => polygon_contains(polygon, face(tool)),
            Zone::Button => false,
        }
    }
}

/// One zone that must be hit to register progress
#[derive(Debug, Clone, Serialize)]
pub struct CutTarget {
    pub zone: Zone,
    /// World position debris and effects come from
    pub anchor: Vec3,
}

/// Result of feeding one tool position to a target set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sweep {
    /// Newly completed targets: (index, anchor)
    pub hits: Vec<(usize, Vec3)>,
    /// True only on the call that completed the last target
    pub finished: bool,
}

/// Targets of one phase with their completion flags
#[derive(Debug, Clone, Default, Serialize)]
pub struct TargetSet {
    targets: Vec<CutTarget>,
    completed: Vec<bool>,
}

impl TargetSet {
    pub fn new(targets: Vec<CutTarget>) -> Self {
        let completed = vec![false; targets.len()];
        Self { targets, completed }
    }

    /// x-only targets along a board edge at height `y`
    pub fn spans(centers: &[f32], radius: f32, y: f32) -> Self {
        Self::new(
            centers
                .iter()
                .map(|&x| CutTarget {
                    zone: Zone::Span { x, radius },
                    anchor: Vec3::new(x, y, 0.0),
                })
                .collect(),
        )
    }

    /// Ground-plane discs at height `y`
    pub fn discs(centers: &[Vec2], radius: f32, y: f32) -> Self {
        Self::new(
            centers
                .iter()
                .map(|&center| CutTarget {
                    zone: Zone::Disc { center, radius },
                    anchor: Vec3::new(center.x, y, center.y),
                })
                .collect(),
        )
    }

    /// Face-plane polygons, anchored at their centroids
    pub fn regions(polygons: Vec<Vec<Vec2>>) -> Self {
        Self::new(
            polygons
                .into_iter()
                .map(|polygon| {
                    let c = centroid(&polygon);
                    CutTarget {
                        zone: Zone::Region { polygon },
                        anchor: Vec3::new(c.x, c.y, 0.0),
                    }
                })
                .collect(),
        )
    }

    /// Click-only targets
    pub fn buttons(anchors: &[Vec3]) -> Self {
        Self::new(
            anchors
                .iter()
                .map(|&anchor| CutTarget {
                    zone: Zone::Button,
                    anchor,
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn targets(&self) -> &[CutTarget] {
        &self.targets
    }

    pub fn completed(&self) -> &[bool] {
        &self.completed
    }

    pub fn completed_count(&self) -> usize {
        self.completed.iter().filter(|&&c| c).count()
    }

    pub fn is_complete(&self) -> bool {
        self.completed.iter().all(|&c| c)
    }

    /// Fraction of targets complete (1.0 for an empty set)
    pub fn progress(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.completed_count() as f32 / self.len() as f32
        }
    }

    /// First target not yet complete
    pub fn next_open(&self) -> Option<(usize, &CutTarget)> {
        self.targets
            .iter()
            .enumerate()
            .find(|(i, _)| !self.completed[*i])
    }

    pub fn reset(&mut self) {
        self.completed.fill(false);
    }

    /// Complete every open target containing `tool`
    pub fn sweep(&mut self, tool: Vec3) -> Sweep {
        let mut sweep = Sweep::default();
        for (i, target) in self.targets.iter().enumerate() {
            if !self.completed[i] && target.zone.contains(tool) {
                self.completed[i] = true;
                sweep.hits.push((i, target.anchor));
            }
        }
        sweep.finished = !sweep.hits.is_empty() && self.is_complete();
        sweep
    }

    /// Complete one target directly (clicks). Out-of-range or already
    /// complete indices are ignored.
    pub fn mark(&mut self, index: usize) -> Sweep {
        let mut sweep = Sweep::default();
        if let Some(done) = self.completed.get_mut(index) {
            if !*done {
                *done = true;
                sweep.hits.push((index, self.targets[index].anchor));
                sweep.finished = self.is_complete();
            }
        }
        sweep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_set() -> TargetSet {
        TargetSet::spans(&[-0.75, -0.25, 0.25, 0.75], 0.2, 0.5)
    }

    /// All orderings of 0..n
    fn permutations(n: usize) -> Vec<Vec<usize>> {
        if n == 0 {
            return vec![Vec::new()];
        }
        let mut out = Vec::new();
        for rest in permutations(n - 1) {
            for slot in 0..=rest.len() {
                let mut p = rest.clone();
                p.insert(slot, n - 1);
                out.push(p);
            }
        }
        out
    }

    #[test]
    fn test_continuous_sweep_hits_in_order() {
        let mut set = scenario_set();
        let mut hits = Vec::new();
        let mut finished = 0;

        for step in 0..=200 {
            let x = -1.0 + step as f32 * 0.01;
            let sweep = set.sweep(Vec3::new(x, 0.5, 0.0));
            if sweep.finished {
                finished += 1;
                assert_eq!(hits.len() + sweep.hits.len(), 4);
            }
            hits.extend(sweep.hits);
        }

        assert_eq!(hits.len(), 4);
        assert_eq!(
            hits.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        for pair in hits.windows(2) {
            assert!(pair[0].1.x < pair[1].1.x);
        }
        assert_eq!(finished, 1);
        assert!(set.is_complete());
    }

    #[test]
    fn test_completion_is_monotonic() {
        let mut set = scenario_set();
        assert_eq!(set.sweep(Vec3::new(-0.75, 0.0, 0.0)).hits.len(), 1);

        // Away and back again
        assert!(set.sweep(Vec3::new(5.0, 0.0, 0.0)).hits.is_empty());
        assert!(set.completed()[0]);
        let again = set.sweep(Vec3::new(-0.75, 0.0, 0.0));
        assert!(again.hits.is_empty());
        assert!(!again.finished);
        assert!(set.completed()[0]);
    }

    #[test]
    fn test_finish_fires_once_for_every_order() {
        let centers = [-0.75, -0.25, 0.25, 0.75];
        let orders = permutations(4);
        assert_eq!(orders.len(), 24);

        for order in orders {
            let mut set = scenario_set();
            let mut finished = 0;
            for (n, &i) in order.iter().enumerate() {
                let sweep = set.sweep(Vec3::new(centers[i], 0.0, 0.0));
                assert_eq!(sweep.hits.len(), 1);
                if sweep.finished {
                    finished += 1;
                    assert_eq!(n, 3, "finished early for {order:?}");
                }
                // Repeat hit is a no-op
                assert!(!set.sweep(Vec3::new(centers[i], 0.0, 0.0)).finished);
            }
            assert_eq!(finished, 1, "order {order:?}");
        }
    }

    #[test]
    fn test_disc_uses_ground_plane() {
        let mut set = TargetSet::discs(&[Vec2::new(0.3, 0.3)], 0.25, 0.9);
        // Right x, wrong z
        assert!(set.sweep(Vec3::new(0.3, 0.9, -0.3)).hits.is_empty());
        // Height is ignored
        let sweep = set.sweep(Vec3::new(0.35, 5.0, 0.25));
        assert_eq!(sweep.hits, vec![(0, Vec3::new(0.3, 0.9, 0.3))]);
        assert!(sweep.finished);
    }

    #[test]
    fn test_region_uses_face_plane() {
        let square = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let mut set = TargetSet::regions(vec![square]);
        assert_eq!(set.targets()[0].anchor, Vec3::new(0.5, 0.5, 0.0));
        assert!(set.sweep(Vec3::new(0.5, 1.5, 0.0)).hits.is_empty());
        assert!(set.sweep(Vec3::new(0.5, 0.5, 9.0)).finished);
    }

    #[test]
    fn test_buttons_only_complete_by_mark() {
        let mut set = TargetSet::buttons(&[Vec3::ZERO, Vec3::X]);
        assert!(set.sweep(Vec3::ZERO).hits.is_empty());

        assert!(!set.mark(1).finished);
        assert!(set.mark(1).hits.is_empty());
        assert!(set.mark(7).hits.is_empty());
        assert!(set.mark(0).finished);
        assert_eq!(set.progress(), 1.0);

        set.reset();
        assert_eq!(set.completed(), &[false, false]);
        assert_eq!(set.next_open().map(|(i, _)| i), Some(0));
    }
}
