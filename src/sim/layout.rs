//! Joint and seat geometry
//!
//! Pure functions of the tuning constants. The simulation hit-tests against
//! these shapes and the renderer builds its meshes from the same numbers, so
//! identical inputs must always give identical output.
//!
//! Board cross-sections live in the face plane (x along the board width,
//! y up the joint). Drill holes live on the ground plane (x, z).

use glam::Vec2;
use serde::Serialize;
use thiserror::Error;

use crate::tuning::{JointTuning, StoolTuning};

/// Static authoring mistakes caught when the layout is built
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("board width must be positive, got {0}")]
    BoardWidth(f32),
    #[error("board height must be positive, got {0}")]
    BoardHeight(f32),
    #[error("at least one tail is required")]
    NoTails,
    #[error("tail width ratio must be positive, got {0}")]
    TailRatio(f32),
    #[error("tails take {ratio} of the board width, leaving no room for pins")]
    DegeneratePins { ratio: f32 },
    #[error("flare {flare} must be smaller than both pin width {pin_width} and tail width {tail_width}")]
    FlareTooWide {
        flare: f32,
        pin_width: f32,
        tail_width: f32,
    },
    #[error("hole inset {inset} leaves no room on a seat of radius {seat_radius}")]
    HoleOutsideSeat { seat_radius: f32, inset: f32 },
}

/// X coordinates of the tail centres, left to right.
///
/// `tail_width_ratio` is the share of the board width taken by all tails
/// together; the rest is split evenly between `tail_count + 1` pins (the two
/// outer half-pins count as full pins here).
pub fn compute_tail_centers(
    board_width: f32,
    tail_count: usize,
    tail_width_ratio: f32,
) -> Result<Vec<f32>, LayoutError> {
    let (tail_width, pin_width) = tail_and_pin_width(board_width, tail_count, tail_width_ratio)?;
    let pitch = tail_width + pin_width;
    let half_span = pitch * (tail_count - 1) as f32 / 2.0;

    Ok((0..tail_count)
        .map(|i| i as f32 * pitch - half_span)
        .collect())
}

fn tail_and_pin_width(
    board_width: f32,
    tail_count: usize,
    tail_width_ratio: f32,
) -> Result<(f32, f32), LayoutError> {
    if !(board_width > 0.0) {
        return Err(LayoutError::BoardWidth(board_width));
    }
    if tail_count == 0 {
        return Err(LayoutError::NoTails);
    }
    if !(tail_width_ratio > 0.0) {
        return Err(LayoutError::TailRatio(tail_width_ratio));
    }
    if tail_width_ratio * board_width >= board_width {
        return Err(LayoutError::DegeneratePins {
            ratio: tail_width_ratio,
        });
    }

    let tail_width = tail_width_ratio * board_width / tail_count as f32;
    let pin_width = (board_width - tail_count as f32 * tail_width) / (tail_count + 1) as f32;
    Ok((tail_width, pin_width))
}

/// Four drill holes on the seat diagonals, one per quadrant:
/// (+x,+z), (-x,+z), (-x,-z), (+x,-z).
pub fn drill_hole_centers(seat_radius: f32, inset: f32) -> Result<Vec<Vec2>, LayoutError> {
    if !(inset >= 0.0) || inset >= seat_radius {
        return Err(LayoutError::HoleOutsideSeat { seat_radius, inset });
    }
    let r = (seat_radius - inset) * std::f32::consts::FRAC_1_SQRT_2;
    Ok(vec![
        Vec2::new(r, r),
        Vec2::new(-r, r),
        Vec2::new(-r, -r),
        Vec2::new(r, -r),
    ])
}

/// Complete dovetail layout for one corner joint
#[derive(Debug, Clone, Serialize)]
pub struct JointLayout {
    pub board_width: f32,
    /// Length of the tails (y extent of the joint)
    pub board_height: f32,
    /// Mid-height width of one tail
    pub tail_width: f32,
    pub pin_width: f32,
    /// Extra width at the tail end over the tail base
    pub flare: f32,
    pub tail_centers: Vec<f32>,
}

impl JointLayout {
    pub fn new(
        board_width: f32,
        board_height: f32,
        tail_count: usize,
        tail_width_ratio: f32,
        flare: f32,
    ) -> Result<Self, LayoutError> {
        let (tail_width, pin_width) = tail_and_pin_width(board_width, tail_count, tail_width_ratio)?;
        if !(board_height > 0.0) {
            return Err(LayoutError::BoardHeight(board_height));
        }
        if !(flare >= 0.0) || flare >= pin_width || flare >= tail_width {
            return Err(LayoutError::FlareTooWide {
                flare,
                pin_width,
                tail_width,
            });
        }

        Ok(Self {
            board_width,
            board_height,
            tail_width,
            pin_width,
            flare,
            tail_centers: compute_tail_centers(board_width, tail_count, tail_width_ratio)?,
        })
    }

    pub fn from_tuning(tuning: &JointTuning) -> Result<Self, LayoutError> {
        Self::new(
            tuning.board_width,
            tuning.board_height,
            tuning.tail_count,
            tuning.tail_width_ratio,
            tuning.flare,
        )
    }

    /// Centre-to-centre distance between neighbouring tails
    pub fn pitch(&self) -> f32 {
        self.tail_width + self.pin_width
    }

    /// Half-widths of a tail at its base (y = 0) and at its end (y = height)
    fn tail_half_widths(&self) -> (f32, f32) {
        let base = (self.tail_width - self.flare) / 2.0;
        let end = (self.tail_width + self.flare) / 2.0;
        (base, end)
    }

    /// One trapezoid per tail, counter-clockwise. These are the sockets the
    /// chisel clears out of the pin board.
    pub fn socket_regions(&self) -> Vec<Vec<Vec2>> {
        let (base, end) = self.tail_half_widths();
        let h = self.board_height;
        self.tail_centers
            .iter()
            .map(|&c| {
                vec![
                    Vec2::new(c - base, 0.0),
                    Vec2::new(c + base, 0.0),
                    Vec2::new(c + end, h),
                    Vec2::new(c - end, h),
                ]
            })
            .collect()
    }

    /// Tail board cross-section: a body below y = 0 with the tails standing
    /// up to y = height. Counter-clockwise.
    pub fn tail_board_profile(&self) -> Vec<Vec2> {
        let (base, end) = self.tail_half_widths();
        let half = self.board_width / 2.0;
        let h = self.board_height;

        let mut poly = vec![
            Vec2::new(-half, -h),
            Vec2::new(half, -h),
            Vec2::new(half, 0.0),
        ];
        for &c in self.tail_centers.iter().rev() {
            poly.push(Vec2::new(c + base, 0.0));
            poly.push(Vec2::new(c + end, h));
            poly.push(Vec2::new(c - end, h));
            poly.push(Vec2::new(c - base, 0.0));
        }
        poly.push(Vec2::new(-half, 0.0));
        poly
    }

    /// Pin board cross-section: a body above y = height with pins reaching
    /// down to y = 0 between the sockets. Counter-clockwise.
    pub fn pin_board_profile(&self) -> Vec<Vec2> {
        let (base, end) = self.tail_half_widths();
        let half = self.board_width / 2.0;
        let h = self.board_height;

        let mut poly = vec![Vec2::new(-half, 2.0 * h), Vec2::new(-half, 0.0)];
        for &c in &self.tail_centers {
            poly.push(Vec2::new(c - base, 0.0));
            poly.push(Vec2::new(c - end, h));
            poly.push(Vec2::new(c + end, h));
            poly.push(Vec2::new(c + base, 0.0));
        }
        poly.push(Vec2::new(half, 0.0));
        poly.push(Vec2::new(half, 2.0 * h));
        poly
    }
}

/// Layout of the stool seat
#[derive(Debug, Clone, Serialize)]
pub struct SeatLayout {
    pub seat_radius: f32,
    pub holes: Vec<Vec2>,
}

impl SeatLayout {
    pub fn from_tuning(tuning: &StoolTuning) -> Result<Self, LayoutError> {
        Ok(Self {
            seat_radius: tuning.seat_radius,
            holes: drill_hole_centers(tuning.seat_radius, tuning.hole_inset)?,
        })
    }
}

/// Even-odd point-in-polygon test
pub fn polygon_contains(poly: &[Vec2], point: Vec2) -> bool {
    if poly.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (a, b) = (poly[i], poly[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let cross_x = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Vertex average; inside any convex polygon
pub fn centroid(poly: &[Vec2]) -> Vec2 {
    if poly.is_empty() {
        return Vec2::ZERO;
    }
    poly.iter().copied().sum::<Vec2>() / poly.len() as f32
}
