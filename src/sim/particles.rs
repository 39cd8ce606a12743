//! Sawdust bursts
//!
//! Fixed-size pool; nothing is allocated after construction. A burst is
//! queued and released a few particles per tick so it sprays rather than
//! pops. Particles fall under gravity, lose horizontal speed to drag, and
//! come to rest in a pile on the floor. They stay there until `clear`.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use serde::Serialize;

use crate::tuning::ParticleTuning;

/// One sawdust chip
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Particle {
    pub active: bool,
    /// Resting on the floor; no further integration
    pub piled: bool,
    pub pos: Vec3,
    pub vel: Vec3,
    /// Euler angles (radians)
    pub rot: Vec3,
    /// Angular velocity (radians/s)
    pub spin: Vec3,
    pub scale: f32,
    /// RGB
    pub color: u32,
}

/// A burst still releasing particles
#[derive(Debug, Clone, Copy)]
struct PendingBurst {
    origin: Vec3,
    remaining: usize,
}

#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    pending: Vec<PendingBurst>,
    /// Where the free-slot search starts
    cursor: usize,
    active: usize,
    tuning: ParticleTuning,
}

impl ParticlePool {
    pub fn new(tuning: &ParticleTuning) -> Self {
        Self {
            particles: vec![Particle::default(); tuning.capacity],
            pending: Vec::new(),
            cursor: 0,
            active: 0,
            tuning: tuning.clone(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn piled_count(&self) -> usize {
        self.iter_active().filter(|p| p.piled).count()
    }

    /// Bursts still spraying
    pub fn pending_bursts(&self) -> usize {
        self.pending.len()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.active)
    }

    /// Queue a burst at `origin`; it is released over the next ticks
    pub fn burst(&mut self, origin: Vec3) {
        if self.tuning.burst_size == 0 {
            return;
        }
        self.pending.push(PendingBurst {
            origin,
            remaining: self.tuning.burst_size,
        });
    }

    /// Deactivate every particle and drop queued bursts. Capacity is kept.
    pub fn clear(&mut self) {
        for p in &mut self.particles {
            p.active = false;
        }
        self.pending.clear();
        self.active = 0;
        self.cursor = 0;
    }

    /// Integrate one tick, then release this tick's share of each burst
    pub fn advance<R: Rng>(&mut self, dt: f32, max_dt: f32, rng: &mut R) {
        let dt = dt.clamp(0.0, max_dt);
        self.integrate(dt);
        self.release(rng);
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.tuning.gravity;
        let floor = self.tuning.floor_y;
        let damping = (1.0 - self.tuning.drag * dt).max(0.0);
        let shrink = self.tuning.pile_shrink;

        for p in &mut self.particles {
            if !p.active || p.piled {
                continue;
            }

            p.vel.y -= gravity * dt;
            p.vel.x *= damping;
            p.vel.z *= damping;
            p.pos += p.vel * dt;
            p.rot += p.spin * dt;

            if p.pos.y <= floor {
                p.pos.y = floor;
                p.vel = Vec3::ZERO;
                p.spin = Vec3::ZERO;
                p.scale *= shrink;
                p.piled = true;
            }
        }
    }

    fn release<R: Rng>(&mut self, rng: &mut R) {
        let per_tick = self
            .tuning
            .burst_size
            .div_ceil(self.tuning.burst_ticks.max(1) as usize);

        let mut pending = std::mem::take(&mut self.pending);
        for burst in &mut pending {
            let count = per_tick.min(burst.remaining);
            for _ in 0..count {
                // Full pool: the rest of this share is dropped
                if !self.spawn(burst.origin, rng) {
                    break;
                }
            }
            burst.remaining -= count;
        }
        pending.retain(|b| b.remaining > 0);
        self.pending = pending;
    }

    /// Claim a free slot; false when the pool is saturated
    fn spawn<R: Rng>(&mut self, origin: Vec3, rng: &mut R) -> bool {
        if self.active >= self.particles.len() {
            return false;
        }

        let len = self.particles.len();
        let Some(slot) = (0..len)
            .map(|i| (self.cursor + i) % len)
            .find(|&i| !self.particles[i].active)
        else {
            return false;
        };

        let heading = rng.random_range(0.0..TAU);
        let spread = rng.random_range(0.4..1.6);
        let lift = rng.random_range(1.5..3.5);
        let jitter = Vec3::new(
            rng.random_range(-0.03..0.03),
            rng.random_range(-0.03..0.03),
            rng.random_range(-0.03..0.03),
        );
        let palette = &self.tuning.palette;
        let color = if palette.is_empty() {
            0xFFFFFF
        } else {
            palette[rng.random_range(0..palette.len())]
        };

        self.particles[slot] = Particle {
            active: true,
            piled: false,
            pos: origin + jitter,
            vel: Vec3::new(heading.cos() * spread, lift, heading.sin() * spread),
            rot: Vec3::new(
                rng.random_range(0.0..TAU),
                rng.random_range(0.0..TAU),
                rng.random_range(0.0..TAU),
            ),
            spin: Vec3::new(
                rng.random_range(-12.0..12.0),
                rng.random_range(-12.0..12.0),
                rng.random_range(-12.0..12.0),
            ),
            scale: rng.random_range(0.015..0.04),
            color,
        };
        self.active += 1;
        self.cursor = (slot + 1) % len;
        true
    }
}
