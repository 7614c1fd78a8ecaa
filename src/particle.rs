use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Distance below which a particle starts braking toward its target.
pub const CLOSE_ENOUGH: f32 = 100.0;

/// Sampling rectangle for off-scene directions. Directions are drawn from a
/// fixed rectangle rather than the viewport so the scatter pattern does not
/// depend on canvas size.
const DIRECTION_RECT: Vec2 = Vec2::new(1000.0, 500.0);

/// Randomized per-particle attribute ranges. Attributes are rolled once at
/// creation and persist across word transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticleTuning {
    pub speed_min: f32,
    pub speed_max: f32,
    /// `max_force = force_scale * max_speed`.
    pub force_scale: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub blend_rate_min: f32,
    pub blend_rate_max: f32,
}

impl Default for ParticleTuning {
    fn default() -> Self {
        Self {
            speed_min: 4.0,
            speed_max: 10.0,
            force_scale: 0.05,
            size_min: 6.0,
            size_max: 12.0,
            blend_rate_min: 0.0025,
            blend_rate_max: 0.03,
        }
    }
}

/// One steerable point of the swarm.
///
/// A particle is either alive with an on-canvas target, or killed with an
/// off-canvas target; killed particles stay in the pool until they leave the
/// visible bounds.
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    pub target: Vec2,

    pub max_speed: f32,
    pub max_force: f32,
    pub size: f32,
    pub is_killed: bool,

    pub start_color: Rgb,
    pub target_color: Rgb,
    pub color_weight: f32,
    pub color_blend_rate: f32,
}

impl Particle {
    /// Create a particle at an off-scene point with randomized attributes.
    pub fn spawn<R: Rng>(rng: &mut R, viewport: Vec2, tuning: &ParticleTuning) -> Self {
        let pos = random_offscene_point(
            rng,
            viewport * 0.5,
            (viewport.x + viewport.y) * 0.5,
        );
        let max_speed = rng.gen_range(tuning.speed_min..tuning.speed_max);

        Self {
            pos,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            target: pos,
            max_speed,
            max_force: max_speed * tuning.force_scale,
            size: rng.gen_range(tuning.size_min..tuning.size_max),
            is_killed: false,
            start_color: Rgb::BLACK,
            target_color: Rgb::BLACK,
            color_weight: 0.0,
            color_blend_rate: rng.gen_range(tuning.blend_rate_min..tuning.blend_rate_max),
        }
    }

    /// One frame of arrive/seek steering: a bounded force toward the target,
    /// with the desired speed scaled down inside [`CLOSE_ENOUGH`] so the
    /// particle settles instead of oscillating past its target.
    pub fn step(&mut self) {
        let towards = self.target - self.pos;
        let distance = towards.length();

        let proximity = if distance < CLOSE_ENOUGH {
            distance / CLOSE_ENOUGH
        } else {
            1.0
        };

        // Zero-length vectors skip normalization entirely.
        let desired = if distance > 0.0 {
            towards / distance * self.max_speed * proximity
        } else {
            Vec2::ZERO
        };

        let steer = desired - self.vel;
        let steer_mag = steer.length();
        let steer = if steer_mag > 0.0 {
            steer / steer_mag * self.max_force
        } else {
            Vec2::ZERO
        };

        self.acc += steer;
        self.vel += self.acc;
        self.pos += self.vel;
        self.acc = Vec2::ZERO;
    }

    /// Send the particle toward a random off-canvas point and start fading it
    /// to black. No-op if the particle is already killed.
    pub fn kill<R: Rng>(&mut self, rng: &mut R, viewport: Vec2) {
        if self.is_killed {
            return;
        }

        self.target = random_offscene_point(
            rng,
            viewport * 0.5,
            (viewport.x + viewport.y) * 0.5,
        );
        self.start_color = self.blended_color();
        self.target_color = Rgb::BLACK;
        self.color_weight = 0.0;
        self.is_killed = true;
    }

    /// Reassign the particle to an on-canvas target with a fresh color
    /// transition, reviving it if it was killed.
    pub fn retarget(&mut self, target: Vec2, color: Rgb) {
        self.start_color = self.blended_color();
        self.target_color = color;
        self.color_weight = 0.0;
        self.target = target;
        self.is_killed = false;
    }

    /// Advance the color transition by one draw call.
    pub fn advance_blend(&mut self) {
        if self.color_weight < 1.0 {
            self.color_weight = (self.color_weight + self.color_blend_rate).min(1.0);
        }
    }

    /// Current interpolated color.
    pub fn blended_color(&self) -> Rgb {
        self.start_color.lerp(self.target_color, self.color_weight)
    }
}

/// Pick a point at distance `mag` from `center`, in a direction drawn from a
/// fixed sampling rectangle. With `mag` larger than the canvas half-diagonal
/// this lands outside the visible bounds in a varied direction.
pub fn random_offscene_point<R: Rng>(rng: &mut R, center: Vec2, mag: f32) -> Vec2 {
    let sample = Vec2::new(
        rng.gen::<f32>() * DIRECTION_RECT.x,
        rng.gen::<f32>() * DIRECTION_RECT.y,
    );

    let direction = sample - center;
    let len = direction.length();
    if len > 0.0 {
        center + direction / len * mag
    } else {
        center
    }
}
