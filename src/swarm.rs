use std::collections::HashMap;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::glyph;
use crate::particle::{Particle, ParticleTuning};
use crate::theme::ThemeTable;

/// GPU-aligned draw instance (16-byte aligned), shared by particles and
/// floaters. Copied to the instance buffer as-is.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Instance {
    pub position: [f32; 2], // Draw position (already pulse-scaled)
    pub color: [f32; 4],    // RGBA color
    pub size: f32,          // Quad edge length in pixels
    pub shape: f32,         // 0 = square, 1 = circle
}

impl Instance {
    pub fn square(position: Vec2, color: [f32; 4], size: f32) -> Self {
        Self {
            position: position.to_array(),
            color,
            size,
            shape: 0.0,
        }
    }

    pub fn circle(position: Vec2, color: [f32; 4], size: f32) -> Self {
        Self {
            position: position.to_array(),
            color,
            size,
            shape: 1.0,
        }
    }
}

/// Swarm tuning knobs. All presentation numbers live here rather than inline
/// in the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Linear sampling stride over the rasterized word; 1 tests every pixel.
    /// Density/performance trade-off.
    pub pixel_steps: usize,
    /// Radius of the secondary-button kill sweep.
    pub kill_radius: f32,
    /// Draw particles as small fixed-size squares instead of size-scaled
    /// circles.
    pub draw_as_points: bool,
    pub point_size: f32,
    pub floater_count: usize,
    pub tuning: ParticleTuning,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            pixel_steps: 4,
            kill_radius: 50.0,
            draw_as_points: true,
            point_size: 2.0,
            floater_count: 220,
            tuning: ParticleTuning::default(),
        }
    }
}

/// Pointer scalars, written by the input adapter and read at the start of
/// each tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerState {
    pub pos: Vec2,
    pub pressed: bool,
    pub secondary: bool,
}

/// Owns the particle pool and the word cycle.
///
/// Each displayed word is rasterized and sampled into targets; existing
/// particles are retargeted in index order before any new ones are created,
/// and the surplus is sent off-scene. `advance` runs one frame: physics,
/// color blending, instance emission, the removal sweep, the pointer kill
/// sweep, and the word schedule.
pub struct Swarm {
    config: SwarmConfig,
    theme: ThemeTable,
    words: Vec<String>,
    word_index: usize,
    active_word: String,
    occurrences: HashMap<String, u32>,

    particles: Vec<Particle>,
    viewport: Vec2,
    frame_count: u64,
    word_frame: u32,
    word_scale: f32,
    pointer: PointerState,

    rng: StdRng,
    instances: Vec<Instance>,
}

impl Swarm {
    /// Entropy-seeded swarm showing the first word of the cycle.
    pub fn new(words: Vec<String>, theme: ThemeTable, config: SwarmConfig, viewport: Vec2) -> Self {
        Self::from_rng(words, theme, config, viewport, StdRng::from_entropy())
    }

    /// Deterministic swarm for reproducible runs and tests.
    pub fn with_seed(
        words: Vec<String>,
        theme: ThemeTable,
        config: SwarmConfig,
        viewport: Vec2,
        seed: u64,
    ) -> Self {
        Self::from_rng(words, theme, config, viewport, StdRng::seed_from_u64(seed))
    }

    fn from_rng(
        words: Vec<String>,
        theme: ThemeTable,
        config: SwarmConfig,
        viewport: Vec2,
        rng: StdRng,
    ) -> Self {
        assert!(!words.is_empty(), "word cycle must not be empty");
        assert!(
            viewport.x > 0.0 && viewport.y > 0.0,
            "viewport must have positive dimensions"
        );

        let mut swarm = Self {
            config,
            theme,
            words,
            word_index: 0,
            active_word: String::new(),
            occurrences: HashMap::new(),
            particles: Vec::new(),
            viewport,
            frame_count: 0,
            word_frame: 0,
            word_scale: 1.0,
            pointer: PointerState::default(),
            rng,
            instances: Vec::new(),
        };
        swarm.set_word(0);
        swarm
    }

    /// Display the word at `index`: sample its glyph pixels as targets,
    /// retarget existing particles in index order, create new ones for any
    /// remaining targets, and kill the rest.
    pub fn set_word(&mut self, index: usize) {
        let word = self.words[index % self.words.len()].clone();
        self.word_index = index % self.words.len();
        self.word_frame = 0;
        self.word_scale = 1.0;

        let occurrence = {
            let count = self.occurrences.entry(normalize(&word)).or_insert(0);
            let n = *count;
            *count += 1;
            n
        };

        let mask = glyph::rasterize_word(&word, self.viewport.x as u32, self.viewport.y as u32);
        let targets = glyph::sample_targets(&mask, self.config.pixel_steps, &mut self.rng);
        let color = self.theme.color_for(&word, occurrence, &mut self.rng);

        log::debug!(
            "word '{}' (occurrence {occurrence}): {} targets, {} particles live",
            word.trim(),
            targets.len(),
            self.particles.len()
        );

        let mut used = 0;
        for target in targets {
            if used < self.particles.len() {
                self.particles[used].retarget(target, color);
            } else {
                let mut p = Particle::spawn(&mut self.rng, self.viewport, &self.config.tuning);
                p.retarget(target, color);
                self.particles.push(p);
            }
            used += 1;
        }

        for p in &mut self.particles[used..] {
            p.kill(&mut self.rng, self.viewport);
        }

        self.active_word = word;
    }

    /// One frame: steering, color blending, instance emission, removal of
    /// killed off-canvas particles, pointer kill sweep, and the cyclic word
    /// schedule.
    pub fn advance(&mut self) {
        self.frame_count += 1;
        self.word_frame += 1;

        self.word_scale = self
            .theme
            .pulse_for(&self.active_word)
            .map(|p| p.scale_at(self.word_frame))
            .unwrap_or(1.0);

        let center = self.viewport * 0.5;
        let scale = self.word_scale;
        let viewport = self.viewport;
        let config = &self.config;

        self.instances.clear();
        let instances = &mut self.instances;
        self.particles.retain_mut(|p| {
            p.step();
            p.advance_blend();

            let draw_pos = center + (p.pos - center) * scale;
            let color = p.blended_color().to_rgba_f32(1.0);
            instances.push(if config.draw_as_points {
                Instance::square(draw_pos, color, config.point_size)
            } else {
                Instance::circle(draw_pos, color, p.size * scale)
            });

            let gone = p.pos.x < 0.0
                || p.pos.x > viewport.x
                || p.pos.y < 0.0
                || p.pos.y > viewport.y;
            !(p.is_killed && gone)
        });

        if self.pointer.pressed && self.pointer.secondary {
            let pointer = self.pointer.pos;
            let radius = self.config.kill_radius;
            for p in self.particles.iter_mut() {
                if (p.pos - pointer).length() < radius {
                    p.kill(&mut self.rng, viewport);
                }
            }
        }

        if self.word_frame >= self.theme.duration_for(&self.active_word) {
            let next = (self.word_index + 1) % self.words.len();
            self.set_word(next);
        }
    }

    pub fn set_pointer(&mut self, pointer: PointerState) {
        self.pointer = pointer;
    }

    /// Update the viewport. Affects future word rasterization and the draw
    /// projection center; the current transition keeps its targets.
    pub fn resize(&mut self, viewport: Vec2) {
        if viewport.x > 0.0 && viewport.y > 0.0 {
            self.viewport = viewport;
        }
    }

    /// Draw instances emitted by the last `advance` call.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn active_word(&self) -> &str {
        &self.active_word
    }

    pub fn word_scale(&self) -> f32 {
        self.word_scale
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }
}

fn normalize(word: &str) -> String {
    word.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::rasterize_word;

    fn swarm(words: &[&str], viewport: Vec2, seed: u64) -> Swarm {
        Swarm::with_seed(
            words.iter().map(|w| w.to_string()).collect(),
            ThemeTable::default(),
            SwarmConfig::default(),
            viewport,
            seed,
        )
    }

    fn target_count(word: &str, viewport: Vec2) -> usize {
        rasterize_word(word, viewport.x as u32, viewport.y as u32).count_opaque(4)
    }

    #[test]
    fn first_word_creates_one_particle_per_target() {
        let viewport = Vec2::new(50.0, 30.0);
        let s = swarm(&["AB", "CD"], viewport, 1);

        let expected = target_count("AB", viewport);
        assert!(expected > 0);
        assert_eq!(s.particles().len(), expected);
        assert!(s.particles().iter().all(|p| !p.is_killed));
    }

    #[test]
    fn transition_to_smaller_word_reuses_and_kills() {
        let viewport = Vec2::new(50.0, 30.0);
        let mut s = swarm(&["AB", "I"], viewport, 2);
        let n = s.particles().len();

        s.set_word(1);
        let m = target_count("I", viewport);
        assert!(m < n, "test needs a sparser second word");

        // Reuse only: no growth, surplus killed.
        assert_eq!(s.particles().len(), n);
        let killed = s.particles().iter().filter(|p| p.is_killed).count();
        assert_eq!(killed, n - m);
    }

    #[test]
    fn transition_to_larger_word_reuses_then_creates() {
        let viewport = Vec2::new(50.0, 30.0);
        let mut s = swarm(&["I", "AB"], viewport, 3);
        let n = s.particles().len();

        s.set_word(1);
        let m = target_count("AB", viewport);
        assert!(m > n, "test needs a denser second word");

        assert_eq!(s.particles().len(), m);
        assert!(s.particles().iter().all(|p| !p.is_killed));
    }

    #[test]
    fn killed_particles_drain_once_off_canvas() {
        let viewport = Vec2::new(50.0, 30.0);
        let mut s = swarm(&["AB", "I"], viewport, 4);

        s.set_word(1);
        let m = target_count("I", viewport);

        // Word duration is 200 frames, so no auto-advance happens in here.
        for _ in 0..150 {
            s.advance();
        }

        assert_eq!(s.particles().len(), m);
        assert!(s.particles().iter().all(|p| !p.is_killed));
    }

    #[test]
    fn pointer_kill_hits_only_nearby_particles() {
        let viewport = Vec2::new(400.0, 300.0);
        let mut s = swarm(&["AB"], viewport, 5);
        s.advance();

        let target = s.particles()[0].pos;
        let before: Vec<Vec2> = s.particles().iter().map(|p| p.pos).collect();

        s.set_pointer(PointerState {
            pos: target,
            pressed: true,
            secondary: true,
        });
        s.advance();

        assert!(s.particles()[0].is_killed);

        // One step moves a particle by at most max_speed + max_force; anything
        // that started well outside the radius must survive the sweep.
        let margin = s.config().kill_radius + 12.0;
        for (p, pos) in s.particles().iter().zip(&before) {
            if (*pos - target).length() > margin {
                assert!(!p.is_killed);
            }
        }
    }

    #[test]
    fn primary_button_does_not_kill() {
        let viewport = Vec2::new(400.0, 300.0);
        let mut s = swarm(&["AB"], viewport, 6);
        s.advance();

        s.set_pointer(PointerState {
            pos: s.particles()[0].pos,
            pressed: true,
            secondary: false,
        });
        s.advance();

        assert!(s.particles().iter().all(|p| !p.is_killed));
    }

    #[test]
    fn word_cycle_advances_after_duration() {
        let viewport = Vec2::new(50.0, 30.0);
        let mut s = swarm(&["AB", "CD"], viewport, 7);

        for _ in 0..199 {
            s.advance();
        }
        assert_eq!(s.active_word(), "AB");

        s.advance();
        assert_eq!(s.active_word(), "CD");
    }

    #[test]
    fn hero_word_holds_longer() {
        let viewport = Vec2::new(50.0, 30.0);
        let mut s = swarm(&["SCARLET", "AB"], viewport, 8);

        for _ in 0..300 {
            s.advance();
        }
        assert_eq!(s.active_word(), "SCARLET");

        for _ in 0..20 {
            s.advance();
        }
        assert_eq!(s.active_word(), "AB");
    }

    #[test]
    fn pulse_scales_draw_positions_not_physics() {
        let viewport = Vec2::new(400.0, 300.0);
        let mut s = swarm(&["SCARLET"], viewport, 9);

        // 36 frames in: 16 frames past the settle delay, first beat crest
        // region, scale above 1.
        for _ in 0..36 {
            s.advance();
        }
        let scale = s.word_scale();
        assert!(scale > 1.0);

        let center = viewport * 0.5;
        for (p, inst) in s.particles().iter().zip(s.instances()) {
            let expected = center + (p.pos - center) * scale;
            assert!((Vec2::from_array(inst.position) - expected).length() < 1e-3);
        }
    }

    #[test]
    fn seeded_swarms_are_reproducible() {
        let viewport = Vec2::new(400.0, 300.0);
        let mut a = swarm(&["AB", "CD"], viewport, 42);
        let mut b = swarm(&["AB", "CD"], viewport, 42);

        for _ in 0..50 {
            a.advance();
            b.advance();
        }

        assert_eq!(a.particles().len(), b.particles().len());
        for (pa, pb) in a.particles().iter().zip(b.particles()) {
            assert_eq!(pa.pos, pb.pos);
            assert_eq!(pa.target, pb.target);
        }
    }

    #[test]
    fn instances_cover_all_live_particles() {
        let viewport = Vec2::new(400.0, 300.0);
        let mut s = swarm(&["AB"], viewport, 10);
        s.advance();
        assert_eq!(s.instances().len(), s.particles().len());
    }

    #[test]
    #[should_panic(expected = "word cycle")]
    fn empty_word_list_is_rejected() {
        let _ = Swarm::with_seed(
            Vec::new(),
            ThemeTable::default(),
            SwarmConfig::default(),
            Vec2::new(100.0, 100.0),
            0,
        );
    }
}
