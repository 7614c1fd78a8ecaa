use glam::Vec2;
use rand::Rng;

use crate::swarm::Instance;

const FLOATER_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 0.35];
const MAX_SPEED: f32 = 0.3;
const SIZE_MIN: f32 = 0.6;
const SIZE_MAX: f32 = 2.4;

/// One decorative background point. No steering, no lifecycle; it drifts and
/// bounces for the life of the process.
#[derive(Debug, Clone)]
pub struct Floater {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
}

/// Fixed pool of ambient floaters bouncing inside the viewport.
pub struct FloaterField {
    floaters: Vec<Floater>,
    bounds: Vec2,
}

impl FloaterField {
    pub fn new<R: Rng>(count: usize, bounds: Vec2, rng: &mut R) -> Self {
        let floaters = (0..count)
            .map(|_| Floater {
                pos: Vec2::new(
                    rng.gen::<f32>() * bounds.x,
                    rng.gen::<f32>() * bounds.y,
                ),
                vel: Vec2::new(
                    (rng.gen::<f32>() - 0.5) * 2.0 * MAX_SPEED,
                    (rng.gen::<f32>() - 0.5) * 2.0 * MAX_SPEED,
                ),
                size: rng.gen_range(SIZE_MIN..SIZE_MAX),
            })
            .collect();

        Self { floaters, bounds }
    }

    pub fn set_bounds(&mut self, bounds: Vec2) {
        self.bounds = bounds;
    }

    /// Integrate one frame and reflect at the viewport edges. Positions are
    /// mirrored back inside so a floater can never walk off screen.
    pub fn update(&mut self) {
        for f in &mut self.floaters {
            f.pos += f.vel;

            if f.pos.x < 0.0 {
                f.pos.x = -f.pos.x;
                f.vel.x = f.vel.x.abs();
            } else if f.pos.x > self.bounds.x {
                f.pos.x = 2.0 * self.bounds.x - f.pos.x;
                f.vel.x = -f.vel.x.abs();
            }

            if f.pos.y < 0.0 {
                f.pos.y = -f.pos.y;
                f.vel.y = f.vel.y.abs();
            } else if f.pos.y > self.bounds.y {
                f.pos.y = 2.0 * self.bounds.y - f.pos.y;
                f.vel.y = -f.vel.y.abs();
            }
        }
    }

    /// Append one circle instance per floater.
    pub fn emit_instances(&self, out: &mut Vec<Instance>) {
        for f in &self.floaters {
            out.push(Instance::circle(f.pos, FLOATER_COLOR, f.size * 2.0));
        }
    }

    pub fn floaters(&self) -> &[Floater] {
        &self.floaters
    }

    pub fn len(&self) -> usize {
        self.floaters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floaters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn pool_size_is_fixed() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut field = FloaterField::new(220, Vec2::new(800.0, 600.0), &mut rng);
        for _ in 0..100 {
            field.update();
        }
        assert_eq!(field.len(), 220);
    }

    #[test]
    fn left_edge_reflects_velocity() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut field = FloaterField::new(1, Vec2::new(100.0, 100.0), &mut rng);
        {
            let f = &mut field.floaters[0];
            f.pos = Vec2::new(0.0, 50.0);
            f.vel = Vec2::new(-0.3, 0.0);
        }

        field.update();

        let f = &field.floaters[0];
        assert!(f.vel.x > 0.0);
        assert!(f.pos.x >= 0.0);
    }

    #[test]
    fn floaters_never_escape_bounds() {
        let mut rng = StdRng::seed_from_u64(3);
        let bounds = Vec2::new(120.0, 80.0);
        let mut field = FloaterField::new(50, bounds, &mut rng);

        for _ in 0..5000 {
            field.update();
            for f in field.floaters() {
                assert!(f.pos.x >= 0.0 && f.pos.x <= bounds.x);
                assert!(f.pos.y >= 0.0 && f.pos.y <= bounds.y);
            }
        }
    }
}
