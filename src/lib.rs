pub mod color;
pub mod floaters;
pub mod glyph;
pub mod particle;
pub mod renderer;
pub mod swarm;
pub mod theme;

// Re-export main types
pub use color::Rgb;
pub use floaters::{Floater, FloaterField};
pub use glyph::{rasterize_word, sample_targets, GlyphMask};
pub use particle::{Particle, ParticleTuning};
pub use renderer::Renderer;
pub use swarm::{Instance, PointerState, Swarm, SwarmConfig};
pub use theme::{PulseEffect, ThemeTable, WordTheme};
