use std::f32::consts::TAU;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Decaying heartbeat applied to a word's draw scale after it settles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseEffect {
    /// Frames to wait before the first beat.
    pub settle_frames: u32,
    pub beats: u32,
    pub beat_frames: u32,
    pub amplitude: f32,
}

impl Default for PulseEffect {
    fn default() -> Self {
        Self {
            settle_frames: 20,
            beats: 3,
            beat_frames: 60,
            amplitude: 0.12,
        }
    }
}

impl PulseEffect {
    /// Draw-scale multiplier for the given per-word frame count. Returns 1.0
    /// outside the active pulse window. The envelope decays per beat down to
    /// 10% of the starting amplitude.
    pub fn scale_at(&self, word_frame: u32) -> f32 {
        if word_frame <= self.settle_frames {
            return 1.0;
        }

        let t = word_frame - self.settle_frames;
        let total = self.beats * self.beat_frames;
        if t > total || self.beat_frames == 0 {
            return 1.0;
        }

        let phase = (t % self.beat_frames) as f32 / self.beat_frames as f32;
        let envelope = 1.0 - ((t / self.beat_frames) as f32 / self.beats as f32).min(0.9);
        1.0 + self.amplitude * (phase * TAU).sin() * envelope
    }
}

/// Presentation policy for one word of the cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordTheme {
    pub word: String,
    pub color: Rgb,
    /// Color used the first time the word is shown, if it should differ from
    /// later occurrences.
    #[serde(default)]
    pub first_color: Option<Rgb>,
    /// Frames the word stays on screen; falls back to the table's base
    /// duration.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub pulse: Option<PulseEffect>,
}

/// Word theme lookup table. Words without an entry get a random color and the
/// base duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeTable {
    #[serde(default = "default_base_duration")]
    pub base_duration: u32,
    #[serde(default)]
    pub words: Vec<WordTheme>,
}

fn default_base_duration() -> u32 {
    200
}

impl Default for ThemeTable {
    fn default() -> Self {
        let entry = |word: &str, color: Rgb| WordTheme {
            word: word.to_string(),
            color,
            first_color: None,
            duration: None,
            pulse: None,
        };

        Self {
            base_duration: default_base_duration(),
            words: vec![
                entry("RUST", Rgb::new(255, 140, 60)),
                entry("MOTION", Rgb::new(70, 170, 255)),
                WordTheme {
                    word: "SCARLET".to_string(),
                    color: Rgb::new(220, 20, 60),
                    first_color: Some(Rgb::new(40, 120, 255)),
                    duration: Some(320),
                    pulse: Some(PulseEffect::default()),
                },
            ],
        }
    }
}

impl ThemeTable {
    /// Parse a theme table from JSON, falling back to the built-in table on
    /// error.
    pub fn from_json_str(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(table) => table,
            Err(e) => {
                log::warn!("theme JSON parse error: {e}. Using built-in themes.");
                Self::default()
            }
        }
    }

    /// Load a theme table from a JSON file, falling back to the built-in
    /// table if the file cannot be read.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json_str(&json),
            Err(e) => {
                log::warn!("could not read theme file {}: {e}. Using built-in themes.", path.display());
                Self::default()
            }
        }
    }

    pub fn lookup(&self, word: &str) -> Option<&WordTheme> {
        let key = normalize(word);
        self.words.iter().find(|t| normalize(&t.word) == key)
    }

    /// Theme color for the given occurrence of a word; unthemed words roll a
    /// random color.
    pub fn color_for<R: Rng>(&self, word: &str, occurrence: u32, rng: &mut R) -> Rgb {
        match self.lookup(word) {
            Some(theme) if occurrence == 0 => theme.first_color.unwrap_or(theme.color),
            Some(theme) => theme.color,
            None => Rgb::new(rng.gen(), rng.gen(), rng.gen()),
        }
    }

    pub fn duration_for(&self, word: &str) -> u32 {
        self.lookup(word)
            .and_then(|t| t.duration)
            .unwrap_or(self.base_duration)
    }

    pub fn pulse_for(&self, word: &str) -> Option<&PulseEffect> {
        self.lookup(word).and_then(|t| t.pulse.as_ref())
    }
}

fn normalize(word: &str) -> String {
    word.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        let table = ThemeTable::default();
        assert!(table.lookup("  scarlet ").is_some());
        assert!(table.lookup("unknown").is_none());
    }

    #[test]
    fn first_occurrence_color_differs() {
        let table = ThemeTable::default();
        let mut rng = StdRng::seed_from_u64(0);
        let first = table.color_for("SCARLET", 0, &mut rng);
        let later = table.color_for("SCARLET", 1, &mut rng);
        assert_eq!(first, Rgb::new(40, 120, 255));
        assert_eq!(later, Rgb::new(220, 20, 60));
    }

    #[test]
    fn unthemed_word_gets_deterministic_random_color() {
        let table = ThemeTable::default();
        let a = table.color_for("NOPE", 0, &mut StdRng::seed_from_u64(5));
        let b = table.color_for("NOPE", 0, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn durations_fall_back_to_base() {
        let table = ThemeTable::default();
        assert_eq!(table.duration_for("SCARLET"), 320);
        assert_eq!(table.duration_for("RUST"), 200);
        assert_eq!(table.duration_for("NOPE"), 200);
    }

    #[test]
    fn bad_json_falls_back_to_defaults() {
        let table = ThemeTable::from_json_str("{not json");
        assert_eq!(table.base_duration, 200);
        assert!(table.lookup("SCARLET").is_some());
    }

    #[test]
    fn json_round_trip() {
        let json = r#"{
            "base_duration": 120,
            "words": [
                { "word": "HELLO", "color": { "r": 1, "g": 2, "b": 3 } }
            ]
        }"#;
        let table = ThemeTable::from_json_str(json);
        assert_eq!(table.base_duration, 120);
        assert_eq!(table.lookup("hello").unwrap().color, Rgb::new(1, 2, 3));
    }

    #[test]
    fn pulse_rests_before_and_after_beats() {
        let pulse = PulseEffect::default();
        assert_eq!(pulse.scale_at(0), 1.0);
        assert_eq!(pulse.scale_at(20), 1.0);
        assert_eq!(pulse.scale_at(20 + 3 * 60 + 1), 1.0);
    }

    #[test]
    fn pulse_swells_mid_beat_and_decays() {
        let pulse = PulseEffect::default();
        // Quarter of the way into a beat the sine is at its crest.
        let first_beat = pulse.scale_at(20 + 15);
        let last_beat = pulse.scale_at(20 + 2 * 60 + 15);
        assert!(first_beat > 1.0);
        assert!(last_beat > 1.0);
        assert!(last_beat < first_beat);
    }
}
