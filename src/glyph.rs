use glam::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;

/// Font size bounds; the actual size tracks the viewport width.
const FONT_MIN: f32 = 90.0;
const FONT_MAX: f32 = 200.0;
const FONT_WIDTH_FACTOR: f32 = 0.15;

/// Embedded glyph cell dimensions.
const CELL: usize = 8;

/// Alpha mask of a rendered word, same dimensions as the viewport.
pub struct GlyphMask {
    pub width: usize,
    pub height: usize,
    pub alpha: Vec<u8>,
}

impl GlyphMask {
    /// Number of opaque pixels at the given linear sampling stride. Mirrors
    /// what [`sample_targets`] will produce for the same mask.
    pub fn count_opaque(&self, pixel_steps: usize) -> usize {
        self.alpha
            .iter()
            .step_by(pixel_steps.max(1))
            .filter(|&&a| a > 0)
            .count()
    }
}

/// Render `word` centered in a `width` x `height` mask.
///
/// Glyphs come from the embedded 8x8 bitmap font, scaled up with
/// nearest-neighbor to a font size of `clamp(90, 200, 0.15 * width)`.
/// Characters outside the font's repertoire take up an advance but leave no
/// ink. Anything past the canvas edges is clipped.
pub fn rasterize_word(word: &str, width: u32, height: u32) -> GlyphMask {
    let width = width as usize;
    let height = height as usize;
    let mut alpha = vec![0u8; width * height];

    let chars: Vec<char> = word.chars().flat_map(|c| c.to_uppercase()).collect();
    if chars.is_empty() {
        return GlyphMask { width, height, alpha };
    }

    let font_size = (width as f32 * FONT_WIDTH_FACTOR)
        .floor()
        .clamp(FONT_MIN, FONT_MAX);
    let scale = font_size / CELL as f32;

    let text_width = chars.len() as f32 * font_size;
    let origin_x = width as f32 / 2.0 - text_width / 2.0;
    let origin_y = height as f32 / 2.0 - font_size / 2.0;

    for y in 0..height {
        let v = (y as f32 - origin_y) / scale;
        if v < 0.0 || v >= CELL as f32 {
            continue;
        }
        let row = v as usize;

        for x in 0..width {
            let u = (x as f32 - origin_x) / scale;
            if u < 0.0 || u >= chars.len() as f32 * CELL as f32 {
                continue;
            }
            let u = u as usize;
            let glyph = match glyph_rows(chars[u / CELL]) {
                Some(rows) => rows,
                None => continue,
            };

            let col = u % CELL;
            if (glyph[row] >> (7 - col)) & 1 == 1 {
                alpha[y * width + x] = 255;
            }
        }
    }

    GlyphMask { width, height, alpha }
}

/// Extract target coordinates from a mask: every opaque pixel at the given
/// linear stride, in a uniformly shuffled order so particles fill the word
/// fluidly instead of in raster order.
pub fn sample_targets<R: Rng>(mask: &GlyphMask, pixel_steps: usize, rng: &mut R) -> Vec<Vec2> {
    let mut coords: Vec<Vec2> = (0..mask.alpha.len())
        .step_by(pixel_steps.max(1))
        .filter(|&i| mask.alpha[i] > 0)
        .map(|i| Vec2::new((i % mask.width) as f32, (i / mask.width) as f32))
        .collect();

    coords.shuffle(rng);
    coords
}

/// 8x8 bitmap rows for one character, MSB leftmost. Uppercase letters,
/// digits, and the handful of punctuation the word cycle needs.
fn glyph_rows(c: char) -> Option<[u8; 8]> {
    let rows = match c {
        'A' => [0x18, 0x3C, 0x66, 0x66, 0x7E, 0x66, 0x66, 0x00],
        'B' => [0x7C, 0x66, 0x66, 0x7C, 0x66, 0x66, 0x7C, 0x00],
        'C' => [0x3C, 0x66, 0x60, 0x60, 0x60, 0x66, 0x3C, 0x00],
        'D' => [0x78, 0x6C, 0x66, 0x66, 0x66, 0x6C, 0x78, 0x00],
        'E' => [0x7E, 0x60, 0x60, 0x7C, 0x60, 0x60, 0x7E, 0x00],
        'F' => [0x7E, 0x60, 0x60, 0x7C, 0x60, 0x60, 0x60, 0x00],
        'G' => [0x3C, 0x66, 0x60, 0x6E, 0x66, 0x66, 0x3E, 0x00],
        'H' => [0x66, 0x66, 0x66, 0x7E, 0x66, 0x66, 0x66, 0x00],
        'I' => [0x3C, 0x18, 0x18, 0x18, 0x18, 0x18, 0x3C, 0x00],
        'J' => [0x1E, 0x0C, 0x0C, 0x0C, 0x0C, 0x6C, 0x38, 0x00],
        'K' => [0x66, 0x6C, 0x78, 0x70, 0x78, 0x6C, 0x66, 0x00],
        'L' => [0x60, 0x60, 0x60, 0x60, 0x60, 0x60, 0x7E, 0x00],
        'M' => [0x63, 0x77, 0x7F, 0x6B, 0x63, 0x63, 0x63, 0x00],
        'N' => [0x66, 0x76, 0x7E, 0x7E, 0x6E, 0x66, 0x66, 0x00],
        'O' => [0x3C, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3C, 0x00],
        'P' => [0x7C, 0x66, 0x66, 0x7C, 0x60, 0x60, 0x60, 0x00],
        'Q' => [0x3C, 0x66, 0x66, 0x66, 0x6A, 0x6C, 0x36, 0x00],
        'R' => [0x7C, 0x66, 0x66, 0x7C, 0x78, 0x6C, 0x66, 0x00],
        'S' => [0x3C, 0x66, 0x60, 0x3C, 0x06, 0x66, 0x3C, 0x00],
        'T' => [0x7E, 0x18, 0x18, 0x18, 0x18, 0x18, 0x18, 0x00],
        'U' => [0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x3C, 0x00],
        'V' => [0x66, 0x66, 0x66, 0x66, 0x66, 0x3C, 0x18, 0x00],
        'W' => [0x63, 0x63, 0x63, 0x6B, 0x7F, 0x77, 0x63, 0x00],
        'X' => [0x66, 0x66, 0x3C, 0x18, 0x3C, 0x66, 0x66, 0x00],
        'Y' => [0x66, 0x66, 0x66, 0x3C, 0x18, 0x18, 0x18, 0x00],
        'Z' => [0x7E, 0x06, 0x0C, 0x18, 0x30, 0x60, 0x7E, 0x00],
        '0' => [0x3C, 0x66, 0x6E, 0x76, 0x66, 0x66, 0x3C, 0x00],
        '1' => [0x18, 0x38, 0x18, 0x18, 0x18, 0x18, 0x7E, 0x00],
        '2' => [0x3C, 0x66, 0x06, 0x0C, 0x18, 0x30, 0x7E, 0x00],
        '3' => [0x3C, 0x66, 0x06, 0x1C, 0x06, 0x66, 0x3C, 0x00],
        '4' => [0x0C, 0x1C, 0x3C, 0x6C, 0x7E, 0x0C, 0x0C, 0x00],
        '5' => [0x7E, 0x60, 0x7C, 0x06, 0x06, 0x66, 0x3C, 0x00],
        '6' => [0x3C, 0x66, 0x60, 0x7C, 0x66, 0x66, 0x3C, 0x00],
        '7' => [0x7E, 0x06, 0x0C, 0x18, 0x30, 0x30, 0x30, 0x00],
        '8' => [0x3C, 0x66, 0x66, 0x3C, 0x66, 0x66, 0x3C, 0x00],
        '9' => [0x3C, 0x66, 0x66, 0x3E, 0x06, 0x66, 0x3C, 0x00],
        '&' => [0x38, 0x6C, 0x6C, 0x38, 0x6D, 0x66, 0x3B, 0x00],
        '!' => [0x18, 0x18, 0x18, 0x18, 0x18, 0x00, 0x18, 0x00],
        '?' => [0x3C, 0x66, 0x06, 0x0C, 0x18, 0x00, 0x18, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x00],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x18, 0x18, 0x30],
        '-' => [0x00, 0x00, 0x00, 0x7E, 0x00, 0x00, 0x00, 0x00],
        '\'' => [0x18, 0x18, 0x30, 0x00, 0x00, 0x00, 0x00, 0x00],
        _ => return None,
    };
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn renders_some_ink_for_a_word() {
        let mask = rasterize_word("AB", 800, 400);
        assert!(mask.count_opaque(1) > 0);
    }

    #[test]
    fn empty_and_blank_words_render_nothing() {
        assert_eq!(rasterize_word("", 800, 400).count_opaque(1), 0);
        assert_eq!(rasterize_word("   ", 800, 400).count_opaque(1), 0);
    }

    #[test]
    fn unsupported_characters_leave_a_gap() {
        let with_gap = rasterize_word("A\u{00e9}A", 1200, 400);
        let without = rasterize_word("AAA", 1200, 400);
        assert!(with_gap.count_opaque(1) < without.count_opaque(1));
    }

    #[test]
    fn small_canvas_clips_instead_of_panicking() {
        // 50x30 forces the 90px minimum font far past the canvas edges.
        let mask = rasterize_word("AB", 50, 30);
        assert_eq!(mask.alpha.len(), 50 * 30);
    }

    #[test]
    fn sampled_targets_match_strided_opaque_count() {
        let mut rng = StdRng::seed_from_u64(1);
        let mask = rasterize_word("AB", 50, 30);
        let targets = sample_targets(&mask, 4, &mut rng);
        assert_eq!(targets.len(), mask.count_opaque(4));
    }

    #[test]
    fn sampled_targets_lie_on_opaque_pixels() {
        let mut rng = StdRng::seed_from_u64(2);
        let mask = rasterize_word("HI", 800, 400);
        for t in sample_targets(&mask, 4, &mut rng) {
            let (x, y) = (t.x as usize, t.y as usize);
            assert!(x < mask.width && y < mask.height);
            assert!(mask.alpha[y * mask.width + x] > 0);
        }
    }

    #[test]
    fn sampling_shuffles_raster_order() {
        let mut rng = StdRng::seed_from_u64(3);
        let mask = rasterize_word("OO", 800, 400);
        let targets = sample_targets(&mask, 4, &mut rng);
        assert!(targets.len() > 16);

        // A uniform permutation of hundreds of points is effectively never in
        // scanline order.
        let sorted = targets
            .windows(2)
            .all(|w| (w[0].y, w[0].x) <= (w[1].y, w[1].x));
        assert!(!sorted);
    }

    #[test]
    fn stride_one_is_denser_than_stride_four() {
        let mask = rasterize_word("X", 800, 400);
        assert!(mask.count_opaque(1) > mask.count_opaque(4));
    }
}
