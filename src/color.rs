use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Hue window roughly matching a "bright blue" palette: cyan-leaning teal
// through blue into the first violets, with high saturation and brightness.
const HUE_MIN: u16 = 179;
const HUE_MAX: u16 = 257;
const SAT_MIN: u16 = 55;
const SAT_MAX: u16 = 100;
const VAL_MIN: u16 = 70;
const VAL_MAX: u16 = 100;

/// FNV-1a over the seed string, folded with the background color so two
/// sessions differing only in background draw distinct sequences.
fn seed_hash(seed: &str, background: u32) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for b in seed.bytes() {
        h ^= b as u64;
        h = h.wrapping_mul(0x100000001b3);
    }
    h ^ background as u64
}

/// Master RNG for stimulus parameter sampling and autodraw jitter.
pub fn seed_rng(seed: &str, background: u32) -> StdRng {
    StdRng::seed_from_u64(seed_hash(seed, background))
}

/// An infinite, seed-deterministic sequence of packed 24-bit RGB colors.
///
/// Each element is generated from a fresh sub-seed pulled from the stream's
/// own RNG, so colors vary freely call to call while the whole sequence is
/// reproducible from the string seed. Restart by constructing a new stream
/// with the same seed.
pub struct ColorStream {
    rng: StdRng,
}

impl ColorStream {
    pub fn new(seed: &str, background: u32) -> Self {
        // Offset the hash so the color sub-sequence is decorrelated from the
        // master stimulus RNG while staying keyed to the same seed.
        Self {
            rng: StdRng::seed_from_u64(seed_hash(seed, background).rotate_left(17)),
        }
    }

    /// Pull the next color. Infallible inherent form of `Iterator::next`
    /// for callers that never want an `Option` from an infinite stream.
    pub fn next_color(&mut self) -> u32 {
        let mut sub = StdRng::seed_from_u64(self.rng.gen::<u64>());
        let hue = sub.gen_range(HUE_MIN..=HUE_MAX) as f64;
        let sat = sub.gen_range(SAT_MIN..=SAT_MAX) as f64 / 100.0;
        let val = sub.gen_range(VAL_MIN..=VAL_MAX) as f64 / 100.0;
        let (r, g, b) = hsv_to_rgb(hue, sat, val);
        (r as u32) << 16 | (g as u32) << 8 | b as u32
    }
}

impl Iterator for ColorStream {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        Some(self.next_color())
    }
}

/// Convert hue (degrees), saturation and value (0..1) to 8-bit RGB.
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h as u32 {
        0..=59 => (c, x, 0.0),
        60..=119 => (x, c, 0.0),
        120..=179 => (0.0, c, x),
        180..=239 => (0.0, x, c),
        240..=299 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    (
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}
