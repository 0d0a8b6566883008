use crate::settings::BlendMode;
use crate::view::PondView;

/// Unpacked 24-bit color channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Red is bits 16-23, green 8-15, blue 0-7
    pub fn unpack(color: u32) -> Self {
        Self {
            r: (color >> 16) as u8,
            g: (color >> 8) as u8,
            b: color as u8,
        }
    }
}

/// Integer fade scale. The ratio numer/denom stays below one so a fresh
/// ripple renders near-opaque and a retired one fully transparent, without a
/// float division per ripple in the paint loop.
#[derive(Debug, Clone, Copy)]
pub struct FadeScale {
    pub numer: u32,
    pub denom: u32,
}

impl FadeScale {
    /// Fade factor for a ripple, as an 8-bit alpha.
    ///
    /// The operation order is load-bearing: subtract, multiply by the
    /// numerator (with the 255 output scale folded in), then divide by the
    /// product of max magnitude and denominator. Reordering changes the
    /// integer rounding.
    pub fn alpha(&self, mag: u16, max_mag: u16) -> u8 {
        debug_assert!(max_mag > 0, "retired ripple leaked into a frame");
        debug_assert!(mag <= max_mag, "ripple magnitude above its max");
        let scaled = (max_mag - mag) as u64 * (self.numer as u64 * 255);
        (scaled / (max_mag as u64 * self.denom as u64)).min(255) as u8
    }
}

/// Resolve the on-screen color for a fill drawn at `alpha` over `background`.
/// Terminal cells have no alpha channel, so both modes reduce to a channel
/// computation; the image exporter blends against its own pixels instead of
/// a flat background.
pub fn apply_fade(mode: BlendMode, fill: Rgb, background: Rgb, alpha: u8) -> Rgb {
    let a = alpha as u32;
    let mix = |c: u8, bg: u8| -> u8 { ((c as u32 * a + bg as u32 * (255 - a)) / 255) as u8 };
    let scale = |c: u8| -> u8 { (c as u32 * a / 255) as u8 };
    match mode {
        BlendMode::Alpha => Rgb {
            r: mix(fill.r, background.r),
            g: mix(fill.g, background.g),
            b: mix(fill.b, background.b),
        },
        BlendMode::ChannelScale => Rgb {
            r: scale(fill.r),
            g: scale(fill.g),
            b: scale(fill.b),
        },
    }
}

/// Sink for filled-circle draw calls. Implemented by the terminal canvas,
/// the image exporter, and test recorders.
pub trait Painter {
    /// Set the fill color for the droplet whose ripples follow. Called once
    /// per droplet; switching fill is assumed to dominate per-draw cost, so
    /// implementations may do non-trivial work here.
    fn set_fill(&mut self, color: Rgb);
    /// Draw one filled circle with the current fill at the given fade alpha.
    fn fill_circle(&mut self, x: u16, y: u16, radius: u16, alpha: u8);
}

/// Paint one frame snapshot: one fill switch per droplet, then one circle
/// per ripple in its contiguous subrange.
pub fn paint(view: &PondView, fade: FadeScale, painter: &mut impl Painter) {
    for droplet in view.droplets() {
        painter.set_fill(Rgb::unpack(droplet.color));
        for (mag, max_mag) in droplet.mags.iter().zip(droplet.max_mags) {
            painter.fill_circle(droplet.x, droplet.y, *mag, fade.alpha(*mag, *max_mag));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pond::Pond;

    const FADE: FadeScale = FadeScale { numer: 1, denom: 5 };

    #[test]
    fn test_alpha_monotone_and_zero_at_max() {
        let max_mag = 200;
        let mut prev = u8::MAX;
        for mag in 0..=max_mag {
            let alpha = FADE.alpha(mag, max_mag);
            assert!(alpha <= prev, "alpha rose at magnitude {}", mag);
            prev = alpha;
        }
        assert_eq!(FADE.alpha(max_mag, max_mag), 0);
    }

    #[test]
    fn test_fresh_ripple_alpha_matches_scale() {
        // (200 - 0) * (1 * 255) / (200 * 5) = 51, i.e. the 1/5 scale of full
        assert_eq!(FADE.alpha(0, 200), 51);
    }

    #[test]
    fn test_alpha_clamped_for_misconfigured_scale() {
        let hot = FadeScale { numer: 3, denom: 1 };
        assert_eq!(hot.alpha(0, 100), 255);
    }

    #[test]
    fn test_unpack_channels() {
        let c = Rgb::unpack(0x12_34_56);
        assert_eq!((c.r, c.g, c.b), (0x12, 0x34, 0x56));
    }

    #[test]
    fn test_apply_fade_endpoints() {
        let fill = Rgb { r: 200, g: 100, b: 50 };
        let bg = Rgb { r: 10, g: 20, b: 30 };
        assert_eq!(apply_fade(BlendMode::Alpha, fill, bg, 255), fill);
        assert_eq!(apply_fade(BlendMode::Alpha, fill, bg, 0), bg);
        assert_eq!(apply_fade(BlendMode::ChannelScale, fill, bg, 255), fill);
        assert_eq!(
            apply_fade(BlendMode::ChannelScale, fill, bg, 0),
            Rgb { r: 0, g: 0, b: 0 }
        );
    }

    /// Records draw calls so grouping can be asserted
    #[derive(Default)]
    struct RecordingPainter {
        fills: Vec<Rgb>,
        circles: Vec<(Rgb, u16, u16, u16, u8)>,
    }

    impl Painter for RecordingPainter {
        fn set_fill(&mut self, color: Rgb) {
            self.fills.push(color);
        }

        fn fill_circle(&mut self, x: u16, y: u16, radius: u16, alpha: u8) {
            let fill = *self.fills.last().expect("fill set before drawing");
            self.circles.push((fill, x, y, radius, alpha));
        }
    }

    #[test]
    fn test_paint_sets_fill_once_per_droplet() {
        let mut pond = Pond::new(500, 500);
        pond.add_droplet(100, 100, 30, 0xFF0000, 2);
        pond.add_droplet(200, 200, 20, 0x0000FF, 3);
        for _ in 0..8 {
            pond.advance();
        }

        let view = crate::view::PondView::capture(&pond);
        let mut painter = RecordingPainter::default();
        paint(&view, FADE, &mut painter);

        assert_eq!(painter.fills.len(), view.droplet_count());
        assert_eq!(painter.circles.len(), view.total_ripples());
        // Every circle carries its droplet's color and position
        for (fill, x, y, _, _) in &painter.circles {
            let matching = view
                .droplets()
                .any(|d| Rgb::unpack(d.color) == *fill && d.x == *x && d.y == *y);
            assert!(matching);
        }
    }
}
