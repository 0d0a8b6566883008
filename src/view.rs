use crate::pond::Pond;

/// A read-only snapshot of one simulation frame.
///
/// The view borrows the pond's parallel arrays, so the borrow checker rules
/// out reading it across an `advance` (which needs `&mut Pond`). The captured
/// generation is carried along anyway so tests and assertions can observe
/// staleness explicitly.
pub struct PondView<'a> {
    xs: &'a [u16],
    ys: &'a [u16],
    colors: &'a [u32],
    ripple_counts: &'a [u32],
    ripple_mags: &'a [u16],
    ripple_max_mags: &'a [u16],
    generation: u64,
}

/// One droplet with its contiguous slice of ripples, yielded by
/// `PondView::droplets`.
pub struct DropletRipples<'a> {
    pub x: u16,
    pub y: u16,
    pub color: u32,
    pub mags: &'a [u16],
    pub max_mags: &'a [u16],
}

impl<'a> PondView<'a> {
    /// Capture the arrays for the frame the pond is currently on. Must be
    /// re-acquired after every `advance`.
    pub fn capture(pond: &'a Pond) -> Self {
        Self {
            xs: pond.droplet_xs(),
            ys: pond.droplet_ys(),
            colors: pond.droplet_colors(),
            ripple_counts: pond.ripple_counts(),
            ripple_mags: pond.ripple_mags(),
            ripple_max_mags: pond.ripple_max_mags(),
            generation: pond.generation(),
        }
    }

    pub fn droplet_count(&self) -> usize {
        self.xs.len()
    }

    pub fn total_ripples(&self) -> usize {
        self.ripple_mags.len()
    }

    /// The generation this snapshot belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Iterate droplets with their ripple subranges, in array order. A
    /// running offset walks the flat ripple arrays; each droplet's ripples
    /// are contiguous, so the slices line up exactly with `ripple_counts`.
    pub fn droplets(&self) -> impl Iterator<Item = DropletRipples<'a>> + '_ {
        let mut offset = 0usize;
        (0..self.xs.len()).map(move |i| {
            let count = self.ripple_counts[i] as usize;
            let start = offset;
            offset += count;
            DropletRipples {
                x: self.xs[i],
                y: self.ys[i],
                color: self.colors[i],
                mags: &self.ripple_mags[start..offset],
                max_mags: &self.ripple_max_mags[start..offset],
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticked_pond() -> Pond {
        let mut pond = Pond::new(500, 500);
        pond.add_droplet(100, 100, 40, 0xFF0000, 2);
        pond.add_droplet(200, 300, 20, 0x00FF00, 4);
        for _ in 0..10 {
            pond.advance();
        }
        pond
    }

    #[test]
    fn test_view_sizes_match_counts() {
        let pond = ticked_pond();
        let view = PondView::capture(&pond);
        assert_eq!(view.droplet_count() as u32, pond.droplet_count());
        assert_eq!(view.total_ripples() as u32, pond.total_ripples());
    }

    #[test]
    fn test_grouped_iteration_consumes_all_ripples() {
        let pond = ticked_pond();
        let view = PondView::capture(&pond);
        let grouped: usize = view.droplets().map(|d| d.mags.len()).sum();
        assert_eq!(grouped, view.total_ripples());
        for droplet in view.droplets() {
            assert_eq!(droplet.mags.len(), droplet.max_mags.len());
            for (mag, max_mag) in droplet.mags.iter().zip(droplet.max_mags) {
                assert!(mag <= max_mag);
            }
        }
    }

    #[test]
    fn test_generation_marks_stale_snapshots() {
        let mut pond = ticked_pond();
        let captured = PondView::capture(&pond).generation();
        pond.advance();
        let fresh = PondView::capture(&pond).generation();
        assert_eq!(fresh, captured + 1);
    }

    #[test]
    fn test_droplet_positions_and_colors_pass_through() {
        let mut pond = Pond::new(500, 500);
        pond.add_droplet(42, 17, 10, 0xABCDEF, 100);
        pond.advance();
        let view = PondView::capture(&pond);
        let droplet = view.droplets().next().unwrap();
        assert_eq!((droplet.x, droplet.y), (42, 17));
        assert_eq!(droplet.color, 0xABCDEF);
        assert_eq!(droplet.mags.len(), 1);
    }
}
