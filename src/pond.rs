/// Structure-of-arrays store for every active droplet and its ripples.
///
/// Ripples belonging to one droplet occupy a contiguous run of the flat
/// per-ripple arrays, so a running offset plus the per-droplet count slices
/// them out without any indirection. The flat layout is the output contract
/// consumed by `view::PondView` each frame.
struct Droplets {
    xs: Vec<u16>,
    ys: Vec<u16>,
    /// Max magnitude the next spawned ripple receives; decays by one per spawn
    strengths: Vec<u16>,
    /// Ticks between consecutive ripple spawns
    freqs: Vec<u16>,
    /// Countdown from freq to 0; a new ripple spawns when it reaches 0
    counters: Vec<u16>,
    /// Packed 24-bit RGB (only the lower 24 bits are used)
    colors: Vec<u32>,
    /// Live ripples per droplet (u32 keeps the array FFI-flat friendly)
    ripple_counts: Vec<u32>,
    /// Current magnitudes of all ripples, grouped by droplet
    ripple_mags: Vec<u16>,
    /// Retirement magnitudes, parallel to `ripple_mags`
    ripple_max_mags: Vec<u16>,
    total_ripples: u32,
}

const DROPLET_START_CAP: usize = 128;

impl Droplets {
    fn new() -> Self {
        Self {
            xs: Vec::with_capacity(DROPLET_START_CAP),
            ys: Vec::with_capacity(DROPLET_START_CAP),
            strengths: Vec::with_capacity(DROPLET_START_CAP),
            freqs: Vec::with_capacity(DROPLET_START_CAP),
            counters: Vec::with_capacity(DROPLET_START_CAP),
            colors: Vec::with_capacity(DROPLET_START_CAP),
            ripple_counts: Vec::with_capacity(DROPLET_START_CAP),
            ripple_mags: Vec::with_capacity(DROPLET_START_CAP),
            ripple_max_mags: Vec::with_capacity(DROPLET_START_CAP),
            total_ripples: 0,
        }
    }

    /// Remove one droplet from every per-droplet array. The caller is
    /// responsible for having already dropped its ripples from the flat arrays.
    fn remove(&mut self, id: usize) {
        self.xs.remove(id);
        self.ys.remove(id);
        self.strengths.remove(id);
        self.freqs.remove(id);
        self.counters.remove(id);
        self.colors.remove(id);
        self.ripple_counts.remove(id);
    }

    fn clear(&mut self) {
        self.xs.clear();
        self.ys.clear();
        self.strengths.clear();
        self.freqs.clear();
        self.counters.clear();
        self.colors.clear();
        self.ripple_counts.clear();
        self.ripple_mags.clear();
        self.ripple_max_mags.clear();
        self.total_ripples = 0;
    }
}

/// The simulation core: all active droplets and ripples in one pond.
///
/// The pond only exposes `advance`, `add_droplet`, cardinalities, and raw
/// per-entity slices. Every call to `advance` bumps the generation counter
/// and rebuilds the ripple arrays, so any previously captured view is stale;
/// `view::PondView` borrows the pond to make holding one across an `advance`
/// impossible.
pub struct Pond {
    width: u16,
    height: u16,
    droplets: Droplets,
    generation: u64,
}

impl Pond {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            droplets: Droplets::new(),
            generation: 0,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Incremented by every `advance`; lets a consumer detect a stale snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Advance the pond by one tick: grow every live ripple by one, retire
    /// ripples that reached their max magnitude, spawn fresh ripples from
    /// droplets whose counter hit zero, and remove droplets with nothing
    /// left to do.
    pub fn advance(&mut self) {
        self.generation += 1;

        let d = &mut self.droplets;
        let old_total = d.total_ripples as usize;
        let mut new_mags = Vec::with_capacity(old_total);
        let mut new_max_mags = Vec::with_capacity(old_total);
        let mut total = 0u32;
        let mut ripple_id = 0usize;
        let mut id = 0usize;

        // Droplet ids shift along with the arrays on removal, so the loop
        // only advances `id` when the current droplet survives.
        while id < d.xs.len() {
            let mut count = d.ripple_counts[id];

            // Grow or retire this droplet's contiguous ripple run
            let bound = ripple_id + count as usize;
            while ripple_id < bound {
                let mag = d.ripple_mags[ripple_id] + 1;
                let max_mag = d.ripple_max_mags[ripple_id];
                if mag > max_mag {
                    count -= 1;
                } else {
                    new_mags.push(mag);
                    new_max_mags.push(max_mag);
                }
                ripple_id += 1;
            }

            let strength = d.strengths[id];
            if d.counters[id] == 0 && strength > 0 {
                // Spawn a fresh ripple and let the droplet decay
                new_mags.push(0);
                new_max_mags.push(strength);
                count += 1;
                d.ripple_counts[id] = count;
                d.strengths[id] = strength - 1;
                d.counters[id] = d.freqs[id];
                total += count;
                id += 1;
            } else if count == 0 {
                // Drained (or between spawns with nothing alive): retire it
                d.remove(id);
            } else {
                d.ripple_counts[id] = count;
                // A drained droplet sits at 0 until its last ripple fades
                d.counters[id] = d.counters[id].saturating_sub(1);
                total += count;
                id += 1;
            }
        }

        d.ripple_mags = new_mags;
        d.ripple_max_mags = new_max_mags;
        d.total_ripples = total;
    }

    /// Enqueue a new droplet. Requests outside the pond or with zero
    /// magnitude are silently ignored; that is the expected degenerate
    /// behavior for jittered stimulus coordinates, not an error.
    pub fn add_droplet(&mut self, x: u16, y: u16, mag: u16, color: u32, freq: u16) {
        if x >= self.width || y >= self.height || mag == 0 {
            return;
        }
        let d = &mut self.droplets;
        d.xs.push(x);
        d.ys.push(y);
        d.strengths.push(mag);
        d.freqs.push(freq);
        // Counter starts at zero so the first ripple spawns on the next tick
        d.counters.push(0);
        d.colors.push(color);
        d.ripple_counts.push(0);
    }

    pub fn droplet_count(&self) -> u32 {
        self.droplets.xs.len() as u32
    }

    pub fn total_ripples(&self) -> u32 {
        self.droplets.total_ripples
    }

    /// Remove every droplet and ripple, keeping the pond dimensions.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.droplets.clear();
    }

    /// Rebuild the pond at new dimensions, dropping all current state.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.clear();
    }

    // === Raw per-entity views (valid until the next advance) ===

    pub fn droplet_xs(&self) -> &[u16] {
        &self.droplets.xs
    }

    pub fn droplet_ys(&self) -> &[u16] {
        &self.droplets.ys
    }

    pub fn droplet_colors(&self) -> &[u32] {
        &self.droplets.colors
    }

    pub fn ripple_counts(&self) -> &[u32] {
        &self.droplets.ripple_counts
    }

    pub fn ripple_mags(&self) -> &[u16] {
        &self.droplets.ripple_mags
    }

    pub fn ripple_max_mags(&self) -> &[u16] {
        &self.droplets.ripple_max_mags
    }
}
