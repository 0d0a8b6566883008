use crate::color::{seed_rng, ColorStream};
use crate::settings::{AutodrawSettings, PondSettings};
use rand::rngs::StdRng;
use rand::Rng;

/// One droplet-creation request, ready to hand to the pond
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropletRequest {
    pub x: u16,
    pub y: u16,
    pub mag: u16,
    pub color: u32,
    pub freq: u16,
}

/// Sample an unsigned value from `min + rng * (max - min)`.
///
/// The spread is computed in floats and truncated, so an inverted range goes
/// negative and the saturating cast collapses to zero: degenerate output,
/// never a fault.
fn sample_range(rng: &mut StdRng, min: u16, max: u16) -> u16 {
    let span = max as f64 - min as f64;
    (min as f64 + rng.gen::<f64>() * span) as u16
}

/// Seeded source of droplet parameters shared by both generators.
///
/// Owns the stimulus RNG and the color stream so all per-session randomness
/// lives in one place; `last` keeps the most recent request for the status
/// sidebar.
pub struct StimulusSource {
    rng: StdRng,
    colors: ColorStream,
    mag_min: u16,
    mag_max: u16,
    freq_min: u16,
    freq_max: u16,
    pub last: Option<DropletRequest>,
}

impl StimulusSource {
    pub fn new(settings: &PondSettings) -> Self {
        Self {
            rng: seed_rng(&settings.seed, settings.background),
            colors: ColorStream::new(&settings.seed, settings.background),
            mag_min: settings.mag_min,
            mag_max: settings.mag_max,
            freq_min: settings.freq_min,
            freq_max: settings.freq_max,
            last: None,
        }
    }

    /// Build a request at (x, y) with freshly sampled magnitude, frequency
    /// and color. Coordinates saturate at the pond edges on the low side;
    /// the pond's own bounds check rejects the high side.
    pub fn request(&mut self, x: f64, y: f64) -> DropletRequest {
        let req = DropletRequest {
            x: x as u16,
            y: y as u16,
            mag: sample_range(&mut self.rng, self.mag_min, self.mag_max),
            color: self.colors.next_color(),
            freq: sample_range(&mut self.rng, self.freq_min, self.freq_max),
        };
        self.last = Some(req);
        req
    }

    /// Centered random displacement within `spread`
    pub fn jitter(&mut self, spread: f64) -> f64 {
        self.rng.gen::<f64>() * spread - spread / 2.0
    }
}

/// Pointer-driven stimulus: pointer-down always emits, pointer-move emits on
/// every Nth move while the button is held.
#[derive(Debug, Default)]
pub struct ManualStimulus {
    held: bool,
    move_ctr: u32,
}

impl ManualStimulus {
    /// Returns true when the event should emit a droplet (always, for down)
    pub fn pointer_down(&mut self) -> bool {
        self.held = true;
        self.move_ctr = 0;
        true
    }

    /// Throttled: only every `hold_interval`th move emits, so a held or
    /// slowly dragged pointer does not oversaturate the pond.
    pub fn pointer_move(&mut self, hold_interval: u32) -> bool {
        if !self.held {
            return false;
        }
        let interval = hold_interval.max(1);
        let emit = self.move_ctr % interval == interval - 1;
        self.move_ctr += 1;
        emit
    }

    pub fn pointer_up(&mut self) {
        self.held = false;
    }

    pub fn is_held(&self) -> bool {
        self.held
    }
}

/// Deterministic raster scan over the pond: column by column, jittering each
/// emission around the nominal grid point, until the cursor walks off the
/// right edge (plus the configured end offset).
pub struct Autodraw {
    cfg: AutodrawSettings,
    width: u16,
    height: u16,
    cur_x: i32,
    cur_y: i32,
}

impl Autodraw {
    pub fn new(cfg: AutodrawSettings, width: u16, height: u16) -> Self {
        let cur_x = cfg.x_start_offs;
        let cur_y = cfg.y_start_offs;
        Self {
            cfg,
            width,
            height,
            cur_x,
            cur_y,
        }
    }

    /// Emit up to `circles_per_frame` requests for this frame, advancing the
    /// scan cursor.
    pub fn frame_batch(&mut self, source: &mut StimulusSource) -> Vec<DropletRequest> {
        let y_bound = self.height as i32 + self.cfg.y_end_offs;
        let mut batch = Vec::with_capacity(self.cfg.circles_per_frame as usize);
        for _ in 0..self.cfg.circles_per_frame {
            // Rechecked before every emission: the column may end mid-batch
            if self.cur_y > y_bound {
                break;
            }
            let offs_x = source.jitter(self.cfg.x_spread);
            let offs_y = source.jitter(self.cfg.y_spread);
            batch.push(source.request(self.cur_x as f64 + offs_x, self.cur_y as f64 + offs_y));
            self.cur_y += self.cfg.y_step;
        }
        // Checked again after the batch: the last emission may have crossed
        if self.cur_y > y_bound {
            self.cur_y = 0;
            self.cur_x += self.cfg.x_step;
        }
        batch
    }

    /// Adjust the emission rate of a scan already in progress
    pub fn set_circles_per_frame(&mut self, circles: u32) {
        self.cfg.circles_per_frame = circles;
    }

    /// The scan is done once the cursor's x exceeds width plus the end offset
    pub fn is_complete(&self) -> bool {
        self.cur_x > self.width as i32 + self.cfg.x_end_offs
    }

    pub fn cursor(&self) -> (i32, i32) {
        (self.cur_x, self.cur_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_source() -> StimulusSource {
        StimulusSource::new(&PondSettings::default())
    }

    #[test]
    fn test_pointer_down_always_emits() {
        let mut manual = ManualStimulus::default();
        assert!(manual.pointer_down());
        assert!(manual.is_held());
    }

    #[test]
    fn test_held_moves_emit_every_nth() {
        let mut manual = ManualStimulus::default();
        manual.pointer_down();
        let emitted = (0..35).filter(|_| manual.pointer_move(10)).count();
        // floor(35 / 10) droplets from moves
        assert_eq!(emitted, 3);
    }

    #[test]
    fn test_moves_without_hold_do_nothing() {
        let mut manual = ManualStimulus::default();
        let emitted = (0..50).filter(|_| manual.pointer_move(10)).count();
        assert_eq!(emitted, 0);

        manual.pointer_down();
        manual.pointer_up();
        let emitted = (0..50).filter(|_| manual.pointer_move(10)).count();
        assert_eq!(emitted, 0);
    }

    #[test]
    fn test_hold_counter_resets_on_down() {
        let mut manual = ManualStimulus::default();
        manual.pointer_down();
        for _ in 0..7 {
            manual.pointer_move(10);
        }
        // A new press restarts the throttle window
        manual.pointer_down();
        let emitted = (0..9).filter(|_| manual.pointer_move(10)).count();
        assert_eq!(emitted, 0);
    }

    #[test]
    fn test_autodraw_visits_expected_columns() {
        let cfg = AutodrawSettings {
            active: true,
            circles_per_frame: 4,
            x_start_offs: 5,
            x_step: 10,
            y_step: 30,
            x_spread: 0.0,
            y_spread: 0.0,
            ..Default::default()
        };
        // Height 20 with y_step 30: one emission completes each column
        let mut auto = Autodraw::new(cfg, 100, 20);
        let mut source = test_source();

        let mut columns = 0;
        while !auto.is_complete() {
            let batch = auto.frame_batch(&mut source);
            assert_eq!(batch.len(), 1);
            columns += 1;
            assert!(columns <= 100, "autodraw failed to terminate");
        }
        // Columns at x = 5, 15, ..., 95: ceil((100 - 5) / 10) of them
        assert_eq!(columns, 10);
        assert!(auto.cursor().0 > 100);
    }

    #[test]
    fn test_column_crossing_mid_batch_stops_emission() {
        let cfg = AutodrawSettings {
            circles_per_frame: 8,
            y_step: 40,
            x_step: 25,
            x_spread: 0.0,
            y_spread: 0.0,
            ..Default::default()
        };
        let mut auto = Autodraw::new(cfg, 200, 100);
        let mut source = test_source();

        // Emissions at y = 0, 40, 80; y = 120 crosses the bound mid-batch
        let batch = auto.frame_batch(&mut source);
        assert_eq!(batch.len(), 3);
        // And the cursor moved on to the next column immediately
        assert_eq!(auto.cursor(), (25, 0));
    }

    #[test]
    fn test_requests_are_seed_deterministic() {
        let mut a = test_source();
        let mut b = test_source();
        for i in 0..50 {
            let x = (i * 7 % 300) as f64;
            let y = (i * 13 % 300) as f64;
            assert_eq!(a.request(x, y), b.request(x, y));
        }
    }

    #[test]
    fn test_jitter_stays_within_spread() {
        let mut source = test_source();
        for _ in 0..200 {
            let j = source.jitter(30.0);
            assert!((-15.0..15.0).contains(&j));
        }
    }

    #[test]
    fn test_inverted_range_degenerates_without_fault() {
        let settings = PondSettings {
            mag_min: 100,
            mag_max: 10,
            freq_min: 80,
            freq_max: 20,
            ..Default::default()
        };
        let mut source = StimulusSource::new(&settings);
        for _ in 0..100 {
            let req = source.request(50.0, 50.0);
            // Negative spread truncates somewhere at or below the minimum
            assert!(req.mag <= 100);
            assert!(req.freq <= 80);
        }
    }

    #[test]
    fn test_last_request_is_recorded() {
        let mut source = test_source();
        assert!(source.last.is_none());
        let req = source.request(12.0, 34.0);
        assert_eq!(source.last, Some(req));
    }
}
