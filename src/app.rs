use crate::pond::Pond;
use crate::settings::PondSettings;
use crate::stimulus::{Autodraw, DropletRequest, ManualStimulus, StimulusSource};

/// Which stimulus generator drives the current frame. The handoff from
/// `Autodraw` (optionally via `Linger`) to `Manual` is one-way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Raster scan in progress
    Autodraw,
    /// Scan finished; ticking down to the auto-pause
    Linger { frames_left: u32 },
    /// Pointer-driven
    Manual,
}

impl Phase {
    pub fn name(&self) -> &str {
        match self {
            Phase::Autodraw => "Autodraw",
            Phase::Linger { .. } => "Linger",
            Phase::Manual => "Manual",
        }
    }
}

/// One simulation session: the pond, its settings, all stimulus state and
/// the pause flag live here rather than in globals, so multiple sessions
/// (and tests) can coexist.
pub struct App {
    pub pond: Pond,
    pub settings: PondSettings,
    pub paused: bool,
    pub phase: Phase,
    /// Frames ticked since startup or the last reset
    pub frames: u64,
    /// One-line outcome of the last export, shown in the status sidebar
    pub notice: Option<String>,
    source: StimulusSource,
    manual: ManualStimulus,
    autodraw: Option<Autodraw>,
}

impl App {
    pub fn new(width: u16, height: u16, settings: PondSettings) -> Self {
        let source = StimulusSource::new(&settings);
        let (phase, autodraw) = if settings.autodraw.active {
            (
                Phase::Autodraw,
                Some(Autodraw::new(settings.autodraw.clone(), width, height)),
            )
        } else {
            (Phase::Manual, None)
        };
        Self {
            pond: Pond::new(width, height),
            settings,
            paused: false,
            phase,
            frames: 0,
            notice: None,
            source,
            manual: ManualStimulus::default(),
            autodraw,
        }
    }

    /// One scheduled frame: stimulus phase dispatch, then the simulation
    /// tick. Rendering captures a fresh snapshot afterwards. A paused app
    /// does nothing here, the terminal counterpart of cancelling the
    /// pending animation-frame callback; a frame that has begun always
    /// finishes its dispatch and tick before a pause takes effect.
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        self.phase = match self.phase {
            Phase::Autodraw => self.autodraw_frame(),
            Phase::Linger { frames_left } => {
                if frames_left <= 1 {
                    self.paused = true;
                    Phase::Manual
                } else {
                    Phase::Linger {
                        frames_left: frames_left - 1,
                    }
                }
            }
            Phase::Manual => Phase::Manual,
        };
        self.pond.advance();
        self.frames += 1;
    }

    fn autodraw_frame(&mut self) -> Phase {
        let Some(auto) = self.autodraw.as_mut() else {
            return Phase::Manual;
        };
        let batch = auto.frame_batch(&mut self.source);
        let complete = auto.is_complete();
        for req in batch {
            self.pond.add_droplet(req.x, req.y, req.mag, req.color, req.freq);
        }
        if complete {
            // One-way handoff: the scan state is gone for good
            self.autodraw = None;
            match self.settings.autodraw.linger_frames {
                0 => Phase::Manual,
                frames => Phase::Linger {
                    frames_left: frames,
                },
            }
        } else {
            Phase::Autodraw
        }
    }

    /// Toggle the pause flag. Toggling twice restores the exact prior
    /// scheduling state; there is nothing else to cancel or re-arm.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    // === Pointer input (manual stimulus) ===

    pub fn pointer_down(&mut self, x: u16, y: u16) {
        if self.phase != Phase::Manual {
            return;
        }
        if self.manual.pointer_down() {
            self.emit_at(x, y);
        }
    }

    pub fn pointer_move(&mut self, x: u16, y: u16) {
        if self.phase != Phase::Manual {
            return;
        }
        if self.manual.pointer_move(self.settings.hold_interval) {
            self.emit_at(x, y);
        }
    }

    pub fn pointer_up(&mut self) {
        self.manual.pointer_up();
    }

    fn emit_at(&mut self, x: u16, y: u16) {
        let req = self.source.request(x as f64, y as f64);
        self.pond.add_droplet(req.x, req.y, req.mag, req.color, req.freq);
    }

    /// The most recent droplet request, for the status sidebar
    pub fn last_request(&self) -> Option<DropletRequest> {
        self.source.last
    }

    pub fn pointer_held(&self) -> bool {
        self.manual.is_held()
    }

    /// Scan cursor position while an autodraw is in progress
    pub fn scan_cursor(&self) -> Option<(i32, i32)> {
        self.autodraw.as_ref().map(|auto| auto.cursor())
    }

    /// Change the per-frame autodraw emission rate, reaching into a scan
    /// already in progress so the key takes effect immediately.
    pub fn adjust_circles_per_frame(&mut self, delta: i32) {
        self.settings.autodraw.adjust_circles_per_frame(delta);
        if let Some(auto) = &mut self.autodraw {
            auto.set_circles_per_frame(self.settings.autodraw.circles_per_frame);
        }
    }

    /// Clear the pond and restart the session from its configured phase,
    /// re-seeding the stimulus source.
    pub fn reset(&mut self) {
        self.pond.clear();
        self.source = StimulusSource::new(&self.settings);
        self.manual = ManualStimulus::default();
        if self.settings.autodraw.active {
            self.phase = Phase::Autodraw;
            self.autodraw = Some(Autodraw::new(
                self.settings.autodraw.clone(),
                self.pond.width(),
                self.pond.height(),
            ));
        } else {
            self.phase = Phase::Manual;
            self.autodraw = None;
        }
        self.paused = false;
        self.frames = 0;
        self.notice = None;
    }

    /// Rebuild the pond (and any in-progress scan) at new dimensions
    pub fn resize(&mut self, width: u16, height: u16) {
        self.pond.resize(width, height);
        if let Some(auto) = &mut self.autodraw {
            *auto = Autodraw::new(self.settings.autodraw.clone(), width, height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::AutodrawSettings;

    fn autodraw_settings() -> PondSettings {
        PondSettings {
            autodraw: AutodrawSettings {
                active: true,
                circles_per_frame: 4,
                x_step: 25,
                y_step: 30,
                x_spread: 0.0,
                y_spread: 0.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_tick_advances_generation() {
        let mut app = App::new(100, 100, PondSettings::default());
        let before = app.pond.generation();
        app.tick();
        assert_eq!(app.pond.generation(), before + 1);
        assert_eq!(app.frames, 1);
    }

    #[test]
    fn test_pause_gates_ticking_and_round_trips() {
        let mut app = App::new(100, 100, PondSettings::default());
        app.toggle_pause();
        let frozen = app.pond.generation();
        app.tick();
        app.tick();
        assert_eq!(app.pond.generation(), frozen);

        // Double toggle restores the prior state exactly
        app.toggle_pause();
        app.toggle_pause();
        assert!(app.paused);
        app.toggle_pause();
        assert!(!app.paused);
        app.tick();
        assert_eq!(app.pond.generation(), frozen + 1);
    }

    #[test]
    fn test_pointer_down_and_throttled_moves_emit() {
        let mut app = App::new(200, 200, PondSettings::default());
        app.pointer_down(50, 50);
        assert_eq!(app.pond.droplet_count(), 1);

        for _ in 0..35 {
            app.pointer_move(60, 60);
        }
        // floor(35 / 10) more from the held drag
        assert_eq!(app.pond.droplet_count(), 4);

        app.pointer_up();
        for _ in 0..35 {
            app.pointer_move(60, 60);
        }
        assert_eq!(app.pond.droplet_count(), 4);
    }

    #[test]
    fn test_autodraw_runs_then_hands_off_to_manual() {
        // Pond 50x20 with x_step 25: columns at x = 0, 25, 50, then done
        let mut app = App::new(50, 20, autodraw_settings());
        assert_eq!(app.phase, Phase::Autodraw);

        for _ in 0..3 {
            assert_eq!(app.phase, Phase::Autodraw);
            app.tick();
        }
        assert_eq!(app.phase, Phase::Manual);
        assert!(!app.paused);
        assert!(app.pond.droplet_count() > 0);

        // Handoff is one-way: ticking never re-enters the scan
        app.tick();
        assert_eq!(app.phase, Phase::Manual);
    }

    #[test]
    fn test_autodraw_lingers_then_auto_pauses() {
        let mut settings = autodraw_settings();
        settings.autodraw.linger_frames = 3;
        let mut app = App::new(50, 20, settings);

        for _ in 0..3 {
            app.tick();
        }
        assert_eq!(app.phase, Phase::Linger { frames_left: 3 });

        app.tick();
        app.tick();
        assert!(!app.paused);
        app.tick();
        assert!(app.paused);
        assert_eq!(app.phase, Phase::Manual);

        // Space resumes into the manual loop
        app.toggle_pause();
        let gen = app.pond.generation();
        app.tick();
        assert_eq!(app.pond.generation(), gen + 1);
    }

    #[test]
    fn test_pointer_ignored_outside_manual_phase() {
        let mut app = App::new(50, 20, autodraw_settings());
        app.pointer_down(10, 10);
        assert_eq!(app.pond.droplet_count(), 0);
    }

    #[test]
    fn test_reset_restarts_session() {
        let mut app = App::new(50, 20, autodraw_settings());
        while app.phase == Phase::Autodraw {
            app.tick();
        }
        app.toggle_pause();
        app.reset();
        assert_eq!(app.phase, Phase::Autodraw);
        assert!(!app.paused);
        assert_eq!(app.frames, 0);
        assert_eq!(app.pond.droplet_count(), 0);
    }
}
