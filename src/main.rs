mod app;
mod color;
mod compositor;
mod config;
mod export;
mod pond;
mod settings;
mod stimulus;
mod ui;
mod view;

use app::App;
use clap::Parser;
use config::AppConfig;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use export::GifRecorder;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use settings::{BlendMode, PondSettings};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use view::PondView;

#[derive(Parser, Debug)]
#[command(name = "ripple-pond")]
#[command(about = "Interactive ripple pond simulation in the terminal")]
struct Args {
    // === Randomness ===
    /// String seed for the stimulus RNG and the color stream
    #[arg(long)]
    seed: Option<String>,

    // === Stimulus Parameters ===
    /// Minimum max-magnitude for new droplets' ripples
    #[arg(long = "mag-min")]
    mag_min: Option<u16>,

    /// Maximum max-magnitude for new droplets' ripples
    #[arg(long = "mag-max")]
    mag_max: Option<u16>,

    /// Minimum ticks between ripple spawns per droplet
    #[arg(long = "freq-min")]
    freq_min: Option<u16>,

    /// Maximum ticks between ripple spawns per droplet
    #[arg(long = "freq-max")]
    freq_max: Option<u16>,

    /// Emit a droplet on every Nth pointer-move while held
    #[arg(long = "hold-interval")]
    hold_interval: Option<u32>,

    // === Visual Parameters ===
    /// Blend mode (alpha, channel)
    #[arg(long)]
    blend: Option<String>,

    /// Fade scale numerator
    #[arg(long = "fade-numer")]
    fade_numer: Option<u32>,

    /// Fade scale denominator
    #[arg(long = "fade-denom")]
    fade_denom: Option<u32>,

    /// Background color as hex (e.g. 000000 or #101820)
    #[arg(long)]
    background: Option<String>,

    // === Autodraw ===
    /// Start with the raster-scan autodraw instead of pointer input
    #[arg(long, default_value = "false")]
    autodraw: bool,

    /// Max droplets emitted per autodraw frame
    #[arg(long = "circles-per-frame")]
    circles_per_frame: Option<u32>,

    /// Scan start offset on the x axis (may be negative)
    #[arg(long = "x-start")]
    x_start: Option<i32>,

    /// Scan end offset past the right edge (may be negative)
    #[arg(long = "x-end")]
    x_end: Option<i32>,

    /// Scan start offset on the y axis (may be negative)
    #[arg(long = "y-start")]
    y_start: Option<i32>,

    /// Scan end offset past the bottom edge (may be negative)
    #[arg(long = "y-end")]
    y_end: Option<i32>,

    /// Jitter window around each grid point, x axis
    #[arg(long = "x-spread")]
    x_spread: Option<f64>,

    /// Jitter window around each grid point, y axis
    #[arg(long = "y-spread")]
    y_spread: Option<f64>,

    /// Cursor advance per column
    #[arg(long = "x-step")]
    x_step: Option<i32>,

    /// Cursor advance per emission within a column
    #[arg(long = "y-step")]
    y_step: Option<i32>,

    /// Frames to linger after the scan completes before auto-pausing
    #[arg(long)]
    linger: Option<u32>,

    // === Files ===
    /// Load configuration from a JSON file instead of the default path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Record every running frame to an animated GIF at this path
    #[arg(long)]
    record: Option<PathBuf>,
}

fn parse_blend_mode(s: &str) -> BlendMode {
    match s.to_lowercase().as_str() {
        "channel" | "channelscale" | "channel-scale" | "scale" => BlendMode::ChannelScale,
        _ => BlendMode::Alpha,
    }
}

fn parse_hex_color(s: &str) -> u32 {
    let trimmed = s.trim_start_matches('#').trim_start_matches("0x");
    u32::from_str_radix(trimmed, 16).unwrap_or(0) & 0xFF_FF_FF
}

/// Layer CLI overrides on top of the loaded configuration. Magnitude and
/// frequency ranges are passed through unclamped; inverted ranges are
/// accepted degenerate behavior, not input errors.
fn apply_args(settings: &mut PondSettings, args: &Args) {
    if let Some(seed) = &args.seed {
        settings.seed = seed.clone();
    }
    if let Some(v) = args.mag_min {
        settings.mag_min = v;
    }
    if let Some(v) = args.mag_max {
        settings.mag_max = v;
    }
    if let Some(v) = args.freq_min {
        settings.freq_min = v;
    }
    if let Some(v) = args.freq_max {
        settings.freq_max = v;
    }
    if let Some(v) = args.hold_interval {
        settings.hold_interval = v.max(1);
    }
    if let Some(blend) = &args.blend {
        settings.blend_mode = parse_blend_mode(blend);
    }
    if let Some(v) = args.fade_numer {
        settings.fade_numer = v;
    }
    if let Some(v) = args.fade_denom {
        settings.fade_denom = v.max(1);
    }
    if let Some(background) = &args.background {
        settings.background = parse_hex_color(background);
    }

    let auto = &mut settings.autodraw;
    auto.active = auto.active || args.autodraw;
    if let Some(v) = args.circles_per_frame {
        auto.circles_per_frame = v.clamp(1, 64);
    }
    if let Some(v) = args.x_start {
        auto.x_start_offs = v;
    }
    if let Some(v) = args.x_end {
        auto.x_end_offs = v;
    }
    if let Some(v) = args.y_start {
        auto.y_start_offs = v;
    }
    if let Some(v) = args.y_end {
        auto.y_end_offs = v;
    }
    if let Some(v) = args.x_spread {
        auto.x_spread = v;
    }
    if let Some(v) = args.y_spread {
        auto.y_spread = v;
    }
    if let Some(v) = args.x_step {
        auto.x_step = v;
    }
    if let Some(v) = args.y_step {
        auto.y_step = v;
    }
    if let Some(v) = args.linger {
        auto.linger_frames = v;
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_default(),
    };
    apply_args(&mut config.settings, &args);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Size the pond to the canvas at braille resolution
    let size = terminal.size()?;
    let frame_rect = Rect::new(0, 0, size.width, size.height);
    let (pond_width, pond_height) = ui::simulation_size(frame_rect);
    let mut app = App::new(pond_width, pond_height, config.settings);

    let mut recorder = match &args.record {
        Some(path) => Some(GifRecorder::create(path, pond_width, pond_height)?),
        None => None,
    };

    // Run the app
    let res = run_app(&mut terminal, &mut app, &mut recorder);

    // Cleanup
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Persist the (possibly adjusted) settings for the next session
    if let Some(path) = AppConfig::default_path() {
        let persisted = AppConfig {
            version: config.version,
            settings: app.settings.clone(),
        };
        if let Err(err) = persisted.save_to_file(&path) {
            eprintln!("Warning: {}", err);
        }
    }

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    recorder: &mut Option<GifRecorder>,
) -> io::Result<()> {
    // Target ~60fps for smooth animation
    const FRAME_DURATION: Duration = Duration::from_millis(16);

    loop {
        // Render current state
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events with timeout
        if event::poll(FRAME_DURATION)? {
            match event::read()? {
                Event::Key(key) => {
                    // Only process Press events
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }

                    // Handle Ctrl+C
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        return Ok(());
                    }

                    match key.code {
                        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(()),
                        KeyCode::Char(' ') => app.toggle_pause(),
                        KeyCode::Char('b') | KeyCode::Char('B') => {
                            app.settings.cycle_blend_mode()
                        }
                        KeyCode::Char('[') => app.settings.adjust_hold_interval(-1),
                        KeyCode::Char(']') => app.settings.adjust_hold_interval(1),
                        // Larger denominator means dimmer ripples
                        KeyCode::Char('-') => app.settings.adjust_fade_denom(1),
                        KeyCode::Char('=') | KeyCode::Char('+') => {
                            app.settings.adjust_fade_denom(-1)
                        }
                        KeyCode::Char(',') => app.adjust_circles_per_frame(-1),
                        KeyCode::Char('.') => app.adjust_circles_per_frame(1),
                        KeyCode::Char('r') | KeyCode::Char('R') => app.reset(),
                        KeyCode::Char('x') | KeyCode::Char('X') => {
                            let path =
                                PathBuf::from(format!("ripple-pond-{:06}.png", app.frames));
                            export_snapshot(app, &path);
                        }
                        _ => {}
                    }
                }
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    handle_mouse(app, Rect::new(0, 0, size.width, size.height), mouse);
                }
                Event::Resize(width, height) => {
                    let (w, h) = ui::simulation_size(Rect::new(0, 0, width, height));
                    app.resize(w, h);
                    // GIF dimensions are fixed at creation; stop recording
                    *recorder = None;
                }
                _ => {}
            }
        }

        // Run simulation tick
        app.tick();

        record_frame(app, recorder);
    }
}

fn handle_mouse(app: &mut App, frame_area: Rect, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if let Some((x, y)) = ui::pond_coords(frame_area, mouse.column, mouse.row) {
                app.pointer_down(x, y);
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if let Some((x, y)) = ui::pond_coords(frame_area, mouse.column, mouse.row) {
                app.pointer_move(x, y);
            }
        }
        MouseEventKind::Up(MouseButton::Left) => app.pointer_up(),
        _ => {}
    }
}

/// Export the current frame, surfacing the outcome in the status sidebar
fn export_snapshot(app: &mut App, path: &Path) {
    let result = {
        let view = PondView::capture(&app.pond);
        export::save_png(
            path,
            &view,
            app.pond.width(),
            app.pond.height(),
            &app.settings,
        )
    };
    app.notice = Some(match result {
        Ok(()) => format!("Saved {}", path.display()),
        Err(err) => err,
    });
}

fn record_frame(app: &App, recorder: &mut Option<GifRecorder>) {
    let mut failed = false;
    if let Some(rec) = recorder.as_mut() {
        if !app.paused {
            let view = PondView::capture(&app.pond);
            let img = export::render_frame(
                &view,
                app.pond.width(),
                app.pond.height(),
                &app.settings,
            );
            failed = rec.add_frame(&img).is_err();
        }
    }
    if failed {
        *recorder = None;
    }
}
