use crate::app::App;
use crate::compositor::{self, apply_fade, FadeScale, Painter, Rgb};
use crate::view::PondView;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context, Points},
        Block, BorderType, Borders, Paragraph,
    },
    Frame,
};

const SIDEBAR_WIDTH: u16 = 24;

// UI color scheme
const BORDER_COLOR: Color = Color::Cyan;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(area);

    render_sidebar(frame, layout[0], app);
    render_canvas(frame, layout[1], app);
}

/// Interior of the canvas block in terminal cells
pub fn canvas_rect(frame_area: Rect) -> Rect {
    Rect {
        x: frame_area.x + SIDEBAR_WIDTH + 1,
        y: frame_area.y + 1,
        width: frame_area.width.saturating_sub(SIDEBAR_WIDTH + 2),
        height: frame_area.height.saturating_sub(2),
    }
}

/// Pond dimensions backing the canvas: braille resolution is 2x4 dots per
/// terminal cell.
pub fn simulation_size(frame_area: Rect) -> (u16, u16) {
    let canvas = canvas_rect(frame_area);
    (canvas.width.max(1) * 2, canvas.height.max(1) * 4)
}

/// Map a terminal mouse position to pond coordinates, aiming at the center
/// of the cell's braille dots. None outside the canvas interior.
pub fn pond_coords(frame_area: Rect, column: u16, row: u16) -> Option<(u16, u16)> {
    let canvas = canvas_rect(frame_area);
    if column < canvas.x
        || row < canvas.y
        || column >= canvas.x + canvas.width
        || row >= canvas.y + canvas.height
    {
        return None;
    }
    Some(((column - canvas.x) * 2 + 1, (row - canvas.y) * 4 + 2))
}

/// Integer lattice points of a filled disc, at braille-dot granularity.
/// One pond unit maps to one braille dot, so enumerating the lattice gives
/// the same scanline fill the image exporter rasterizes.
fn disc_points(cx: u16, cy: u16, radius: u16) -> Vec<(f64, f64)> {
    let (cx, cy, r) = (cx as i64, cy as i64, radius as i64);
    let mut points = Vec::new();
    for dy in -r..=r {
        // Scanline half-width of the disc at this row
        let half = ((r * r - dy * dy) as f64).sqrt() as i64;
        for dx in -half..=half {
            points.push(((cx + dx) as f64, (cy + dy) as f64));
        }
    }
    points
}

/// Draws the compositor's filled circles onto the ratatui canvas as point
/// clouds. Fades are baked into the point color because terminal cells carry
/// no alpha channel.
struct CanvasPainter<'a, 'b> {
    ctx: &'a mut Context<'b>,
    mode: crate::settings::BlendMode,
    background: Rgb,
    pond_height: f64,
    fill: Rgb,
}

impl Painter for CanvasPainter<'_, '_> {
    fn set_fill(&mut self, color: Rgb) {
        self.fill = color;
    }

    fn fill_circle(&mut self, x: u16, y: u16, radius: u16, alpha: u8) {
        let color = apply_fade(self.mode, self.fill, self.background, alpha);
        let coords: Vec<(f64, f64)> = disc_points(x, y, radius)
            .into_iter()
            // Canvas y grows upward; pond y grows downward
            .map(|(px, py)| (px, self.pond_height - py))
            .collect();
        self.ctx.draw(&Points {
            coords: &coords,
            color: Color::Rgb(color.r, color.g, color.b),
        });
    }
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let pond_width = app.pond.width() as f64;
    let pond_height = app.pond.height() as f64;
    let fade = FadeScale {
        numer: app.settings.fade_numer,
        denom: app.settings.fade_denom,
    };
    let bg = Rgb::unpack(app.settings.background);

    let canvas = Canvas::default()
        .block(styled_block(" Pond "))
        .background_color(Color::Rgb(bg.r, bg.g, bg.b))
        .marker(Marker::Braille)
        .x_bounds([0.0, pond_width])
        .y_bounds([0.0, pond_height])
        .paint(|ctx| {
            // Fresh snapshot per paint: the view never crosses a tick
            let view = PondView::capture(&app.pond);
            let mut painter = CanvasPainter {
                ctx,
                mode: app.settings.blend_mode,
                background: bg,
                pond_height,
                fill: Rgb {
                    r: 255,
                    g: 255,
                    b: 255,
                },
            };
            compositor::paint(&view, fade, &mut painter);
        });
    frame.render_widget(canvas, area);
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),  // Status
            Constraint::Length(10), // Parameters
            Constraint::Min(12),    // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_params_box(frame, sections[1], app);
    render_controls_box(frame, sections[2]);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Ripple Pond ");

    let status_text = if app.paused { "PAUSED" } else { "RUNNING" };
    let status_color = if app.paused {
        HIGHLIGHT_COLOR
    } else {
        BORDER_COLOR
    };

    let content = vec![
        Line::from(Span::styled(
            format!("Droplets: {}", app.pond.droplet_count()),
            Style::default().fg(TEXT_COLOR),
        )),
        Line::from(Span::styled(
            format!("Ripples:  {}", app.pond.total_ripples()),
            Style::default().fg(TEXT_COLOR),
        )),
        Line::from(Span::styled(
            format!("Frame:    {}", app.frames),
            Style::default().fg(DIM_TEXT_COLOR),
        )),
        {
            let mut spans = vec![
                Span::styled(status_text, Style::default().fg(status_color)),
                Span::styled(
                    format!("  [{}]", app.phase.name()),
                    Style::default().fg(DIM_TEXT_COLOR),
                ),
            ];
            if app.pointer_held() {
                spans.push(Span::styled("  drawing", Style::default().fg(HIGHLIGHT_COLOR)));
            }
            Line::from(spans)
        },
        // Outcome of the last export (or other one-shot action)
        Line::from(Span::styled(
            app.notice.clone().unwrap_or_else(|| "-".to_string()),
            Style::default().fg(DIM_TEXT_COLOR),
        )),
    ];

    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn render_params_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Parameters ");
    let settings = &app.settings;

    let make_line = |label: &str, value: String| {
        Line::from(Span::styled(
            format!("{}: {}", label, value),
            Style::default().fg(TEXT_COLOR),
        ))
    };

    let last = app
        .last_request()
        .map(|r| format!("#{:06X} m{}", r.color, r.mag))
        .unwrap_or_else(|| "-".to_string());

    let scan = app
        .scan_cursor()
        .map(|(x, y)| format!("({}, {})", x, y))
        .unwrap_or_else(|| "-".to_string());

    let content = vec![
        make_line("Mag", format!("{}-{}", settings.mag_min, settings.mag_max)),
        make_line(
            "Freq",
            format!("{}-{}", settings.freq_min, settings.freq_max),
        ),
        make_line("Hold", format!("{}", settings.hold_interval)),
        make_line("Blend", settings.blend_mode.name().to_string()),
        make_line(
            "Fade",
            format!("{}/{}", settings.fade_numer, settings.fade_denom),
        ),
        make_line("Seed", settings.seed.clone()),
        make_line("Last", last),
        make_line("Scan", scan),
    ];

    frame.render_widget(Paragraph::new(content).block(block), area);
}

fn render_controls_box(frame: &mut Frame, area: Rect) {
    let block = styled_block(" Controls ");
    let dim = Style::default().fg(DIM_TEXT_COLOR);

    let content = vec![
        Line::from(Span::styled("Click  drop droplet", dim)),
        Line::from(Span::styled("Drag   drop trail", dim)),
        Line::from(Span::styled("Space  pause/resume", dim)),
        Line::from(Span::styled("b      blend mode", dim)),
        Line::from(Span::styled("[ ]    hold interval", dim)),
        Line::from(Span::styled("- =    fade strength", dim)),
        Line::from(Span::styled(", .    scan density", dim)),
        Line::from(Span::styled("x      export PNG", dim)),
        Line::from(Span::styled("r      reset", dim)),
        Line::from(Span::styled("q      quit", dim)),
    ];

    frame.render_widget(Paragraph::new(content).block(block), area);
}
