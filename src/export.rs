use crate::compositor::{self, FadeScale, Painter, Rgb};
use crate::settings::{BlendMode, PondSettings};
use crate::view::PondView;
use image::{Rgba, RgbaImage};
use std::fs::File;
use std::path::Path;

/// Rasterizes the compositor's filled-circle calls into an RGBA buffer.
pub struct ImagePainter {
    img: RgbaImage,
    mode: BlendMode,
    fill: Rgb,
}

impl ImagePainter {
    pub fn new(width: u16, height: u16, mode: BlendMode, background: Rgb) -> Self {
        let img = RgbaImage::from_pixel(
            width as u32,
            height as u32,
            Rgba([background.r, background.g, background.b, 255]),
        );
        Self {
            img,
            mode,
            fill: Rgb {
                r: 255,
                g: 255,
                b: 255,
            },
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.img
    }
}

impl Painter for ImagePainter {
    fn set_fill(&mut self, color: Rgb) {
        self.fill = color;
    }

    fn fill_circle(&mut self, x: u16, y: u16, radius: u16, alpha: u8) {
        let (w, h) = (self.img.width() as i64, self.img.height() as i64);
        let (cx, cy, r) = (x as i64, y as i64, radius as i64);
        let a = alpha as u32;
        for dy in -r..=r {
            let py = cy + dy;
            if py < 0 || py >= h {
                continue;
            }
            // Scanline half-width of the disc at this row
            let half = ((r * r - dy * dy) as f64).sqrt() as i64;
            for px in (cx - half).max(0)..=(cx + half).min(w - 1) {
                let pixel = self.img.get_pixel_mut(px as u32, py as u32);
                match self.mode {
                    // Integer src-over, so overlapping ripples accumulate
                    BlendMode::Alpha => {
                        let src = [self.fill.r, self.fill.g, self.fill.b];
                        for (dst, s) in pixel.0.iter_mut().zip(src) {
                            *dst = ((s as u32 * a + *dst as u32 * (255 - a)) / 255) as u8;
                        }
                        pixel.0[3] = 255;
                    }
                    BlendMode::ChannelScale => {
                        pixel.0 = [
                            (self.fill.r as u32 * a / 255) as u8,
                            (self.fill.g as u32 * a / 255) as u8,
                            (self.fill.b as u32 * a / 255) as u8,
                            255,
                        ];
                    }
                }
            }
        }
    }
}

/// Render one frame snapshot to an RGBA image with the shared compositor
pub fn render_frame(
    view: &PondView,
    width: u16,
    height: u16,
    settings: &PondSettings,
) -> RgbaImage {
    let fade = FadeScale {
        numer: settings.fade_numer,
        denom: settings.fade_denom,
    };
    let mut painter = ImagePainter::new(
        width,
        height,
        settings.blend_mode,
        Rgb::unpack(settings.background),
    );
    compositor::paint(view, fade, &mut painter);
    painter.into_image()
}

/// Save the current frame as a PNG snapshot
pub fn save_png(
    path: &Path,
    view: &PondView,
    width: u16,
    height: u16,
    settings: &PondSettings,
) -> Result<(), String> {
    render_frame(view, width, height, settings)
        .save(path)
        .map_err(|e| format!("Failed to write snapshot: {}", e))
}

/// Streams rendered frames into an animated GIF
pub struct GifRecorder {
    encoder: gif::Encoder<File>,
    width: u16,
    height: u16,
}

impl GifRecorder {
    pub fn create(path: &Path, width: u16, height: u16) -> Result<Self, String> {
        let file =
            File::create(path).map_err(|e| format!("Failed to create gif file: {}", e))?;
        let mut encoder = gif::Encoder::new(file, width, height, &[])
            .map_err(|e| format!("Failed to start gif encoder: {}", e))?;
        encoder
            .set_repeat(gif::Repeat::Infinite)
            .map_err(|e| format!("Failed to set gif repeat: {}", e))?;
        Ok(Self {
            encoder,
            width,
            height,
        })
    }

    /// Append one rendered frame (2 fps-ish GIF timing at a 3cs delay)
    pub fn add_frame(&mut self, img: &RgbaImage) -> Result<(), String> {
        let mut data = img.clone().into_raw();
        let mut frame = gif::Frame::from_rgba_speed(self.width, self.height, &mut data, 10);
        frame.delay = 3;
        self.encoder
            .write_frame(&frame)
            .map_err(|e| format!("Failed to write gif frame: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pond::Pond;

    fn small_pond() -> Pond {
        let mut pond = Pond::new(100, 100);
        pond.add_droplet(50, 50, 20, 0xFFFFFF, 5);
        pond.advance();
        pond.advance();
        pond
    }

    #[test]
    fn test_rendered_frame_paints_over_background() {
        let pond = small_pond();
        let view = PondView::capture(&pond);
        let settings = PondSettings::default();
        let img = render_frame(&view, 100, 100, &settings);

        assert_eq!((img.width(), img.height()), (100, 100));
        // The ripple center must differ from the untouched background
        assert_ne!(img.get_pixel(50, 50).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_save_png_writes_file() {
        let pond = small_pond();
        let view = PondView::capture(&pond);
        let settings = PondSettings::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.png");

        save_png(&path, &view, 100, 100, &settings).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_gif_recorder_appends_frames() {
        let pond = small_pond();
        let view = PondView::capture(&pond);
        let settings = PondSettings::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.gif");

        let mut recorder = GifRecorder::create(&path, 100, 100).unwrap();
        let img = render_frame(&view, 100, 100, &settings);
        recorder.add_frame(&img).unwrap();
        recorder.add_frame(&img).unwrap();
        drop(recorder);

        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
