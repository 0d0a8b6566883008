use serde::{Deserialize, Serialize};

/// How a ripple's fade factor is applied when painting
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Blend the droplet color toward the background by the fade factor
    #[default]
    Alpha,
    /// Attenuate the color channels themselves by the fade factor
    ChannelScale,
}

impl BlendMode {
    pub fn name(&self) -> &str {
        match self {
            BlendMode::Alpha => "Alpha",
            BlendMode::ChannelScale => "ChannelScale",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            BlendMode::Alpha => BlendMode::ChannelScale,
            BlendMode::ChannelScale => BlendMode::Alpha,
        }
    }
}

/// Raster-scan autodraw parameters. Offsets may be negative to start or end
/// the scan outside the pond edges; spreads jitter each emission around the
/// nominal grid point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutodrawSettings {
    /// Run the raster scan at startup instead of waiting for pointer input
    pub active: bool,
    /// Max droplets emitted per frame while scanning (1-64)
    pub circles_per_frame: u32,
    pub x_start_offs: i32,
    pub x_end_offs: i32,
    pub y_start_offs: i32,
    pub y_end_offs: i32,
    /// Random displacement window around each grid point, per axis
    pub x_spread: f64,
    pub y_spread: f64,
    /// Cursor advance per emission (y) and per column (x)
    pub x_step: i32,
    pub y_step: i32,
    /// Frames to keep ticking after the scan completes before auto-pausing
    /// (0 = hand off to the manual generator immediately, without pausing)
    pub linger_frames: u32,
}

impl Default for AutodrawSettings {
    fn default() -> Self {
        Self {
            active: false,
            circles_per_frame: 4,
            x_start_offs: 0,
            x_end_offs: 0,
            y_start_offs: 0,
            y_end_offs: 0,
            x_spread: 30.0,
            y_spread: 30.0,
            x_step: 40,
            y_step: 40,
            linger_frames: 0,
        }
    }
}

impl AutodrawSettings {
    pub fn adjust_circles_per_frame(&mut self, delta: i32) {
        self.circles_per_frame = (self.circles_per_frame as i32 + delta).clamp(1, 64) as u32;
    }
}

/// All pond settings consolidated into one struct.
///
/// The magnitude and frequency ranges are deliberately not validated:
/// `min > max` gives a negative spread and visually degenerate (but
/// perfectly safe) droplets, which is accepted domain behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PondSettings {
    // === Stimulus Parameters ===
    /// Smallest max-magnitude a new droplet's ripples can get
    pub mag_min: u16,
    pub mag_max: u16,
    /// Ticks between ripple spawns, sampled per droplet
    pub freq_min: u16,
    pub freq_max: u16,
    /// Every Nth pointer-move while held emits a droplet (1 = every move)
    pub hold_interval: u32,

    // === Visual Parameters ===
    pub blend_mode: BlendMode,
    /// Fade scale numerator/denominator; the ratio must stay below one so a
    /// fresh ripple renders near-opaque and a retired one fully transparent
    pub fade_numer: u32,
    pub fade_denom: u32,
    /// Background color (packed RGB); also folded into the random seed
    pub background: u32,

    // === Randomness ===
    /// String seed for the stimulus RNG and the color stream
    pub seed: String,

    pub autodraw: AutodrawSettings,
}

impl Default for PondSettings {
    fn default() -> Self {
        Self {
            mag_min: 15,
            mag_max: 60,
            freq_min: 20,
            freq_max: 80,
            hold_interval: 10,
            blend_mode: BlendMode::default(),
            // Scales by 0.2 without a float division per ripple
            fade_numer: 1,
            fade_denom: 5,
            background: 0x000000,
            seed: "aldf".to_string(),
            autodraw: AutodrawSettings::default(),
        }
    }
}

impl PondSettings {
    /// Hold interval has a hard floor of 1 (every move emits)
    pub fn adjust_hold_interval(&mut self, delta: i32) {
        self.hold_interval = (self.hold_interval as i32 + delta).max(1) as u32;
    }

    /// Denominator zero would divide by zero in the fade computation
    pub fn adjust_fade_denom(&mut self, delta: i32) {
        self.fade_denom = (self.fade_denom as i32 + delta).max(1) as u32;
    }

    pub fn cycle_blend_mode(&mut self) {
        self.blend_mode = self.blend_mode.next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hold_interval_floor() {
        let mut settings = PondSettings::default();
        settings.adjust_hold_interval(-100);
        assert_eq!(settings.hold_interval, 1);
    }

    #[test]
    fn test_fade_denom_floor() {
        let mut settings = PondSettings::default();
        settings.adjust_fade_denom(-100);
        assert_eq!(settings.fade_denom, 1);
    }

    #[test]
    fn test_blend_mode_cycle_round_trips() {
        let mode = BlendMode::default();
        assert_eq!(mode.next().next(), mode);
    }

    #[test]
    fn test_inverted_ranges_are_accepted() {
        // No validation on purpose: degenerate spread, not an error
        let settings = PondSettings {
            mag_min: 100,
            mag_max: 10,
            ..Default::default()
        };
        assert!(settings.mag_min > settings.mag_max);
    }
}
