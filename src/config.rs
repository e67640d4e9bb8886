// Configuration for the CRT terminal, loaded once from `crt.toml`.
//
// Every field has a default, so an empty or missing file gives the stock
// green-phosphor look. Out-of-range values are clamped (and logged) by
// `AppConfig::sanitized` rather than rejected: effects are cosmetic and a
// bad knob must never keep the terminal from starting.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::Error;
use crate::types::Color;

pub const DEFAULT_CONFIG_PATH: &str = "crt.toml";

/// Symbols used for text glitching when no charset is configured.
pub const DEFAULT_GLITCH_CHARSET: &str = concat!(
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "0123456789",
    "!@#$%^&*()_+-=~[]{}|;:',.<>?/\\",
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Green,
    Amber,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub text: Color,
    pub glow: Color,
}

impl ColorScheme {
    pub fn palette(self) -> Palette {
        match self {
            ColorScheme::Green => Palette {
                bg: Color::rgb(10, 20, 10),
                text: Color::rgb(80, 255, 80),
                glow: Color::rgba(80, 255, 80, 80),
            },
            ColorScheme::Amber => Palette {
                bg: Color::rgb(30, 20, 10),
                text: Color::rgb(255, 200, 80),
                glow: Color::rgba(255, 200, 80, 80),
            },
            ColorScheme::Blue => Palette {
                bg: Color::rgb(10, 20, 30),
                text: Color::rgb(80, 200, 255),
                glow: Color::rgba(80, 200, 255, 80),
            },
        }
    }
}

// ----------------------------- effect sections -----------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanlineConfig {
    pub enabled: bool,
    pub opacity: i64,
    /// Height of each dark band and of each gap between bands.
    pub spacing: i64,
    /// Rows per second the bands roll downwards; 0 keeps them static.
    pub roll_speed: f64,
    /// Horizontal drift applied across the screen height while rolling.
    pub skew: i64,
}

impl Default for ScanlineConfig {
    fn default() -> Self {
        Self { enabled: true, opacity: 64, spacing: 4, roll_speed: 0.0, skew: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub enabled: bool,
    pub opacity: i64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self { enabled: false, opacity: 16 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlowConfig {
    pub enabled: bool,
    /// Falls back to the palette's glow color.
    pub color: Option<Color>,
    pub radius: i64,
}

impl Default for GlowConfig {
    fn default() -> Self {
        Self { enabled: false, color: None, radius: 4 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JitterConfig {
    pub enabled: bool,
    pub amount: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlickerConfig {
    pub enabled: bool,
    pub intensity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    pub scanline: ScanlineConfig,
    pub noise: NoiseConfig,
    pub glow: GlowConfig,
    pub jitter: JitterConfig,
    pub flicker: FlickerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlitchConfig {
    pub enabled: bool,
    pub chance: f64,
    pub charset: String,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self { enabled: true, chance: 0.05, charset: DEFAULT_GLITCH_CHARSET.to_string() }
    }
}

impl GlitchConfig {
    pub fn charset_chars(&self) -> Vec<char> {
        self.charset.chars().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CorruptionConfig {
    pub enabled: bool,
    /// Probability per frame (not per second) of starting a burst.
    pub chance: f64,
    /// Seconds a burst lasts.
    pub duration: f64,
    /// 0–1, how many bands get shifted.
    pub intensity: f64,
    /// Band height in pixels.
    pub block_size: i64,
}

impl Default for CorruptionConfig {
    fn default() -> Self {
        Self { enabled: true, chance: 0.012, duration: 0.75, intensity: 0.6, block_size: 80 }
    }
}

// ----------------------------- app sections --------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: usize,
    pub height: usize,
    pub target_fps: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { title: "Cyberpunk CRT Terminal".into(), width: 960, height: 600, target_fps: 60 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Integer upscale of the 5x7 glyphs.
    pub scale: usize,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self { scale: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub prompt: String,
    pub max_lines: usize,
    /// Simulated command latency in seconds.
    pub command_delay: f64,
    pub margin: i64,
    /// Extra pixels between text rows.
    pub line_spacing: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".into(),
            max_lines: 100,
            command_delay: 0.2,
            margin: 16,
            line_spacing: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SplashConfig {
    pub enabled: bool,
    pub logo_path: PathBuf,
    pub intro_duration: f64,
    pub boot_duration: f64,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            logo_path: PathBuf::from("Assets/logo.png"),
            intro_duration: 2.8,
            boot_duration: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub enabled: bool,
    /// Directory holding the key-click and startup clips.
    pub dir: PathBuf,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self { enabled: true, dir: PathBuf::from("Assets/sounds") }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub color_scheme: ColorScheme,
    /// Fixed seed for the random source; random when absent.
    pub seed: Option<u64>,
    pub window: WindowConfig,
    pub font: FontConfig,
    pub terminal: TerminalConfig,
    pub splash: SplashConfig,
    pub sound: SoundConfig,
    pub effects: EffectConfig,
    pub glitch: GlitchConfig,
    pub corruption: CorruptionConfig,
}

impl AppConfig {
    /// Read `path`, or `crt.toml` when no path is given. A missing default
    /// file means "all defaults"; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let cfg = match path {
            Some(p) => Self::from_toml(&fs::read_to_string(p)?)?,
            None => match fs::read_to_string(DEFAULT_CONFIG_PATH) {
                Ok(text) => Self::from_toml(&text)?,
                Err(e) if e.kind() == ErrorKind::NotFound => Self::default(),
                Err(e) => return Err(e.into()),
            },
        };
        Ok(cfg.sanitized())
    }

    pub fn from_toml(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    pub fn palette(&self) -> Palette {
        self.color_scheme.palette()
    }

    /// Clamp every knob into its valid range and resolve the glow color.
    pub fn sanitized(mut self) -> Self {
        let fx = &mut self.effects;
        fx.scanline.opacity = clamp_int("effects.scanline.opacity", fx.scanline.opacity, 0, 255);
        fx.scanline.spacing = clamp_int("effects.scanline.spacing", fx.scanline.spacing, 1, i64::MAX);
        fx.scanline.roll_speed =
            clamp_float("effects.scanline.roll_speed", fx.scanline.roll_speed, 0.0, f64::MAX);
        fx.scanline.skew =
            clamp_int("effects.scanline.skew", fx.scanline.skew, i32::MIN as i64, i32::MAX as i64);
        fx.noise.opacity = clamp_int("effects.noise.opacity", fx.noise.opacity, 0, 255);
        fx.glow.radius = clamp_int("effects.glow.radius", fx.glow.radius, 0, i64::MAX);
        fx.jitter.amount = clamp_int("effects.jitter.amount", fx.jitter.amount, 0, i64::MAX);
        fx.flicker.intensity = clamp_float("effects.flicker.intensity", fx.flicker.intensity, 0.0, 1.0);
        fx.glow.color.get_or_insert(self.color_scheme.palette().glow);

        let g = &mut self.glitch;
        g.chance = clamp_float("glitch.chance", g.chance, 0.0, 1.0);
        if g.charset.is_empty() {
            warn!("glitch.charset is empty, using the default symbols");
            g.charset = DEFAULT_GLITCH_CHARSET.to_string();
        }

        let c = &mut self.corruption;
        c.chance = clamp_float("corruption.chance", c.chance, 0.0, 1.0);
        c.duration = clamp_float("corruption.duration", c.duration, f64::EPSILON, f64::MAX);
        c.intensity = clamp_float("corruption.intensity", c.intensity, 0.0, 1.0);
        c.block_size = clamp_int("corruption.block_size", c.block_size, 1, i64::MAX);

        let t = &mut self.terminal;
        t.max_lines = t.max_lines.max(1);
        t.command_delay = clamp_float("terminal.command_delay", t.command_delay, 0.0, f64::MAX);
        t.margin = clamp_int("terminal.margin", t.margin, 0, i64::MAX);

        self.font.scale = self.font.scale.max(1);
        self.window.width = self.window.width.max(1);
        self.window.height = self.window.height.max(1);
        self.window.target_fps = self.window.target_fps.max(1);
        self
    }
}

fn clamp_int(name: &str, v: i64, lo: i64, hi: i64) -> i64 {
    let out = v.clamp(lo, hi);
    if out != v {
        warn!(option = name, value = v, clamped = out, "config value out of range");
    }
    out
}

fn clamp_float(name: &str, v: f64, lo: f64, hi: f64) -> f64 {
    let out = if v.is_nan() { lo } else { v.clamp(lo, hi) };
    if out != v {
        warn!(option = name, value = v, clamped = out, "config value out of range");
    }
    out
}
