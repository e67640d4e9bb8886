// Per-frame contract shared by the splash and terminal screens.
//
// Each frame a screen draws its content, the shared `EffectPipeline`
// post-processes it (glow → scanlines → noise), and finally the screen's own
// `CorruptionController` is ticked and, when active, corrupts the result.
// `render_frame` is that sequence; screens only supply content and state.

use crate::config::{AppConfig, GlitchConfig, Palette};
use crate::corruption::CorruptionController;
use crate::font::BitmapFont;
use crate::fx::EffectPipeline;
use crate::glitch::glitch;
use crate::rng::FxRng;
use crate::sound::Sound;
use crate::types::{Color, FrameBuffer};

/// Input gathered from the window for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameInput {
    pub typed: Vec<char>,
    pub enter: bool,
    pub backspace: bool,
    pub up: bool,
    pub down: bool,
    pub escape: bool,
}

/// What the app loop should do after a screen's update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// This screen is done; hand over to the next one.
    Next,
    Quit,
}

/// Everything screens need to draw: colors, font, effect stack, glitching.
/// Read-only for the whole session.
#[derive(Debug, Clone)]
pub struct Theme {
    pub palette: Palette,
    pub font: BitmapFont,
    pub pipeline: EffectPipeline,
    glitch: GlitchConfig,
    charset: Vec<char>,
}

impl Theme {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            palette: cfg.palette(),
            font: BitmapFont::new(cfg.font.scale),
            pipeline: EffectPipeline::new(cfg.effects.clone()),
            charset: cfg.glitch.charset_chars(),
            glitch: cfg.glitch.clone(),
        }
    }

    /// Glitch `text` for this frame when text glitching is on.
    pub fn glitched(&self, text: &str, rng: &mut FxRng) -> String {
        if self.glitch.enabled {
            glitch(text, self.glitch.chance, &self.charset, rng)
        } else {
            text.to_string()
        }
    }

    pub fn text(&self, text: &str, color: Color) -> FrameBuffer {
        self.font.render(text, color)
    }
}

pub trait Screen {
    /// Consume this frame's input and advance timelines. Sound cues for the
    /// input go to `sound`.
    fn update(&mut self, input: &FrameInput, now: f64, sound: &mut Sound) -> Flow;

    /// Draw raw content (no post-processing) into `fb`.
    fn draw(&mut self, fb: &mut FrameBuffer, theme: &Theme, now: f64, rng: &mut FxRng);

    /// This screen's private corruption timer.
    fn corruption_mut(&mut self) -> &mut CorruptionController;
}

/// Draw → effects → corruption. Returns the frame to present.
pub fn render_frame(
    screen: &mut dyn Screen,
    mut fb: FrameBuffer,
    theme: &Theme,
    now: f64,
    rng: &mut FxRng,
) -> FrameBuffer {
    screen.draw(&mut fb, theme, now, rng);
    theme.pipeline.apply(&mut fb, rng, now);
    let corruption = screen.corruption_mut();
    if corruption.tick(now, rng) { corruption.apply(&fb, rng) } else { fb }
}
