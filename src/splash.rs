// Boot sequence shown before the terminal.
//
// Three phases, each driven purely by elapsed time since it began:
// a "press enter" prompt, a logo intro (wipe reveal, shake, random
// inversion) and a fake BIOS log with a fade-in, typewriter lines and a
// progress bar. The splash owns its own corruption timer, independent of
// the terminal's.

use std::path::Path;

use image::imageops::{self, FilterType};
use rand::Rng;
use tracing::{info, warn};

use crate::config::{CorruptionConfig, SplashConfig};
use crate::corruption::CorruptionController;
use crate::error::Error;
use crate::rng::FxRng;
use crate::screen::{Flow, FrameInput, Screen, Theme};
use crate::sound::Sound;
use crate::types::{FrameBuffer, Rect};

const BOOT_LINES: [&str; 10] = [
    "CYBERPUNK SYSTEMS BIOS v3.2",
    "Copyright (C) 2045 Night City",
    "",
    "Memory Test: 16384K OK",
    "Detecting Devices...",
    "  IDE0: Quantum Fireball 512MB",
    "  IDE1: Not Detected",
    "  SCSI: Arasaka Cyberdeck v2.1",
    "",
    "Booting...",
];

const PROMPT: &str = "press enter to continue";
const INTRO_TEXT: &str = "parsing memory fragments";
const DOTS: [&str; 3] = [".", "..", "..."];

const FADE_IN: f64 = 0.7;
const LINE_DELAY: f64 = 0.32;
const PROGRESS_TIME: f64 = 2.2;
const BAR_CELLS: usize = 32;
const WIPE_TIME: f64 = 0.7;
const INVERT_CHANCE: f64 = 0.07;
const DIM_CHANCE: f64 = 0.07;
const DIM_ALPHA: u8 = 180;
const MARGIN: i32 = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    PressEnter,
    Logo { started: f64 },
    Boot { started: f64 },
}

pub struct Splash {
    config: SplashConfig,
    phase: Phase,
    logo: Option<FrameBuffer>,
    corruption: CorruptionController,
}

impl Splash {
    /// `screen` is the window size, used to fit the logo once up front.
    /// A logo that cannot be loaded is reported here and skipped for good.
    pub fn new(config: SplashConfig, corruption: CorruptionConfig, screen: (usize, usize)) -> Self {
        let logo = match load_logo(&config.logo_path, screen) {
            Ok(logo) => Some(logo),
            Err(e) => {
                warn!(path = %config.logo_path.display(), error = %e, "logo unavailable, skipping it");
                None
            }
        };
        Self::with_logo(config, corruption, logo)
    }

    pub fn with_logo(config: SplashConfig, corruption: CorruptionConfig, logo: Option<FrameBuffer>) -> Self {
        Self { config, phase: Phase::PressEnter, logo, corruption: CorruptionController::new(corruption) }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn draw_prompt(&self, fb: &mut FrameBuffer, theme: &Theme) {
        let surf = theme.text(PROMPT, theme.palette.text);
        let x = (fb.width as i32 - surf.width as i32) / 2;
        let y = (fb.height as i32 - surf.height as i32) / 2;
        fb.blit_alpha(&surf, x, y, 255);
    }

    fn draw_logo(&self, fb: &mut FrameBuffer, theme: &Theme, elapsed: f64, rng: &mut FxRng) {
        let (w, h) = (fb.width as i32, fb.height as i32);
        if let Some(logo) = &self.logo {
            let x = (w - logo.width as i32) / 2 + rng.random_range(-1..=1);
            let y = h / 4 + rng.random_range(-1..=1);

            // logo flattened onto the background, sometimes as a negative
            let mut tile = FrameBuffer::new(logo.width, logo.height, theme.palette.bg);
            if rng.random::<f64>() < INVERT_CHANCE {
                let mut neg = logo.clone();
                neg.pixels.iter_mut().for_each(|p| *p = p.inverted());
                tile.blit_alpha(&neg, 0, 0, 255);
            } else {
                tile.blit_alpha(logo, 0, 0, 255);
            }

            if elapsed < WIPE_TIME {
                let shown = (logo.height as f64 * (elapsed / WIPE_TIME)) as usize;
                if shown > 0 {
                    let top = tile.copy_region(Rect::new(0, 0, tile.width, shown));
                    fb.blit_opaque(&top, x, y);
                }
            } else {
                fb.blit_opaque(&tile, x, y);
            }
        }

        let dots = DOTS[(elapsed * 2.0) as usize % DOTS.len()];
        let text = theme.glitched(&format!("{INTRO_TEXT}{dots}"), rng);
        let surf = theme.text(&text, theme.palette.text);
        let tx = (w - surf.width as i32) / 2;
        let ty = h - theme.font.height() as i32 - 40;
        fb.blit_alpha(&surf, tx, ty, 255);
    }

    fn draw_boot(&self, fb: &mut FrameBuffer, theme: &Theme, elapsed: f64, rng: &mut FxRng) {
        let step = theme.font.height() as i32 + 4;
        let top = fb.height as i32 / 2 - 100;

        let mut y = top;
        for line in &BOOT_LINES[..lines_shown(elapsed, BOOT_LINES.len())] {
            let text = theme.glitched(line, rng);
            let alpha = if rng.random::<f64>() < DIM_CHANCE { DIM_ALPHA } else { 255 };
            let surf = theme.text(&text, theme.palette.text);
            fb.blit_alpha(&surf, MARGIN, y, alpha);
            y += step;
        }

        if let Some(p) = progress(elapsed, BOOT_LINES.len()) {
            let surf = theme.text(&progress_bar(p), theme.palette.text);
            let bar_y = top + step * (BOOT_LINES.len() as i32 + 1);
            fb.blit_alpha(&surf, MARGIN, bar_y, 255);
        }

        let fade = fade_alpha(elapsed);
        if fade > 0 {
            let full = Rect::new(0, 0, fb.width, fb.height);
            fb.blend_rect(full, theme.palette.bg.with_alpha(fade));
        }
    }
}

impl Screen for Splash {
    fn update(&mut self, input: &FrameInput, now: f64, sound: &mut Sound) -> Flow {
        if input.escape {
            return Flow::Quit;
        }
        match self.phase {
            Phase::PressEnter if input.enter => {
                sound.play_startup();
                self.phase = Phase::Logo { started: now };
            }
            Phase::Logo { started } if now - started > self.config.intro_duration => {
                self.phase = Phase::Boot { started: now };
            }
            Phase::Boot { started } if now - started > self.config.boot_duration => {
                info!("boot sequence finished");
                return Flow::Next;
            }
            _ => {}
        }
        Flow::Continue
    }

    fn draw(&mut self, fb: &mut FrameBuffer, theme: &Theme, now: f64, rng: &mut FxRng) {
        fb.fill(theme.palette.bg);
        match self.phase {
            Phase::PressEnter => self.draw_prompt(fb, theme),
            Phase::Logo { started } => self.draw_logo(fb, theme, now - started, rng),
            Phase::Boot { started } => self.draw_boot(fb, theme, now - started, rng),
        }
    }

    fn corruption_mut(&mut self) -> &mut CorruptionController {
        &mut self.corruption
    }
}

/// Decode the logo and shrink it to fit (w/2, h/3); never upscales.
pub fn load_logo(path: &Path, screen: (usize, usize)) -> Result<FrameBuffer, Error> {
    let img = image::open(path)?.to_rgba8();
    let (lw, lh) = img.dimensions();
    let scale = fit_scale((lw, lh), (screen.0 as u32 / 2, screen.1 as u32 / 3));
    let (nw, nh) = (((lw as f64 * scale) as u32).max(1), ((lh as f64 * scale) as u32).max(1));
    let img = if (nw, nh) == (lw, lh) { img } else { imageops::resize(&img, nw, nh, FilterType::Triangle) };
    Ok(FrameBuffer::from_rgba_image(&img))
}

/// Largest scale ≤ 1 that fits `size` inside `max`.
pub fn fit_scale(size: (u32, u32), max: (u32, u32)) -> f64 {
    if size.0 == 0 || size.1 == 0 {
        return 1.0;
    }
    (max.0 as f64 / size.0 as f64).min(max.1 as f64 / size.1 as f64).min(1.0)
}

/// Background overlay alpha during the boot fade-in.
pub fn fade_alpha(elapsed: f64) -> u8 {
    if elapsed < FADE_IN {
        (255.0 * (1.0 - elapsed.max(0.0) / FADE_IN)) as u8
    } else {
        0
    }
}

/// Boot lines revealed so far, one every `LINE_DELAY` after the fade.
pub fn lines_shown(elapsed: f64, total: usize) -> usize {
    let n = ((elapsed - FADE_IN) / LINE_DELAY).floor();
    if n <= 0.0 { 0 } else { (n as usize).min(total) }
}

/// Progress bar fill (0..=1) once every line is out; `None` before that.
pub fn progress(elapsed: f64, total: usize) -> Option<f64> {
    let start = FADE_IN + LINE_DELAY * total as f64;
    (elapsed > start).then(|| ((elapsed - start) / PROGRESS_TIME).min(1.0))
}

pub fn progress_bar(progress: f64) -> String {
    let filled = ((BAR_CELLS as f64 * progress.clamp(0.0, 1.0)) as usize).min(BAR_CELLS);
    format!("[{}{}]", "=".repeat(filled), " ".repeat(BAR_CELLS - filled))
}
