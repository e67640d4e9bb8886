// FX: the CRT post-process stack, fully software-drawn.
// Visual outcomes:
// - Glow: a soft tinted bloom around bright text (phosphor smear).
// - Scanlines: dark horizontal stripes like raster gaps on a tube.
// - Noise: faint grey grain over the whole screen.
// - Jitter / flicker: helpers callers use to shake or dim individual lines.
//
// Order is fixed: glow tints raw content first, scanlines darken on top of
// it, noise goes over everything. Corruption runs afterwards (corruption.rs).

use image::imageops::{self, FilterType};
use rand::Rng;
use tracing::warn;

use crate::config::EffectConfig;
use crate::error::Error;
use crate::types::{Color, FrameBuffer, Rect};

/// Strength of the bloom layer when it is added back (out of 255).
const GLOW_LAYER_ALPHA: u8 = 80;

// ----------------------------- scanlines -----------------------------------

/// Darken bands of `spacing` rows at y = 0, 2·spacing, 4·spacing, ...
/// Visual: alternating dark/clear stripes of equal height.
pub fn apply_scanlines(fb: &mut FrameBuffer, opacity: u8, spacing: usize) {
    let spacing = spacing.max(1);
    let band = Color::BLACK.with_alpha(opacity);
    for y in (0..fb.height).step_by(spacing * 2) {
        fb.blend_rect(Rect::new(0, y as i32, fb.width, spacing), band);
    }
}

/// Scanlines that move: every band is pushed down by `offset_y` and sheared
/// sideways by up to `offset_x` across the height of the screen.
/// Visual: rolling (and, with a skew, diagonal) raster bands.
pub fn apply_moving_scanlines(
    fb: &mut FrameBuffer,
    opacity: u8,
    spacing: usize,
    offset_x: i32,
    offset_y: i32,
) {
    let s = spacing.max(1) as i64;
    let h = (fb.height as i64).max(1);
    let band = Color::BLACK.with_alpha(opacity);
    let mut y = -s * 2;
    while y < fb.height as i64 {
        let row = y + offset_y as i64;
        // shear truncates toward zero
        let x = (row * offset_x as i64 / h).clamp(i32::MIN as i64, i32::MAX as i64);
        fb.blend_rect(Rect::new(x as i32, row as i32, fb.width, s as usize), band);
        y += s * 2;
    }
}

// ----------------------------- noise ---------------------------------------

/// Overlay an independent uniform grey value per pixel at alpha `opacity`.
/// Visual: film grain. Opacity 0 leaves the frame untouched.
pub fn apply_noise<R: Rng + ?Sized>(fb: &mut FrameBuffer, opacity: u8, rng: &mut R) {
    if opacity == 0 {
        return;
    }
    let mut grain = FrameBuffer::new(fb.width, fb.height, Color::BLACK);
    for px in &mut grain.pixels {
        let v: u8 = rng.random();
        *px = Color::rgb(v, v, v);
    }
    fb.blit_alpha(&grain, 0, 0, opacity);
}

// ----------------------------- glow ----------------------------------------

/// Phosphor bloom: blur a copy by a 2× down/up resample, tint it with
/// `color` additively, and add it back onto the frame.
/// `_radius` is accepted for config symmetry; the 2× resample fixes the
/// blur footprint.
pub fn apply_glow(fb: &mut FrameBuffer, color: Color, _radius: usize) -> Result<(), Error> {
    if fb.width < 2 || fb.height < 2 {
        return Err(Error::Effect(format!("glow needs at least 2x2 pixels, got {}x{}", fb.width, fb.height)));
    }
    let (w, h) = (fb.width as u32, fb.height as u32);
    let small = imageops::resize(&fb.to_rgba_image(), w / 2, h / 2, FilterType::Triangle);
    let blurred = imageops::resize(&small, w, h, FilterType::Triangle);
    let mut glow = FrameBuffer::from_rgba_image(&blurred);
    if glow.width != fb.width || glow.height != fb.height {
        return Err(Error::Effect("glow resample changed the buffer size".into()));
    }

    let tint = FrameBuffer::new(fb.width, fb.height, color);
    glow.blit_additive(&tint, 0, 0);

    // The bloom is a translucent layer: scale it before adding.
    for px in &mut glow.pixels {
        px.r = scale_u8(px.r, GLOW_LAYER_ALPHA);
        px.g = scale_u8(px.g, GLOW_LAYER_ALPHA);
        px.b = scale_u8(px.b, GLOW_LAYER_ALPHA);
        px.a = 0;
    }
    fb.blit_additive(&glow, 0, 0);
    Ok(())
}

#[inline]
fn scale_u8(v: u8, alpha: u8) -> u8 {
    ((v as u32 * alpha as u32 + 127) / 255) as u8
}

// ----------------------------- jitter / flicker ----------------------------

/// Shift `rect` horizontally by a uniform integer in [-amount, amount].
/// Visual: the line it positions shakes sideways by a pixel or two.
pub fn jitter_rect<R: Rng + ?Sized>(rect: Rect, amount: i32, rng: &mut R) -> Rect {
    let amount = amount.max(0);
    rect.translate(rng.random_range(-amount..=amount), 0)
}

/// `base_alpha · (1 + U)` with U uniform in [-intensity, intensity],
/// rounded and clamped to [0, 255].
/// Visual: a line's brightness wobbles from frame to frame.
pub fn flicker_alpha<R: Rng + ?Sized>(base_alpha: u8, intensity: f64, rng: &mut R) -> u8 {
    let intensity = if intensity.is_nan() { 0.0 } else { intensity.clamp(0.0, 1.0) };
    if intensity == 0.0 {
        return base_alpha;
    }
    let u = rng.random_range(-intensity..=intensity);
    (base_alpha as f64 * (1.0 + u)).round().clamp(0.0, 255.0) as u8
}

// ----------------------------- pipeline ------------------------------------

/// The configured post-process stack, applied to every presented frame.
#[derive(Debug, Clone)]
pub struct EffectPipeline {
    config: EffectConfig,
}

impl EffectPipeline {
    pub fn new(config: EffectConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    /// Glow → scanlines → noise. `elapsed` (seconds) only drives rolling
    /// scanlines. A stage that fails is logged and skipped; the frame goes on.
    pub fn apply<R: Rng + ?Sized>(&self, fb: &mut FrameBuffer, rng: &mut R, elapsed: f64) {
        let cfg = &self.config;

        if cfg.glow.enabled {
            let color = cfg.glow.color.unwrap_or(Color::TRANSPARENT);
            if let Err(e) = apply_glow(fb, color, to_usize(cfg.glow.radius)) {
                warn!(error = %e, "skipping glow stage");
            }
        }

        if cfg.scanline.enabled {
            let opacity = to_u8(cfg.scanline.opacity);
            let spacing = to_usize(cfg.scanline.spacing).max(1);
            if cfg.scanline.roll_speed > 0.0 {
                let period = (spacing * 2) as i64;
                let offset_y = ((elapsed * cfg.scanline.roll_speed).floor() as i64).rem_euclid(period);
                let skew = cfg.scanline.skew.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
                apply_moving_scanlines(fb, opacity, spacing, skew, offset_y as i32);
            } else {
                apply_scanlines(fb, opacity, spacing);
            }
        }

        if cfg.noise.enabled {
            apply_noise(fb, to_u8(cfg.noise.opacity), rng);
        }
    }

    /// Jitter a line's placement when jitter is on; identity otherwise.
    pub fn place<R: Rng + ?Sized>(&self, rect: Rect, rng: &mut R) -> Rect {
        let j = &self.config.jitter;
        if j.enabled && j.amount > 0 {
            jitter_rect(rect, j.amount.min(i32::MAX as i64) as i32, rng)
        } else {
            rect
        }
    }

    /// Per-frame alpha for a flickering line; `base` when flicker is off.
    pub fn line_alpha<R: Rng + ?Sized>(&self, base: u8, rng: &mut R) -> u8 {
        let f = &self.config.flicker;
        if f.enabled { flicker_alpha(base, f.intensity, rng) } else { base }
    }
}

fn to_u8(v: i64) -> u8 {
    v.clamp(0, 255) as u8
}

fn to_usize(v: i64) -> usize {
    v.max(0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GlowConfig, NoiseConfig, ScanlineConfig};
    use crate::rng::FxRng;
    use crate::types::blend_channel;
    use rand::SeedableRng;

    fn grey(w: usize, h: usize) -> FrameBuffer {
        FrameBuffer::new(w, h, Color::rgb(200, 200, 200))
    }

    #[test]
    fn scanlines_darken_alternating_bands() {
        // 100x40, spacing 4, opacity 64: rows 0-3 dark, 4-7 clear, repeating.
        let src = grey(100, 40);
        let mut fb = src.clone();
        apply_scanlines(&mut fb, 64, 4);
        let dark = Color::rgb(blend_channel(0, 200, 64), blend_channel(0, 200, 64), blend_channel(0, 200, 64));
        for y in 0..40 {
            let expected = if y % 8 < 4 { dark } else { Color::rgb(200, 200, 200) };
            assert!(fb.row(y).iter().all(|&p| p == expected), "row {y}");
        }
    }

    #[test]
    fn scanlines_zero_spacing_is_clamped() {
        let mut fb = grey(4, 4);
        apply_scanlines(&mut fb, 255, 0);
        assert_eq!(fb.get(0, 0), Some(Color::rgb(0, 0, 0)));
        assert_eq!(fb.get(0, 1), Some(Color::rgb(200, 200, 200)));
        assert_eq!(fb.get(0, 2), Some(Color::rgb(0, 0, 0)));
    }

    #[test]
    fn moving_scanlines_without_offset_match_static() {
        let mut a = grey(16, 20);
        let mut b = grey(16, 20);
        apply_scanlines(&mut a, 90, 3);
        apply_moving_scanlines(&mut b, 90, 3, 0, 0);
        assert_eq!(a, b);
    }

    #[test]
    fn moving_scanlines_roll_down() {
        let mut fb = grey(8, 8);
        apply_moving_scanlines(&mut fb, 255, 2, 0, 1);
        // bands now cover rows 1-2 and 5-6
        let dark: Vec<bool> = (0..8).map(|y| fb.get(0, y) == Some(Color::BLACK)).collect();
        assert_eq!(dark, vec![false, true, true, false, false, true, true, false]);
    }

    #[test]
    fn moving_scanline_shear_truncates_toward_zero() {
        // offset_y 3 puts the first band at row -1, leaning -3/8 px: truncated
        // to 0, so it still covers the whole of row 0
        let mut fb = grey(8, 8);
        apply_moving_scanlines(&mut fb, 255, 2, 3, 3);
        assert!(fb.row(0).iter().all(|&p| p == Color::BLACK));
        // row 3 leans 9/8 px: one column stays clear on the left
        assert_eq!(fb.get(0, 3), Some(Color::rgb(200, 200, 200)));
        assert_eq!(fb.get(1, 3), Some(Color::BLACK));
    }

    #[test]
    fn noise_with_zero_opacity_is_identity() {
        let mut rng = FxRng::seed_from_u64(5);
        let src = grey(32, 16);
        let mut fb = src.clone();
        apply_noise(&mut fb, 0, &mut rng);
        assert_eq!(fb, src);
    }

    #[test]
    fn noise_changes_the_frame() {
        let mut rng = FxRng::seed_from_u64(6);
        let src = grey(32, 16);
        let mut fb = src.clone();
        apply_noise(&mut fb, 128, &mut rng);
        assert_ne!(fb, src);
    }

    #[test]
    fn glow_only_brightens() {
        let mut fb = FrameBuffer::new(20, 10, Color::rgb(10, 20, 10));
        fb.blend_rect(Rect::new(5, 3, 6, 3), Color::rgb(80, 255, 80));
        let before = fb.clone();
        apply_glow(&mut fb, Color::rgba(80, 255, 80, 80), 4).unwrap();
        for (a, b) in before.pixels.iter().zip(&fb.pixels) {
            assert!(b.r >= a.r && b.g >= a.g && b.b >= a.b);
        }
        assert_ne!(fb, before);
    }

    #[test]
    fn glow_on_tiny_buffer_reports_error() {
        let mut fb = FrameBuffer::new(1, 1, Color::BLACK);
        assert!(matches!(apply_glow(&mut fb, Color::BLACK, 0), Err(Error::Effect(_))));
    }

    #[test]
    fn jitter_stays_within_amount() {
        let mut rng = FxRng::seed_from_u64(7);
        let r = Rect::new(16, 40, 100, 24);
        for _ in 0..200 {
            let j = jitter_rect(r, 2, &mut rng);
            assert!((j.x - 16).abs() <= 2);
            assert_eq!((j.y, j.width, j.height), (40, 100, 24));
        }
        assert_eq!(jitter_rect(r, 0, &mut rng), r);
    }

    #[test]
    fn flicker_zero_intensity_keeps_alpha() {
        let mut rng = FxRng::seed_from_u64(8);
        assert_eq!(flicker_alpha(200, 0.0, &mut rng), 200);
    }

    #[test]
    fn flicker_stays_near_base() {
        let mut rng = FxRng::seed_from_u64(9);
        for _ in 0..500 {
            let a = flicker_alpha(100, 0.15, &mut rng);
            assert!((85..=115).contains(&a), "{a}");
        }
    }

    #[test]
    fn pipeline_with_everything_off_is_identity() {
        let mut rng = FxRng::seed_from_u64(10);
        let cfg = EffectConfig {
            scanline: ScanlineConfig { enabled: false, ..Default::default() },
            noise: NoiseConfig { enabled: false, opacity: 200 },
            glow: GlowConfig { enabled: false, ..Default::default() },
            ..Default::default()
        };
        let src = grey(10, 10);
        let mut fb = src.clone();
        EffectPipeline::new(cfg).apply(&mut fb, &mut rng, 1.0);
        assert_eq!(fb, src);
    }

    fn glow_and_scanlines(opacity: i64, spacing: i64) -> EffectConfig {
        EffectConfig {
            glow: GlowConfig { enabled: true, color: Some(Color::rgba(0, 40, 0, 0)), radius: 4 },
            scanline: ScanlineConfig { opacity, spacing, ..Default::default() },
            ..Default::default()
        }
    }

    /// Bright block in the middle of a dim frame.
    fn lit_block() -> FrameBuffer {
        let mut fb = FrameBuffer::new(16, 16, Color::rgb(10, 20, 10));
        fb.blend_rect(Rect::new(4, 4, 8, 8), Color::rgb(100, 160, 100));
        fb
    }

    #[test]
    fn scanlines_darken_the_glowed_frame() {
        let mut rng = FxRng::seed_from_u64(12);
        let src = lit_block();
        let mut glowed = src.clone();
        apply_glow(&mut glowed, Color::rgba(0, 40, 0, 0), 4).unwrap();

        let mut fb = src.clone();
        EffectPipeline::new(glow_and_scanlines(96, 2)).apply(&mut fb, &mut rng, 0.0);
        for y in 0..16 {
            for x in 0..16 {
                let g = glowed.get(x, y).unwrap();
                let expected = if y % 4 < 2 {
                    Color::rgb(blend_channel(0, g.r, 96), blend_channel(0, g.g, 96), blend_channel(0, g.b, 96))
                } else {
                    g
                };
                assert_eq!(fb.get(x, y), Some(expected), "pixel ({x},{y})");
            }
        }

        // blooming an already scanlined frame gives a different picture
        let mut reversed = src;
        apply_scanlines(&mut reversed, 96, 2);
        apply_glow(&mut reversed, Color::rgba(0, 40, 0, 0), 4).unwrap();
        assert_ne!(fb, reversed);
    }

    #[test]
    fn noise_goes_over_the_scanlines() {
        let mut rng = FxRng::seed_from_u64(13);
        let cfg = EffectConfig {
            scanline: ScanlineConfig { opacity: 255, spacing: 2, ..Default::default() },
            noise: NoiseConfig { enabled: true, opacity: 255 },
            ..Default::default()
        };
        let mut fb = grey(32, 8);
        EffectPipeline::new(cfg).apply(&mut fb, &mut rng, 0.0);
        // opaque grain replaces everything, including the fully black band rows
        assert!(fb.row(0).iter().any(|&p| p != Color::BLACK));
        assert!(fb.pixels.iter().all(|p| p.r == p.g && p.g == p.b));
    }

    #[test]
    fn rolling_scanlines_follow_elapsed_time() {
        let mut rng = FxRng::seed_from_u64(14);
        let cfg = EffectConfig {
            scanline: ScanlineConfig { opacity: 255, spacing: 2, roll_speed: 10.0, ..Default::default() },
            ..Default::default()
        };
        let pipeline = EffectPipeline::new(cfg);
        let dark_rows =
            |fb: &FrameBuffer| -> Vec<bool> { (0..8).map(|y| fb.get(0, y) == Some(Color::BLACK)).collect() };

        // floor(0.35 * 10) = 3, 3 mod 4 = 3: bands at rows -1..0, 3..4, 7..8
        let mut fb = grey(8, 8);
        pipeline.apply(&mut fb, &mut rng, 0.35);
        assert_eq!(dark_rows(&fb), vec![true, false, false, true, true, false, false, true]);

        // floor(0.45 * 10) = 4 wraps to 0: back to the static pattern
        let mut fb = grey(8, 8);
        pipeline.apply(&mut fb, &mut rng, 0.45);
        let mut still = grey(8, 8);
        apply_scanlines(&mut still, 255, 2);
        assert_eq!(fb, still);
    }

    #[test]
    fn huge_skew_saturates_instead_of_wrapping() {
        let mut rng = FxRng::seed_from_u64(15);
        let cfg = EffectConfig {
            scanline: ScanlineConfig { opacity: 255, spacing: 2, roll_speed: 1.0, skew: 1 << 32, ..Default::default() },
            ..Default::default()
        };
        let mut fb = grey(8, 8);
        EffectPipeline::new(cfg).apply(&mut fb, &mut rng, 0.0);
        // the band at row 4 is pushed far off to the right; wrapped to 0 it
        // would sit unsheared on column 0
        assert_eq!(fb.get(0, 4), Some(Color::rgb(200, 200, 200)));
        assert_eq!(fb.get(0, 0), Some(Color::BLACK));
    }

    #[test]
    fn pipeline_skips_failing_glow_and_still_draws_scanlines() {
        let mut rng = FxRng::seed_from_u64(11);
        let cfg = EffectConfig {
            glow: GlowConfig { enabled: true, color: Some(Color::rgb(0, 255, 0)), radius: 4 },
            scanline: ScanlineConfig { opacity: 255, spacing: 1, ..Default::default() },
            ..Default::default()
        };
        let mut fb = FrameBuffer::new(1, 1, Color::rgb(50, 50, 50));
        EffectPipeline::new(cfg).apply(&mut fb, &mut rng, 0.0);
        assert_eq!(fb.get(0, 0), Some(Color::BLACK));
    }
}
