// Transient block-shift corruption.
//
// A `CorruptionController` is a two-state timer owned by one screen. Every
// frame it is ticked once; while it is active, the finished frame is run
// through `corrupt_surface`, which slides random horizontal bands sideways.
// Two screens never share a controller, so their bursts are independent.

use rand::Rng;
use tracing::debug;

use crate::config::CorruptionConfig;
use crate::types::{FrameBuffer, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CorruptionState {
    Idle,
    /// Active until the clock passes `until` (seconds).
    Active { until: f64 },
}

#[derive(Debug, Clone)]
pub struct CorruptionController {
    config: CorruptionConfig,
    state: CorruptionState,
}

impl CorruptionController {
    pub fn new(config: CorruptionConfig) -> Self {
        Self { config, state: CorruptionState::Idle }
    }

    pub fn state(&self) -> CorruptionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, CorruptionState::Active { .. })
    }

    /// Advance by one frame and report whether corruption is now active.
    ///
    /// Idle: a fresh Bernoulli trial with the configured per-frame chance;
    /// on success the burst runs until `now + duration`. Active: expires once
    /// `now` is strictly past the deadline. One transition per tick at most,
    /// and an active burst is never extended.
    pub fn tick<R: Rng + ?Sized>(&mut self, now: f64, rng: &mut R) -> bool {
        if !self.config.enabled {
            self.state = CorruptionState::Idle;
            return false;
        }
        self.state = match self.state {
            CorruptionState::Idle if rng.random::<f64>() < self.config.chance => {
                let until = now + self.config.duration;
                debug!(now, until, "corruption burst started");
                CorruptionState::Active { until }
            }
            CorruptionState::Active { until } if now > until => {
                debug!(now, "corruption burst ended");
                CorruptionState::Idle
            }
            s => s,
        };
        self.is_active()
    }

    /// The corrupted version of `fb` for this frame.
    pub fn apply<R: Rng + ?Sized>(&self, fb: &FrameBuffer, rng: &mut R) -> FrameBuffer {
        let block = self.config.block_size.max(1) as usize;
        corrupt_surface(fb, self.config.intensity, block, rng)
    }
}

/// How many bands a frame of `height` rows gets: ⌊height·intensity / block_size⌋.
pub fn block_count(height: usize, intensity: f64, block_size: usize) -> usize {
    let intensity = if intensity.is_nan() { 0.0 } else { intensity.clamp(0.0, 1.0) };
    (height as f64 * intensity / block_size.max(1) as f64).floor() as usize
}

/// Shift random horizontal bands of `src` sideways by up to ±width/8.
/// Bands are always read from the untouched `src`, written to a copy, and
/// the copy is returned. `block_size` is clamped to [1, height].
pub fn corrupt_surface<R: Rng + ?Sized>(
    src: &FrameBuffer,
    intensity: f64,
    block_size: usize,
    rng: &mut R,
) -> FrameBuffer {
    let mut out = src.clone();
    if src.width == 0 || src.height == 0 {
        return out;
    }
    let block = block_size.clamp(1, src.height);
    let max_shift = (src.width / 8) as i32;
    for _ in 0..block_count(src.height, intensity, block) {
        let y = rng.random_range(0..=src.height - block) as i32;
        let shift = rng.random_range(-max_shift..=max_shift);
        let band = src.copy_region(Rect::new(0, y, src.width, block));
        out.blit_opaque(&band, shift, y);
    }
    out
}
