// Retro CRT terminal: text output composited with simulated tube
// degradation (scanlines, grain, bloom, jitter, flicker, glitching text and
// transient block corruption), all drawn in software into a FrameBuffer.

pub mod commands;
pub mod config;
pub mod corruption;
pub mod draw;
pub mod error;
pub mod font;
pub mod fx;
pub mod glitch;
pub mod rng;
pub mod screen;
pub mod sound;
pub mod splash;
pub mod terminal;
pub mod types;

pub use config::AppConfig;
pub use corruption::CorruptionController;
pub use error::Error;
pub use fx::EffectPipeline;
pub use types::{Color, FrameBuffer, Rect};
