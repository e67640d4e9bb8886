// Sound effects: key clicks while typing and a startup chime.
// Clips are read once from the sound directory into memory and decoded on
// every play onto one shared rodio output stream. No directory, no clips or
// no audio device all mean the same thing: the terminal runs silent.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Cursor};
use std::path::Path;
use std::sync::Arc;

use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rodio::{Decoder, OutputStream, OutputStreamBuilder};
use tracing::{debug, info, warn};

use crate::config::SoundConfig;
use crate::rng::FxRng;

const EXTENSIONS: [&str; 3] = ["wav", "ogg", "mp3"];
const KEYPRESS_CLIPS: [&str; 3] = ["Keypress1", "KeyPress2", "KeyPress3"];
const STARTUP_CLIP: &str = "ComputerStart";

/// Encoded clip bytes, keyed by file stem.
pub type Clips = HashMap<String, Arc<[u8]>>;

pub struct Sound {
    clips: Clips,
    output: Option<OutputStream>, // must stay alive while anything plays
    rng: FxRng,
    last_played: Option<String>,
}

impl Sound {
    /// Load clips from `config.dir` and open the default output device.
    /// Any failure is logged once and leaves the player silent.
    pub fn open(config: &SoundConfig, seed: Option<u64>) -> Self {
        if !config.enabled {
            return Self::silent();
        }
        let clips = match load_clips(&config.dir) {
            Ok(clips) => clips,
            Err(e) => {
                warn!(dir = %config.dir.display(), error = %e, "sound directory unavailable, running silent");
                Clips::new()
            }
        };
        let output = if clips.is_empty() {
            None
        } else {
            match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => Some(stream),
                Err(e) => {
                    warn!(error = %e, "no audio output, running silent");
                    None
                }
            }
        };
        let mut sound = Self::with_clips(clips, seed.unwrap_or_default());
        sound.output = output;
        sound
    }

    /// A player that knows no clips and never makes a sound.
    pub fn silent() -> Self {
        Self::with_clips(Clips::new(), 0)
    }

    /// Clips without an output device: plays are tracked but inaudible.
    pub fn with_clips(clips: Clips, seed: u64) -> Self {
        Self { clips, output: None, rng: FxRng::seed_from_u64(seed), last_played: None }
    }

    pub fn has_clip(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    /// Name of the most recent clip that was started.
    pub fn last_played(&self) -> Option<&str> {
        self.last_played.as_deref()
    }

    /// Start clip `name` if it was loaded. Unknown names are ignored.
    pub fn play(&mut self, name: &str) {
        let Some(data) = self.clips.get(name) else {
            return;
        };
        if let Some(output) = &self.output {
            match Decoder::new(Cursor::new(Arc::clone(data))) {
                Ok(source) => output.mixer().add(source),
                Err(e) => {
                    debug!(clip = name, error = %e, "could not decode clip");
                    return;
                }
            }
        }
        self.last_played = Some(name.to_string());
    }

    /// One of the loaded key clicks, chosen uniformly.
    pub fn play_random_keypress(&mut self) {
        let available: Vec<&'static str> =
            KEYPRESS_CLIPS.iter().copied().filter(|name| self.clips.contains_key(*name)).collect();
        if let Some(name) = available.choose(&mut self.rng).copied() {
            self.play(name);
        }
    }

    pub fn play_startup(&mut self) {
        self.play(STARTUP_CLIP);
    }
}

/// Read every `.wav`/`.ogg`/`.mp3` in `dir`. Unreadable files are skipped.
pub fn load_clips(dir: &Path) -> io::Result<Clips> {
    let mut clips = Clips::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_audio = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !is_audio {
            continue;
        }
        match fs::read(&path) {
            Ok(bytes) => {
                info!(clip = stem, "loaded sound");
                clips.insert(stem.to_string(), bytes.into());
            }
            Err(e) => warn!(path = %path.display(), error = %e, "failed to load sound"),
        }
    }
    Ok(clips)
}
