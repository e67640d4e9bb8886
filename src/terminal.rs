// The interactive terminal screen.
//
// Scrollable output history, a prompt line, and the fixed command table.
// Command latency is simulated without stalling the frame loop: a submitted
// command becomes a `PendingOutput` that is released on the first frame at
// or after its ready time. Until then typing still works but Enter is
// ignored, so only one command is ever in flight.

use std::ops::Range;

use tracing::{debug, info};

use crate::commands;
use crate::config::{CorruptionConfig, TerminalConfig};
use crate::corruption::CorruptionController;
use crate::rng::FxRng;
use crate::screen::{Flow, FrameInput, Screen, Theme};
use crate::sound::Sound;
use crate::types::{FrameBuffer, Rect};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    /// Drawn with per-frame flicker (echoed commands).
    pub flicker: bool,
}

/// Command output waiting for its simulated latency to elapse.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOutput {
    pub ready_at: f64,
    pub lines: Vec<String>,
    pub quit: bool,
}

pub struct Terminal {
    config: TerminalConfig,
    output: Vec<OutputLine>,
    input: String,
    scroll: usize,
    pending: Option<PendingOutput>,
    corruption: CorruptionController,
}

impl Terminal {
    pub fn new(config: TerminalConfig, corruption: CorruptionConfig) -> Self {
        Self {
            config,
            output: Vec::new(),
            input: String::new(),
            scroll: 0,
            pending: None,
            corruption: CorruptionController::new(corruption),
        }
    }

    pub fn output(&self) -> &[OutputLine] {
        &self.output
    }

    pub fn input_line(&self) -> &str {
        &self.input
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    pub fn pending(&self) -> Option<&PendingOutput> {
        self.pending.as_ref()
    }

    /// Append `text` (split on newlines), keep only the newest `max_lines`
    /// and jump back to the bottom.
    pub fn add_output(&mut self, text: &str, flicker: bool) {
        for line in text.split('\n') {
            self.output.push(OutputLine { text: line.to_string(), flicker });
        }
        let max = self.config.max_lines.max(1);
        if self.output.len() > max {
            self.output.drain(..self.output.len() - max);
        }
        self.scroll = 0;
    }

    /// Echo the command and schedule its response.
    fn submit(&mut self, line: &str, now: f64) {
        self.add_output(&format!("{}{}", self.config.prompt, line), true);
        let response = commands::handle(line);
        debug!(command = line, delay = self.config.command_delay, "command submitted");
        self.pending = Some(PendingOutput {
            ready_at: now + self.config.command_delay,
            lines: response.lines,
            quit: response.quit,
        });
    }

    /// Release pending output once its time has come. Returns true when the
    /// released command asked to quit.
    fn release_pending(&mut self, now: f64) -> bool {
        match self.pending.take() {
            Some(p) if now >= p.ready_at => {
                for line in &p.lines {
                    self.add_output(line, false);
                }
                p.quit
            }
            other => {
                self.pending = other;
                false
            }
        }
    }

    pub fn line_height(&self, theme: &Theme) -> usize {
        theme.font.height() + self.config.line_spacing
    }

    /// How many history rows fit above the prompt on a `height`-pixel screen.
    pub fn visible_rows(&self, height: usize, line_height: usize) -> usize {
        let margin = self.config.margin.max(0) as usize;
        height.saturating_sub(line_height + 2 * margin) / line_height.max(1)
    }

    /// Indices of the history lines shown when `rows` rows fit on screen.
    pub fn visible_range(&self, rows: usize) -> Range<usize> {
        let n = self.output.len();
        let end = n.saturating_sub(self.scroll);
        let start = n.saturating_sub(rows + self.scroll);
        start..end.min(start + rows)
    }
}

impl Screen for Terminal {
    fn update(&mut self, input: &FrameInput, now: f64, sound: &mut Sound) -> Flow {
        if input.escape {
            return Flow::Quit;
        }
        if self.release_pending(now) {
            info!("exit command received");
            return Flow::Quit;
        }

        for &c in &input.typed {
            if !c.is_control() {
                self.input.push(c);
                sound.play_random_keypress();
            }
        }
        if input.backspace {
            self.input.pop();
            sound.play_random_keypress();
        }
        if input.enter && self.pending.is_none() {
            let line = self.input.trim().to_string();
            if !line.is_empty() {
                self.submit(&line, now);
            }
            self.input.clear();
        }
        if input.up {
            self.scroll = (self.scroll + 1).min(self.output.len().saturating_sub(1));
        }
        if input.down {
            self.scroll = self.scroll.saturating_sub(1);
        }
        Flow::Continue
    }

    fn draw(&mut self, fb: &mut FrameBuffer, theme: &Theme, _now: f64, rng: &mut FxRng) {
        fb.fill(theme.palette.bg);
        let line_h = self.line_height(theme);
        let margin = self.config.margin.max(0) as i32;
        let rows = self.visible_rows(fb.height, line_h);

        let mut y = margin;
        for line in &self.output[self.visible_range(rows)] {
            let text = theme.glitched(&line.text, rng);
            let alpha = if line.flicker { theme.pipeline.line_alpha(255, rng) } else { 255 };
            let surf = theme.text(&text, theme.palette.text);
            let at = theme.pipeline.place(Rect::new(margin, y, surf.width, surf.height), rng);
            fb.blit_alpha(&surf, at.x, at.y, alpha);
            y += line_h as i32;
        }

        let prompt = format!("{}{}", self.config.prompt, self.input);
        let surf = theme.text(&prompt, theme.palette.text);
        let input_y = fb.height as i32 - line_h as i32 - margin;
        fb.blit_alpha(&surf, margin, input_y, 255);
    }

    fn corruption_mut(&mut self) -> &mut CorruptionController {
        &mut self.corruption
    }
}
