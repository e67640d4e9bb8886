// Window + keyboard input.
// The Drawer is the presentable sink: each frame the finished FrameBuffer is
// packed to 0x00RRGGBB and pushed to a minifb window, which also paces the
// loop to the target frame rate.

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::error::Error;
use crate::screen::FrameInput;
use crate::types::FrameBuffer;

pub struct Drawer {
    window: Window,   // the on-screen window you see
    packed: Vec<u32>, // reused 0x00RRGGBB scratch buffer
}

impl Drawer {
    /// Create a fixed-size window capped at `target_fps`.
    pub fn new(title: &str, width: usize, height: usize, target_fps: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(target_fps);
        Ok(Self { window, packed: Vec::with_capacity(width * height) })
    }

    /// Push the pixels for this frame to the screen.
    /// Blocks until the next frame slot when pacing is on.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        framebuffer.write_0rgb(&mut self.packed);
        self.window
            .update_with_buffer(&self.packed, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Keys pressed since the last `present`, with typing auto-repeat.
    pub fn poll_input(&self) -> FrameInput {
        let shift = self.window.is_key_down(Key::LeftShift) || self.window.is_key_down(Key::RightShift);
        let mut input = FrameInput::default();
        for key in self.window.get_keys_pressed(KeyRepeat::Yes) {
            match key {
                Key::Enter | Key::NumPadEnter => input.enter = true,
                Key::Backspace => input.backspace = true,
                Key::Up => input.up = true,
                Key::Down => input.down = true,
                Key::Escape => input.escape = true,
                other => {
                    if let Some(c) = key_char(other, shift) {
                        input.typed.push(c);
                    }
                }
            }
        }
        input
    }
}

/// US-layout character for a key, if it types one.
fn key_char(key: Key, shift: bool) -> Option<char> {
    let letter = |c: char| Some(if shift { c.to_ascii_uppercase() } else { c });
    let pair = |plain: char, shifted: char| Some(if shift { shifted } else { plain });
    match key {
        Key::A => letter('a'),
        Key::B => letter('b'),
        Key::C => letter('c'),
        Key::D => letter('d'),
        Key::E => letter('e'),
        Key::F => letter('f'),
        Key::G => letter('g'),
        Key::H => letter('h'),
        Key::I => letter('i'),
        Key::J => letter('j'),
        Key::K => letter('k'),
        Key::L => letter('l'),
        Key::M => letter('m'),
        Key::N => letter('n'),
        Key::O => letter('o'),
        Key::P => letter('p'),
        Key::Q => letter('q'),
        Key::R => letter('r'),
        Key::S => letter('s'),
        Key::T => letter('t'),
        Key::U => letter('u'),
        Key::V => letter('v'),
        Key::W => letter('w'),
        Key::X => letter('x'),
        Key::Y => letter('y'),
        Key::Z => letter('z'),
        Key::Key0 => pair('0', ')'),
        Key::Key1 => pair('1', '!'),
        Key::Key2 => pair('2', '@'),
        Key::Key3 => pair('3', '#'),
        Key::Key4 => pair('4', '$'),
        Key::Key5 => pair('5', '%'),
        Key::Key6 => pair('6', '^'),
        Key::Key7 => pair('7', '&'),
        Key::Key8 => pair('8', '*'),
        Key::Key9 => pair('9', '('),
        Key::Space => Some(' '),
        Key::Minus => pair('-', '_'),
        Key::Equal => pair('=', '+'),
        Key::LeftBracket => pair('[', '{'),
        Key::RightBracket => pair(']', '}'),
        Key::Backslash => pair('\\', '|'),
        Key::Semicolon => pair(';', ':'),
        Key::Apostrophe => pair('\'', '"'),
        Key::Comma => pair(',', '<'),
        Key::Period => pair('.', '>'),
        Key::Slash => pair('/', '?'),
        Key::Backquote => pair('`', '~'),
        _ => None,
    }
}
