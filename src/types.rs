// Core pixel types: colors, rectangles and the per-frame FrameBuffer.
// Every compositing primitive here clips to the destination; nothing panics
// on off-screen positions, so effects can push bands past the screen edge.

use image::{Rgba, RgbaImage};
use serde::Deserialize;

/// One RGBA8 pixel. `a` is only consulted when blitting *from* a buffer
/// (text glyphs, overlays); the screen itself stays opaque.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<u8>")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Photographic negative; alpha is kept.
    pub const fn inverted(self) -> Self {
        Self { r: 255 - self.r, g: 255 - self.g, b: 255 - self.b, a: self.a }
    }

    /// Pack as 0x00RRGGBB, the layout minifb expects.
    #[inline]
    pub fn to_0rgb(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

impl TryFrom<Vec<u8>> for Color {
    type Error = String;

    /// `[r, g, b]` or `[r, g, b, a]`, as written in crt.toml.
    fn try_from(v: Vec<u8>) -> Result<Self, Self::Error> {
        match v.as_slice() {
            [r, g, b] => Ok(Color::rgb(*r, *g, *b)),
            [r, g, b, a] => Ok(Color::rgba(*r, *g, *b, *a)),
            other => Err(format!("color needs 3 or 4 components, got {}", other.len())),
        }
    }
}

/// Axis-aligned rectangle in screen pixels. Position may be negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: usize, height: usize) -> Self {
        Self { x, y, width, height }
    }

    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy, ..self }
    }
}

/// Standard source-over blend of one channel:
/// out = (src·a + dst·(255−a) + 127) / 255
#[inline]
pub fn blend_channel(src: u8, dst: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((src as u32 * a + dst as u32 * (255 - a) + 127) / 255) as u8
}

/// The visible intersection of a `w`×`h` block placed at (x, y) with a
/// `dst_w`×`dst_h` target. `sx`/`sy` are the matching offsets into the block.
struct Clip {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
    sx: usize,
    sy: usize,
}

fn clip(x: i32, y: i32, w: usize, h: usize, dst_w: usize, dst_h: usize) -> Option<Clip> {
    let x0 = (x as i64).max(0);
    let y0 = (y as i64).max(0);
    let x1 = (x as i64 + w as i64).min(dst_w as i64);
    let y1 = (y as i64 + h as i64).min(dst_h as i64);
    if x0 >= x1 || y0 >= y1 {
        return None;
    }
    Some(Clip {
        x0: x0 as usize,
        y0: y0 as usize,
        x1: x1 as usize,
        y1: y1 as usize,
        sx: (x0 - x as i64) as usize,
        sy: (y0 - y as i64) as usize,
    })
}

/// The image we composite each frame before it is presented.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,       // how wide the frame is on screen (pixels)
    pub height: usize,      // how tall the frame is on screen (pixels)
    pub pixels: Vec<Color>, // row-major, length = width * height
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize, color: Color) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    /// Put a pixel if (x,y) is inside bounds.
    #[inline]
    pub fn put(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        self.pixels[y * self.width + x] = color;
    }

    pub fn row(&self, y: usize) -> &[Color] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Composite a solid color over `rect`, using `color.a` as the alpha.
    pub fn blend_rect(&mut self, rect: Rect, color: Color) {
        let Some(c) = clip(rect.x, rect.y, rect.width, rect.height, self.width, self.height) else {
            return;
        };
        for y in c.y0..c.y1 {
            let row = &mut self.pixels[y * self.width + c.x0..y * self.width + c.x1];
            for px in row {
                px.r = blend_channel(color.r, px.r, color.a);
                px.g = blend_channel(color.g, px.g, color.a);
                px.b = blend_channel(color.b, px.b, color.a);
            }
        }
    }

    /// Copy `src` verbatim with its top-left at (x, y); alpha is ignored.
    pub fn blit_opaque(&mut self, src: &FrameBuffer, x: i32, y: i32) {
        let Some(c) = clip(x, y, src.width, src.height, self.width, self.height) else {
            return;
        };
        let span = c.x1 - c.x0;
        for (i, dy) in (c.y0..c.y1).enumerate() {
            let s = (c.sy + i) * src.width + c.sx;
            let d = dy * self.width + c.x0;
            self.pixels[d..d + span].copy_from_slice(&src.pixels[s..s + span]);
        }
    }

    /// Source-over blit honouring the source's per-pixel alpha, scaled by `alpha`.
    pub fn blit_alpha(&mut self, src: &FrameBuffer, x: i32, y: i32, alpha: u8) {
        if alpha == 0 {
            return;
        }
        let Some(c) = clip(x, y, src.width, src.height, self.width, self.height) else {
            return;
        };
        for (i, dy) in (c.y0..c.y1).enumerate() {
            let srow = (c.sy + i) * src.width;
            for (j, dx) in (c.x0..c.x1).enumerate() {
                let s = src.pixels[srow + c.sx + j];
                let a = ((s.a as u32 * alpha as u32 + 127) / 255) as u8;
                if a == 0 {
                    continue;
                }
                let d = &mut self.pixels[dy * self.width + dx];
                d.r = blend_channel(s.r, d.r, a);
                d.g = blend_channel(s.g, d.g, a);
                d.b = blend_channel(s.b, d.b, a);
            }
        }
    }

    /// Component-wise add with saturation (all four channels).
    /// Visual: the destination only ever gets brighter.
    pub fn blit_additive(&mut self, src: &FrameBuffer, x: i32, y: i32) {
        let Some(c) = clip(x, y, src.width, src.height, self.width, self.height) else {
            return;
        };
        for (i, dy) in (c.y0..c.y1).enumerate() {
            let srow = (c.sy + i) * src.width;
            for (j, dx) in (c.x0..c.x1).enumerate() {
                let s = src.pixels[srow + c.sx + j];
                let d = &mut self.pixels[dy * self.width + dx];
                d.r = d.r.saturating_add(s.r);
                d.g = d.g.saturating_add(s.g);
                d.b = d.b.saturating_add(s.b);
                d.a = d.a.saturating_add(s.a);
            }
        }
    }

    /// Copy out the in-bounds part of `rect`. A rect fully off-screen yields
    /// an empty (0×0) buffer.
    pub fn copy_region(&self, rect: Rect) -> FrameBuffer {
        let Some(c) = clip(rect.x, rect.y, rect.width, rect.height, self.width, self.height) else {
            return FrameBuffer::new(0, 0, Color::TRANSPARENT);
        };
        let (w, h) = (c.x1 - c.x0, c.y1 - c.y0);
        let mut pixels = Vec::with_capacity(w * h);
        for y in c.y0..c.y1 {
            pixels.extend_from_slice(&self.pixels[y * self.width + c.x0..y * self.width + c.x1]);
        }
        FrameBuffer { width: w, height: h, pixels }
    }

    /// Pack into the window's 0x00RRGGBB buffer, reusing `out`'s allocation.
    pub fn write_0rgb(&self, out: &mut Vec<u32>) {
        out.clear();
        out.extend(self.pixels.iter().map(|c| c.to_0rgb()));
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let c = self.pixels[y as usize * self.width + x as usize];
            Rgba([c.r, c.g, c.b, c.a])
        })
    }

    pub fn from_rgba_image(img: &RgbaImage) -> FrameBuffer {
        let (w, h) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|Rgba([r, g, b, a])| Color::rgba(*r, *g, *b, *a))
            .collect();
        FrameBuffer { width: w as usize, height: h as usize, pixels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    #[test]
    fn blit_opaque_clips_negative_offsets() {
        let mut dst = FrameBuffer::new(4, 4, BLUE);
        let src = FrameBuffer::new(3, 3, RED);
        dst.blit_opaque(&src, -2, -2);
        assert_eq!(dst.get(0, 0), Some(RED));
        assert_eq!(dst.get(1, 0), Some(BLUE));
        assert_eq!(dst.get(0, 1), Some(BLUE));
    }

    #[test]
    fn blit_fully_offscreen_is_noop() {
        let mut dst = FrameBuffer::new(4, 4, BLUE);
        let before = dst.clone();
        let src = FrameBuffer::new(3, 3, RED);
        dst.blit_opaque(&src, 10, 0);
        dst.blit_alpha(&src, 0, -3, 255);
        dst.blit_additive(&src, -3, 2);
        assert_eq!(dst, before);
    }

    #[test]
    fn blit_alpha_skips_transparent_source_pixels() {
        let mut dst = FrameBuffer::new(2, 1, BLUE);
        let mut src = FrameBuffer::new(2, 1, RED);
        src.pixels[1] = Color::TRANSPARENT;
        dst.blit_alpha(&src, 0, 0, 255);
        assert_eq!(dst.pixels, vec![RED, BLUE]);
    }

    #[test]
    fn blit_alpha_scales_by_layer_alpha() {
        let mut dst = FrameBuffer::new(1, 1, Color::BLACK);
        let src = FrameBuffer::new(1, 1, Color::rgb(200, 200, 200));
        dst.blit_alpha(&src, 0, 0, 128);
        assert_eq!(dst.pixels[0].r, blend_channel(200, 0, 128));
    }

    #[test]
    fn blit_additive_saturates() {
        let mut dst = FrameBuffer::new(1, 1, Color::rgb(200, 10, 0));
        let src = FrameBuffer::new(1, 1, Color::rgba(100, 10, 0, 0));
        dst.blit_additive(&src, 0, 0);
        assert_eq!(dst.pixels[0], Color::rgb(255, 20, 0));
    }

    #[test]
    fn copy_region_clamps_to_bounds() {
        let mut fb = FrameBuffer::new(5, 5, BLUE);
        fb.put(4, 4, RED);
        let part = fb.copy_region(Rect::new(3, 3, 10, 10));
        assert_eq!((part.width, part.height), (2, 2));
        assert_eq!(part.get(1, 1), Some(RED));

        let none = fb.copy_region(Rect::new(-10, 0, 5, 5));
        assert_eq!((none.width, none.height), (0, 0));
    }

    #[test]
    fn blend_rect_full_and_zero_alpha() {
        let mut fb = FrameBuffer::new(2, 2, Color::rgb(100, 100, 100));
        fb.blend_rect(Rect::new(0, 0, 2, 1), Color::rgba(0, 0, 0, 0));
        assert_eq!(fb.get(0, 0), Some(Color::rgb(100, 100, 100)));
        fb.blend_rect(Rect::new(0, 0, 2, 1), Color::rgba(0, 0, 0, 255));
        assert_eq!(fb.get(1, 0), Some(Color::rgb(0, 0, 0)));
        assert_eq!(fb.get(1, 1), Some(Color::rgb(100, 100, 100)));
    }

    #[test]
    fn rgba_image_conversion_keeps_pixels() {
        let mut fb = FrameBuffer::new(3, 2, BLUE);
        fb.put(2, 1, Color::rgba(1, 2, 3, 4));
        let back = FrameBuffer::from_rgba_image(&fb.to_rgba_image());
        assert_eq!(back, fb);
    }

    #[test]
    fn color_from_components() {
        assert_eq!(Color::try_from(vec![1, 2, 3]), Ok(Color::rgb(1, 2, 3)));
        assert_eq!(Color::try_from(vec![1, 2, 3, 4]), Ok(Color::rgba(1, 2, 3, 4)));
        assert!(Color::try_from(vec![1, 2]).is_err());
    }
}
