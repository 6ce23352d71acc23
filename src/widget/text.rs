//
// Copyright 2022-Present (c) Raja Lehtihet & Wael El Oraiby
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice,
// this list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
// this list of conditions and the following disclaimer in the documentation
// and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors
// may be used to endorse or promote products derived from this software without
// specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE
// ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE
// LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR
// CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF
// SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS
// INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN
// CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE)
// ARISING IN ANY WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE
// POSSIBILITY OF SUCH DAMAGE.
//
//! Single run of text, rasterized through a [`super::TextMeasurer`] collaborator and cached
//! until its content, color, or font changes.

use crate::display::Surface;
use crate::geometry::Color;
use crate::widget::{FontHandle, TextAlign, TextMeasurer, TextTexture};

/// The cache key a rasterized texture is valid for. Any field changing invalidates it.
#[derive(Clone, PartialEq)]
struct CacheKey {
    text: String,
    color: Color,
    font: FontHandle,
    size: u32,
}

/// A single text run: string content, font selection, color, and alignment within its
/// widget's bounds. Rasterization is cached and only redone when `text`/`color`/`font`/`size`
/// actually change, never on every frame.
#[derive(Clone)]
pub struct TextWidget {
    text: String,
    font: FontHandle,
    size: u32,
    color: Color,
    align: TextAlign,
    cache_key: Option<CacheKey>,
    cached: Option<TextTexture>,
}

impl TextWidget {
    /// Builds a text widget with the given initial content.
    pub fn new(text: impl Into<String>, font: FontHandle, size: u32, color: Color) -> Self {
        Self { text: text.into(), font, size, color, align: TextAlign::Left, cache_key: None, cached: None }
    }

    /// Sets the horizontal alignment.
    pub fn with_align(mut self, align: TextAlign) -> Self { self.align = align; self }

    /// Current text content.
    pub fn text(&self) -> &str { &self.text }

    /// Replaces the text content, invalidating the cached rasterization if it actually changed.
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.cached = None;
            self.cache_key = None;
        }
    }

    /// Replaces the foreground color, invalidating the cache if it actually changed.
    pub fn set_color(&mut self, color: Color) {
        if color != self.color {
            self.color = color;
            self.cached = None;
            self.cache_key = None;
        }
    }

    /// Ensures `self.cached` reflects the current `(text, color, font, size)`, rasterizing
    /// through `measurer` only when the cache is stale.
    fn ensure_rasterized(&mut self, measurer: &dyn TextMeasurer) {
        let key = CacheKey { text: self.text.clone(), color: self.color, font: self.font, size: self.size };
        if self.cache_key.as_ref() == Some(&key) && self.cached.is_some() {
            return;
        }
        self.cached = Some(measurer.rasterize(&self.text, self.font, self.size, self.color));
        self.cache_key = Some(key);
    }

    /// Paints the text within `bounds`, aligned per `self.align`.
    pub fn render(&mut self, bounds: crate::geometry::Rect, surface: &mut Surface, measurer: &dyn TextMeasurer) {
        if self.text.is_empty() {
            return;
        }
        self.ensure_rasterized(measurer);
        let Some(texture) = self.cached.as_ref() else { return };
        let x = match self.align {
            TextAlign::Left => bounds.x,
            TextAlign::Center => bounds.x + (bounds.w - texture.width as i32) / 2,
            TextAlign::Right => bounds.x + bounds.w - texture.width as i32,
        };
        let y = bounds.y + (bounds.h - texture.height as i32) / 2;
        blit_texture(surface, texture, x, y);
    }
}

fn blit_texture(surface: &mut Surface, texture: &TextTexture, x: i32, y: i32) {
    for row in 0..texture.height as i32 {
        let dst_y = y + row;
        if dst_y < 0 || dst_y as u32 >= surface.height() {
            continue;
        }
        for col in 0..texture.width as i32 {
            let dst_x = x + col;
            if dst_x < 0 || dst_x as u32 >= surface.width() {
                continue;
            }
            let src_offset = (row as usize * texture.width as usize + col as usize) * 4;
            let pixel = &texture.pixels[src_offset..src_offset + 4];
            let color = Color::new(pixel[0], pixel[1], pixel[2], pixel[3]);
            surface.fill_rect(dst_x, dst_y, 1, 1, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedMeasurer;
    impl TextMeasurer for FixedMeasurer {
        fn measure(&self, text: &str, _font: FontHandle, _size: u32) -> (u32, u32) { (text.len() as u32 * 8, 16) }
        fn rasterize(&self, text: &str, _font: FontHandle, _size: u32, color: Color) -> TextTexture {
            let (w, h) = (text.len() as u32 * 8, 16);
            TextTexture { width: w, height: h, pixels: vec![color.r, color.g, color.b, color.a].repeat((w * h) as usize) }
        }
    }

    #[test]
    fn set_text_invalidates_cache() {
        let mut widget = TextWidget::new("hello", 1, 18, Color::WHITE);
        let measurer = FixedMeasurer;
        widget.ensure_rasterized(&measurer);
        let first_key = widget.cache_key.clone().unwrap();
        widget.set_text("world");
        assert!(widget.cached.is_none());
        widget.ensure_rasterized(&measurer);
        assert_ne!(widget.cache_key.unwrap().text, first_key.text);
    }

    #[test]
    fn unchanged_text_keeps_cache() {
        let mut widget = TextWidget::new("hello", 1, 18, Color::WHITE);
        let measurer = FixedMeasurer;
        widget.ensure_rasterized(&measurer);
        widget.set_text("hello");
        assert!(widget.cached.is_some(), "setting the same text must not drop the cache");
    }
}
