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
//! Built-in [`TextMeasurer`] stand-in used when no real font-rendering collaborator is
//! wired in (font rasterization is a Non-goal of the core). Every glyph is a fixed-advance
//! solid block sized off the requested point size, which is enough to exercise layout,
//! caching, and the application loop without shipping a font file.

use crate::geometry::Color;
use crate::widget::{FontHandle, TextMeasurer, TextTexture};

/// Fraction of `size` used as a glyph's advance width; chosen to read as roughly
/// monospace-proportioned blocks rather than squares.
const ADVANCE_RATIO: f32 = 0.6;
/// Fraction of `size` left blank between glyphs so adjacent blocks don't visually merge.
const GAP_RATIO: f32 = 0.12;

/// Renders every glyph as a solid rectangle of uniform advance. `font` is accepted but
/// ignored: this measurer does not distinguish font handles, since it has no font files to
/// tell apart.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockTextMeasurer;

impl BlockTextMeasurer {
    /// Builds a new block-glyph measurer.
    pub fn new() -> Self { Self }

    fn glyph_advance(size: u32) -> u32 { ((size as f32) * ADVANCE_RATIO).round().max(1.0) as u32 }

    fn glyph_gap(size: u32) -> u32 { ((size as f32) * GAP_RATIO).round() as u32 }
}

impl TextMeasurer for BlockTextMeasurer {
    fn measure(&self, text: &str, _font: FontHandle, size: u32) -> (u32, u32) {
        let count = text.chars().count() as u32;
        if count == 0 {
            return (0, size);
        }
        let advance = Self::glyph_advance(size);
        let gap = Self::glyph_gap(size);
        (count * advance + count.saturating_sub(1) * gap, size)
    }

    fn rasterize(&self, text: &str, font: FontHandle, size: u32, color: Color) -> TextTexture {
        let (width, height) = self.measure(text, font, size);
        let mut pixels = vec![0u8; (width as usize) * (height as usize) * 4];
        if width == 0 || height == 0 {
            return TextTexture { width, height, pixels };
        }

        let advance = Self::glyph_advance(size);
        let gap = Self::glyph_gap(size);
        let glyph_margin = (size / 6).max(1);

        for (index, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let glyph_x0 = index as u32 * (advance + gap);
            let x0 = glyph_x0 + glyph_margin.min(advance / 2);
            let x1 = (glyph_x0 + advance).saturating_sub(glyph_margin.min(advance / 2));
            let y0 = glyph_margin.min(height / 2);
            let y1 = height.saturating_sub(glyph_margin.min(height / 2));
            for y in y0..y1 {
                for x in x0..x1.min(width) {
                    let offset = ((y * width + x) * 4) as usize;
                    pixels[offset] = color.r;
                    pixels[offset + 1] = color.g;
                    pixels[offset + 2] = color.b;
                    pixels[offset + 3] = color.a;
                }
            }
        }
        TextTexture { width, height, pixels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_measures_zero_width() {
        let measurer = BlockTextMeasurer::new();
        assert_eq!(measurer.measure("", 0, 18), (0, 18));
    }

    #[test]
    fn longer_string_measures_wider() {
        let measurer = BlockTextMeasurer::new();
        let (short_w, _) = measurer.measure("a", 0, 18);
        let (long_w, _) = measurer.measure("ab", 0, 18);
        assert!(long_w > short_w);
    }

    #[test]
    fn rasterize_produces_matching_texture_dims() {
        let measurer = BlockTextMeasurer::new();
        let (w, h) = measurer.measure("hi", 0, 20);
        let texture = measurer.rasterize("hi", 0, 20, Color::WHITE);
        assert_eq!((texture.width, texture.height), (w, h));
        assert_eq!(texture.pixels.len(), (w as usize) * (h as usize) * 4);
    }

    #[test]
    fn whitespace_glyph_leaves_no_opaque_pixels_in_its_slot() {
        let measurer = BlockTextMeasurer::new();
        let texture = measurer.rasterize(" ", 0, 18, Color::WHITE);
        assert!(texture.pixels.iter().all(|&b| b == 0));
    }
}
