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
//! Pixel-space geometry: colors, points, and rectangles shared by every subsystem.

use std::ops::Add;

/// 8-bit RGBA color.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
#[repr(C)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Fully opaque black.
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    /// Fully opaque white.
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    /// Fully transparent black, used as the "no fill" sentinel.
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    /// Builds a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self { Self { r, g, b, a } }

    /// Parses a `#RRGGBB` or `#RRGGBBAA` hex string as used by `ui.colors.background`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                (r, g, b, 255)
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
                (r, g, b, a)
            }
            _ => return None,
        };
        Some(Self::new(bytes.0, bytes.1, bytes.2, bytes.3))
    }
}

/// Convenience constructor for [`Color`].
pub const fn color(r: u8, g: u8, b: u8, a: u8) -> Color { Color::new(r, g, b, a) }

/// Integer 2D point, used for touch/pointer positions in pixel space.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Builds a point from its coordinates.
    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point { Point::new(self.x + rhs.x, self.y + rhs.y) }
}

/// Convenience constructor for [`Point`].
pub const fn point(x: i32, y: i32) -> Point { Point::new(x, y) }

/// Axis-aligned integer rectangle in pixel space: `x, y, w, h`.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub w: i32,
    /// Height in pixels.
    pub h: i32,
}

impl Rect {
    /// Builds a rectangle from its fields.
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self { Self { x, y, w, h } }

    /// Returns the rectangle's top-left origin.
    pub const fn origin(&self) -> Point { Point::new(self.x, self.y) }

    /// Returns `true` if `p` lies within the rectangle (half-open on the right/bottom edge).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }

    /// Returns a copy translated so its origin equals `origin + relative.origin()`, keeping
    /// `relative`'s width/height. This realizes the `bounds = parent.bounds.origin +
    /// relative_bounds` invariant from the widget data model.
    pub fn translate_from(origin: Point, relative: Rect) -> Rect {
        Rect::new(origin.x + relative.x, origin.y + relative.y, relative.w, relative.h)
    }

    /// Expands (or shrinks, with a negative `n`) the rectangle uniformly on all sides.
    pub fn expand(&self, n: i32) -> Rect { Rect::new(self.x - n, self.y - n, self.w + n * 2, self.h + n * 2) }
}

/// Convenience constructor for [`Rect`].
pub const fn rect(x: i32, y: i32, w: i32, h: i32) -> Rect { Rect::new(x, y, w, h) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parses_rgb_and_rgba() {
        assert_eq!(Color::from_hex("#112233"), Some(color(0x11, 0x22, 0x33, 255)));
        assert_eq!(Color::from_hex("112233ff"), Some(color(0x11, 0x22, 0x33, 255)));
        assert_eq!(Color::from_hex("bad"), None);
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = rect(10, 10, 5, 5);
        assert!(r.contains(point(10, 10)));
        assert!(r.contains(point(14, 14)));
        assert!(!r.contains(point(15, 14)));
        assert!(!r.contains(point(9, 10)));
    }

    #[test]
    fn translate_from_applies_parent_origin() {
        let parent_origin = point(100, 50);
        let relative = rect(5, 6, 20, 30);
        let abs = Rect::translate_from(parent_origin, relative);
        assert_eq!(abs, rect(105, 56, 20, 30));
    }
}
