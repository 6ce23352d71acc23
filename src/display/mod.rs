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
//! Display backend abstraction: a software RGBA8 [`Surface`] the widget manager paints
//! into, presented either through a desktop window or directly through DRM scanout.

#[cfg(feature = "windowed")]
pub mod windowed;

#[cfg(feature = "direct")]
pub mod direct;

pub mod mock;

use crate::config::{BackendKind, DisplayConfig};
use crate::error::CoreResult;
use crate::geometry::Color;

/// A software RGBA8 pixel buffer, row-major, top-left origin, `stride` bytes per row (which
/// may exceed `width * 4` when the backend requires pitch-aligned scanout memory).
pub struct Surface {
    width: u32,
    height: u32,
    stride: usize,
    pixels: Vec<u8>,
}

impl Surface {
    /// Allocates a zeroed (transparent black) surface of the given pixel dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        let stride = width as usize * 4;
        Self { width, height, stride, pixels: vec![0u8; stride * height as usize] }
    }

    /// Pixel width.
    pub fn width(&self) -> u32 { self.width }
    /// Pixel height.
    pub fn height(&self) -> u32 { self.height }
    /// Bytes per row.
    pub fn stride(&self) -> usize { self.stride }
    /// Raw pixel bytes, `stride * height` long.
    pub fn pixels(&self) -> &[u8] { &self.pixels }

    /// Fills the whole surface with `color`.
    pub fn clear(&mut self, color: Color) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Paints a single filled, axis-aligned rectangle in `color`, clipped to the surface.
    /// Alpha-blends over the existing contents using `color.a` as the source weight.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        if w <= 0 || h <= 0 {
            return;
        }
        let x0 = x.max(0) as u32;
        let y0 = y.max(0) as u32;
        let x1 = ((x + w).max(0) as u32).min(self.width);
        let y1 = ((y + h).max(0) as u32).min(self.height);
        for py in y0..y1 {
            let row = py as usize * self.stride;
            for px in x0..x1 {
                let offset = row + px as usize * 4;
                if color.a == 255 {
                    self.pixels[offset..offset + 4].copy_from_slice(&[color.r, color.g, color.b, 255]);
                } else if color.a > 0 {
                    blend_pixel(&mut self.pixels[offset..offset + 4], color);
                }
            }
        }
    }
}

fn blend_pixel(dst: &mut [u8], src: Color) {
    let a = src.a as u32;
    let inv = 255 - a;
    dst[0] = ((src.r as u32 * a + dst[0] as u32 * inv) / 255) as u8;
    dst[1] = ((src.g as u32 * a + dst[1] as u32 * inv) / 255) as u8;
    dst[2] = ((src.b as u32 * a + dst[2] as u32 * inv) / 255) as u8;
    dst[3] = 255;
}

/// Observable properties a concrete backend exposes once constructed.
pub struct BackendInfo {
    /// Actual pixel width of the surface, which may differ from the requested width.
    pub actual_width: u32,
    /// Actual pixel height of the surface.
    pub actual_height: u32,
}

/// A concrete display output. Realized as a closed enum rather than a trait object, per the
/// widget-kind dispatch style this crate uses throughout.
pub enum Backend {
    /// SDL2-backed windowed backend, for desktop development hosts.
    #[cfg(feature = "windowed")]
    Windowed(windowed::WindowedBackend),
    /// DRM dumb-buffer backend, for embedded panels.
    #[cfg(feature = "direct")]
    Direct(direct::DirectBackend),
    /// In-memory backend used by integration tests; never presents anywhere visible.
    Mock(mock::MockBackend),
}

impl Backend {
    /// Constructs a backend per `config.backend`, auto-selecting when requested.
    ///
    /// Auto-selection picks the direct backend when a DRM device node is openable and no
    /// graphical-session environment hint (`WAYLAND_DISPLAY`/`DISPLAY`) is set; otherwise it
    /// picks windowed. If direct construction fails, falls back to windowed once and logs a
    /// warning, matching the recoverable-fault policy in the error handling design.
    pub fn create(config: &DisplayConfig) -> CoreResult<Backend> {
        let chosen = match config.backend {
            BackendKind::Auto => {
                if should_prefer_direct() {
                    BackendKind::Direct
                } else {
                    BackendKind::Windowed
                }
            }
            explicit => explicit,
        };
        log::info!("display backend selected: {chosen:?}");

        #[cfg(feature = "direct")]
        if chosen == BackendKind::Direct {
            match direct::DirectBackend::create(config) {
                Ok(backend) => return Ok(Backend::Direct(backend)),
                Err(e) => {
                    log::warn!("direct backend init failed, falling back to windowed: {e}");
                }
            }
        }

        #[cfg(feature = "windowed")]
        {
            return Ok(Backend::Windowed(windowed::WindowedBackend::create(config)?));
        }

        #[cfg(not(feature = "windowed"))]
        {
            Err(crate::error::CoreError::new(
                crate::error::ErrorKind::DisplayInitFailed,
                "Backend::create: no backend feature enabled",
            ))
        }
    }

    /// Returns `{actual_width, actual_height}`.
    pub fn info(&self) -> BackendInfo {
        match self {
            #[cfg(feature = "windowed")]
            Backend::Windowed(b) => b.info(),
            #[cfg(feature = "direct")]
            Backend::Direct(b) => b.info(),
            Backend::Mock(b) => b.info(),
        }
    }

    /// Mutable access to the software surface the widget manager paints into.
    pub fn surface_mut(&mut self) -> &mut Surface {
        match self {
            #[cfg(feature = "windowed")]
            Backend::Windowed(b) => b.surface_mut(),
            #[cfg(feature = "direct")]
            Backend::Direct(b) => b.surface_mut(),
            Backend::Mock(b) => b.surface_mut(),
        }
    }

    /// Commits the current frame: blits the software surface to the screen (direct: also
    /// mode-set/page-flip).
    pub fn present(&mut self) -> CoreResult<()> {
        match self {
            #[cfg(feature = "windowed")]
            Backend::Windowed(b) => b.present(),
            #[cfg(feature = "direct")]
            Backend::Direct(b) => b.present(),
            Backend::Mock(b) => b.present(),
        }
    }
}

#[cfg(feature = "direct")]
fn should_prefer_direct() -> bool {
    let has_graphical_session = std::env::var_os("WAYLAND_DISPLAY").is_some() || std::env::var_os("DISPLAY").is_some();
    if has_graphical_session {
        return false;
    }
    std::fs::OpenOptions::new().read(true).write(true).open("/dev/dri/card0").is_ok()
}

#[cfg(not(feature = "direct"))]
fn should_prefer_direct() -> bool { false }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_then_fill_rect_blends_alpha() {
        let mut surface = Surface::new(4, 4);
        surface.clear(Color::new(0, 0, 0, 255));
        surface.fill_rect(0, 0, 4, 4, Color::new(255, 0, 0, 128));
        let px = &surface.pixels()[0..4];
        assert_eq!(px[0], 128);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn fill_rect_clips_to_bounds() {
        let mut surface = Surface::new(2, 2);
        surface.fill_rect(-5, -5, 100, 100, Color::new(1, 2, 3, 255));
        assert_eq!(&surface.pixels()[0..4], &[1, 2, 3, 255]);
    }
}
