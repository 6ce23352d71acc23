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
//! Direct-to-DRM backend for embedded panels with no window system: renders into a software
//! surface, then blits it into a mode-set dumb buffer and scans it out.

use std::fs::{File, OpenOptions};
use std::os::unix::io::{AsFd, BorrowedFd};

use drm::control::{connector, crtc, dumbbuffer::DumbBuffer, Device as ControlDevice, ModeTypeFlags};
use drm::Device as BasicDevice;
use drm_fourcc::DrmFourcc;

use crate::config::DisplayConfig;
use crate::display::{BackendInfo, Surface};
use crate::error::{CoreError, CoreResult, ErrorKind};

/// Thin handle granting DRM ioctl access over an open device file.
struct Card(File);

impl AsFd for Card {
    fn as_fd(&self) -> BorrowedFd<'_> { self.0.as_fd() }
}
impl BasicDevice for Card {}
impl ControlDevice for Card {}

/// Owns the DRM device handle, the selected CRTC/connector/mode, a mapped dumb buffer, and
/// the in-memory software surface blitted into it on `present`.
pub struct DirectBackend {
    card: Card,
    crtc: crtc::Handle,
    framebuffer: drm::control::framebuffer::Handle,
    // `Option` so `Drop` can move it out for `destroy_dumb_buffer`, which consumes it.
    dumb_buffer: Option<DumbBuffer>,
    surface: Surface,
    mode_set: bool,
}

const DEFAULT_DEVICE_PATH: &str = "/dev/dri/card0";

impl DirectBackend {
    /// Enumerates DRM resources, picks the first connected connector, its preferred mode,
    /// allocates and maps a dumb buffer sized to that mode, and prepares a same-sized
    /// software surface.
    pub fn create(_config: &DisplayConfig) -> CoreResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(DEFAULT_DEVICE_PATH)
            .map_err(|e| CoreError::new(ErrorKind::DisplayInitFailed, format!("open {DEFAULT_DEVICE_PATH}: {e}")))?;
        let card = Card(file);

        let resources = card
            .resource_handles()
            .map_err(|e| CoreError::new(ErrorKind::DisplayInitFailed, format!("resource_handles: {e}")))?;

        let connector_info = resources
            .connectors()
            .iter()
            .filter_map(|handle| card.get_connector(*handle, true).ok())
            .find(|info| info.state() == connector::State::Connected)
            .ok_or_else(|| CoreError::new(ErrorKind::DisplayInitFailed, "direct: no connected connector"))?;

        let mode = connector_info
            .modes()
            .iter()
            .find(|mode| mode.mode_type().contains(ModeTypeFlags::PREFERRED))
            .or_else(|| connector_info.modes().first())
            .copied()
            .ok_or_else(|| CoreError::new(ErrorKind::DisplayInitFailed, "direct: connector has no modes"))?;

        let encoder = connector_info
            .current_encoder()
            .and_then(|handle| card.get_encoder(handle).ok())
            .ok_or_else(|| CoreError::new(ErrorKind::DisplayInitFailed, "direct: connector has no encoder"))?;
        let crtc_handle = encoder
            .crtc()
            .or_else(|| resources.filter_crtcs(encoder.possible_crtcs()).first().copied())
            .ok_or_else(|| CoreError::new(ErrorKind::DisplayInitFailed, "direct: no usable crtc"))?;

        let (width, height) = mode.size();
        let mut dumb_buffer = card
            .create_dumb_buffer((width as u32, height as u32), DrmFourcc::Xrgb8888, 32)
            .map_err(|e| CoreError::new(ErrorKind::DisplayInitFailed, format!("create_dumb_buffer: {e}")))?;
        let framebuffer = card
            .add_framebuffer(&dumb_buffer, 24, 32)
            .map_err(|e| CoreError::new(ErrorKind::DisplayInitFailed, format!("add_framebuffer: {e}")))?;

        {
            let mut map = card
                .map_dumb_buffer(&mut dumb_buffer)
                .map_err(|e| CoreError::new(ErrorKind::DisplayInitFailed, format!("map_dumb_buffer: {e}")))?;
            map.as_mut().fill(0);
        }

        card.set_crtc(crtc_handle, Some(framebuffer), (0, 0), &[connector_info.handle()], Some(mode))
            .map_err(|e| CoreError::new(ErrorKind::DisplayInitFailed, format!("set_crtc: {e}")))?;

        Ok(Self {
            card,
            crtc: crtc_handle,
            framebuffer,
            dumb_buffer: Some(dumb_buffer),
            surface: Surface::new(width as u32, height as u32),
            mode_set: true,
        })
    }

    /// Returns `{actual_width, actual_height}`.
    pub fn info(&self) -> BackendInfo { BackendInfo { actual_width: self.surface.width(), actual_height: self.surface.height() } }

    /// Mutable access to the software surface.
    pub fn surface_mut(&mut self) -> &mut Surface { &mut self.surface }

    /// Blits the software surface into the mapped dumb buffer, respecting its pitch, then
    /// flips it onto the active CRTC. Surfaces [`ErrorKind::DisplayDisconnected`] if display
    /// master privileges have been lost, which the application loop treats as fatal.
    ///
    /// `Surface` stores pixels as `[r, g, b, a]`, but the dumb buffer is allocated
    /// `DrmFourcc::Xrgb8888`, which on these little-endian targets is `[b, g, r, x]` in
    /// memory; the blit below swaps the red and blue bytes per pixel rather than copying the
    /// row straight across, or every color would come out channel-swapped on the panel.
    pub fn present(&mut self) -> CoreResult<()> {
        if !self.mode_set {
            return Err(CoreError::new(ErrorKind::DisplayDisconnected, "direct::present: lost display master"));
        }
        let dumb_buffer = self.dumb_buffer.as_mut().expect("dumb buffer released before present");
        let pitch = dumb_buffer.pitch() as usize;
        let src_stride = self.surface.stride();
        let rows = self.surface.height() as usize;
        let row_pixels = (src_stride.min(pitch)) / 4;

        let mut map = self
            .card
            .map_dumb_buffer(dumb_buffer)
            .map_err(|e| CoreError::new(ErrorKind::RenderFailed, format!("map_dumb_buffer: {e}")))?;
        let dst = map.as_mut();
        let src = self.surface.pixels();
        for row in 0..rows {
            let src_row = row * src_stride;
            let dst_row = row * pitch;
            for px in 0..row_pixels {
                let so = src_row + px * 4;
                let d_o = dst_row + px * 4;
                dst[d_o] = src[so + 2];
                dst[d_o + 1] = src[so + 1];
                dst[d_o + 2] = src[so];
                dst[d_o + 3] = src[so + 3];
            }
        }
        drop(map);

        self.card
            .page_flip(self.crtc, self.framebuffer, drm::control::PageFlipFlags::empty(), None)
            .map_err(|e| CoreError::new(ErrorKind::RenderFailed, format!("page_flip: {e}")))?;
        Ok(())
    }
}

impl Drop for DirectBackend {
    /// Releases every DRM resource this backend holds, per the scoped-release invariant in
    /// §5: disables the CRTC mode-set, destroys the framebuffer object, then destroys (and
    /// implicitly unmaps) the dumb buffer backing it.
    fn drop(&mut self) {
        if let Err(e) = self.card.set_crtc(self.crtc, None, (0, 0), &[], None) {
            log::warn!("direct backend: failed to disable crtc: {e}");
        }
        if let Err(e) = self.card.destroy_framebuffer(self.framebuffer) {
            log::warn!("direct backend: failed to release framebuffer: {e}");
        }
        if let Some(dumb_buffer) = self.dumb_buffer.take() {
            if let Err(e) = self.card.destroy_dumb_buffer(dumb_buffer) {
                log::warn!("direct backend: failed to release dumb buffer: {e}");
            }
        }
    }
}
