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
//! SDL2-backed windowed backend for desktop development hosts. Renders into a software
//! [`Surface`] and blits it to the window via a streaming texture every `present`.

use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Texture, TextureCreator, WindowCanvas};
use sdl2::video::WindowContext;
use sdl2::Sdl;

use crate::config::DisplayConfig;
use crate::display::{BackendInfo, Surface};
use crate::error::{CoreError, CoreResult, ErrorKind};

/// Owns the SDL2 context, window/canvas, and a streaming texture mirroring the software
/// surface. SDL2 resources are released in `Drop` order on teardown.
pub struct WindowedBackend {
    _sdl: Sdl,
    canvas: WindowCanvas,
    texture_creator: TextureCreator<WindowContext>,
    surface: Surface,
}

impl WindowedBackend {
    /// Opens a window sized per `config` and prepares a matching software surface.
    pub fn create(config: &DisplayConfig) -> CoreResult<Self> {
        let sdl = sdl2::init().map_err(|e| CoreError::new(ErrorKind::DisplayInitFailed, format!("sdl2::init: {e}")))?;
        let video = sdl.video().map_err(|e| CoreError::new(ErrorKind::DisplayInitFailed, format!("sdl2 video: {e}")))?;

        let mut builder = video.window("panelkit", config.width, config.height);
        builder.position_centered();
        if config.fullscreen {
            builder.fullscreen();
        }
        let window = builder
            .build()
            .map_err(|e| CoreError::new(ErrorKind::DisplayInitFailed, format!("window build: {e}")))?;

        let mut canvas_builder = window.into_canvas();
        if config.vsync {
            canvas_builder = canvas_builder.present_vsync();
        }
        let canvas = canvas_builder
            .build()
            .map_err(|e| CoreError::new(ErrorKind::DisplayInitFailed, format!("canvas build: {e}")))?;

        let (width, height) = canvas.output_size().map_err(|e| CoreError::new(ErrorKind::DisplayInitFailed, e))?;
        let texture_creator = canvas.texture_creator();

        Ok(Self { _sdl: sdl, canvas, texture_creator, surface: Surface::new(width, height) })
    }

    /// Returns `{actual_width, actual_height}`.
    pub fn info(&self) -> BackendInfo { BackendInfo { actual_width: self.surface.width(), actual_height: self.surface.height() } }

    /// Mutable access to the software surface.
    pub fn surface_mut(&mut self) -> &mut Surface { &mut self.surface }

    fn make_texture(&self) -> CoreResult<Texture<'_>> {
        self.texture_creator
            .create_texture_streaming(PixelFormatEnum::RGBA32, self.surface.width(), self.surface.height())
            .map_err(|e| CoreError::new(ErrorKind::RenderFailed, format!("create_texture_streaming: {e}")))
    }

    /// Uploads the software surface into a streaming texture and blits it to the window.
    pub fn present(&mut self) -> CoreResult<()> {
        let stride = self.surface.stride();
        let mut texture = self.make_texture()?;
        texture
            .update(None, self.surface.pixels(), stride)
            .map_err(|e| CoreError::new(ErrorKind::RenderFailed, format!("texture update: {e}")))?;
        self.canvas
            .copy(&texture, None, None)
            .map_err(|e| CoreError::new(ErrorKind::RenderFailed, format!("canvas copy: {e}")))?;
        self.canvas.present();
        Ok(())
    }
}
