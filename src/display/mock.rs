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
//! In-memory backend with no window system or device dependency, used by integration tests
//! to exercise the application loop headlessly.

use crate::display::{BackendInfo, Surface};
use crate::error::CoreResult;

/// Records every frame presented, so tests can assert on what was last drawn.
pub struct MockBackend {
    surface: Surface,
    present_count: u32,
}

impl MockBackend {
    /// Creates a mock backend with a surface of the given pixel dimensions.
    pub fn new(width: u32, height: u32) -> Self { Self { surface: Surface::new(width, height), present_count: 0 } }

    /// Returns `{actual_width, actual_height}`.
    pub fn info(&self) -> BackendInfo { BackendInfo { actual_width: self.surface.width(), actual_height: self.surface.height() } }

    /// Mutable access to the surface.
    pub fn surface_mut(&mut self) -> &mut Surface { &mut self.surface }

    /// Number of times `present` has been called, for test assertions.
    pub fn present_count(&self) -> u32 { self.present_count }

    /// No-op commit; just counts the call.
    pub fn present(&mut self) -> CoreResult<()> {
        self.present_count += 1;
        Ok(())
    }
}
