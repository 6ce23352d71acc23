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
//! Native input source: polls the SDL2 host event queue and translates it to the normalized
//! stream. Runs entirely on the UI thread, so `drain` never blocks on a background reader.

use sdl2::event::Event;
use sdl2::mouse::MouseButton as SdlMouseButton;
use sdl2::EventPump;

use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::input::{Capabilities, MouseButton, MouseButtons, NormalizedEvent};

/// Host event queue reader. `mouse_emulation` additionally mirrors mouse clicks/motion into
/// synthetic finger events when enabled.
pub struct NativeSource {
    sdl: sdl2::Sdl,
    event_pump: EventPump,
    held_buttons: MouseButtons,
    mouse_emulation: bool,
    surface_size: (u32, u32),
}

impl NativeSource {
    /// Initializes SDL2's event subsystem and grabs its event pump.
    pub fn start() -> CoreResult<Self> {
        let sdl = sdl2::init().map_err(|e| CoreError::new(ErrorKind::InputDeviceUnavailable, format!("sdl2::init: {e}")))?;
        let event_pump = sdl
            .event_pump()
            .map_err(|e| CoreError::new(ErrorKind::InputDeviceUnavailable, format!("event_pump: {e}")))?;
        Ok(Self { sdl, event_pump, held_buttons: MouseButtons::empty(), mouse_emulation: false, surface_size: (1, 1) })
    }

    /// Enables mirroring mouse clicks/motion to synthetic finger events, per
    /// `input.mouse_emulation`.
    pub fn set_mouse_emulation(&mut self, enabled: bool) { self.mouse_emulation = enabled; }

    /// Tells the source the current surface pixel size, used to normalize mouse-emulated
    /// finger coordinates to `[0, 1]`. Call this whenever the backend's surface is resized.
    pub fn set_surface_size(&mut self, width: u32, height: u32) { self.surface_size = (width.max(1), height.max(1)); }

    /// Host pointer/keyboard capabilities; SDL2 always reports mouse and keyboard support.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities { has_touch: false, max_touch_points: 0, has_mouse: true, has_keyboard: true, ..Default::default() }
    }

    /// Drains the SDL2 event queue, translating each event to zero or more normalized events.
    pub fn drain(&mut self) -> Vec<NormalizedEvent> {
        let mut out = Vec::new();
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => out.push(NormalizedEvent::Quit),
                Event::MouseButtonDown { x, y, mouse_btn, .. } => {
                    if let Some(button) = map_button(mouse_btn) {
                        self.held_buttons.insert(button_flag(button));
                        out.push(NormalizedEvent::MouseButtonDown { button, x, y });
                        if self.mouse_emulation {
                            out.push(synthetic_finger_down(x, y, self.surface_size));
                        }
                    }
                }
                Event::MouseButtonUp { x, y, mouse_btn, .. } => {
                    if let Some(button) = map_button(mouse_btn) {
                        self.held_buttons.remove(button_flag(button));
                        out.push(NormalizedEvent::MouseButtonUp { button, x, y });
                        if self.mouse_emulation {
                            out.push(synthetic_finger_up(x, y, self.surface_size));
                        }
                    }
                }
                Event::MouseMotion { x, y, .. } => {
                    out.push(NormalizedEvent::MouseMotion { x, y, buttons: self.held_buttons });
                    if self.mouse_emulation && !self.held_buttons.is_empty() {
                        out.push(synthetic_finger_motion(x, y, self.surface_size));
                    }
                }
                Event::KeyDown { keycode: Some(code), .. } => out.push(NormalizedEvent::KeyDown { keysym: code as u32 }),
                Event::KeyUp { keycode: Some(code), .. } => out.push(NormalizedEvent::KeyUp { keysym: code as u32 }),
                _ => {}
            }
        }
        out
    }

    /// SDL2 has no persistent device handle to release; present for interface symmetry with
    /// the evdev source.
    pub fn stop(&mut self) { let _ = &self.sdl; }
}

/// Mouse-emulation finger id: synthetic touches always use id 0, since the host mouse can
/// only ever represent a single contact point.
const MOUSE_EMULATION_FINGER_ID: u32 = 0;

fn normalize(x: i32, y: i32, size: (u32, u32)) -> (f32, f32) {
    (x as f32 / size.0 as f32, y as f32 / size.1 as f32)
}

fn synthetic_finger_down(x: i32, y: i32, size: (u32, u32)) -> NormalizedEvent {
    let (x_norm, y_norm) = normalize(x, y, size);
    NormalizedEvent::FingerDown { touch_id: 0, finger_id: MOUSE_EMULATION_FINGER_ID, x_norm, y_norm, pressure: 1.0 }
}
fn synthetic_finger_motion(x: i32, y: i32, size: (u32, u32)) -> NormalizedEvent {
    let (x_norm, y_norm) = normalize(x, y, size);
    NormalizedEvent::FingerMotion { touch_id: 0, finger_id: MOUSE_EMULATION_FINGER_ID, x_norm, y_norm, pressure: 1.0 }
}
fn synthetic_finger_up(x: i32, y: i32, size: (u32, u32)) -> NormalizedEvent {
    let (x_norm, y_norm) = normalize(x, y, size);
    NormalizedEvent::FingerUp { touch_id: 0, finger_id: MOUSE_EMULATION_FINGER_ID, x_norm, y_norm }
}

fn map_button(button: SdlMouseButton) -> Option<MouseButton> {
    match button {
        SdlMouseButton::Left => Some(MouseButton::Left),
        SdlMouseButton::Right => Some(MouseButton::Right),
        SdlMouseButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

fn button_flag(button: MouseButton) -> MouseButtons {
    match button {
        MouseButton::Left => MouseButtons::LEFT,
        MouseButton::Right => MouseButtons::RIGHT,
        MouseButton::Middle => MouseButtons::MIDDLE,
    }
}
