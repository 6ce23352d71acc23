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
//! Input source abstraction: normalizes evdev multitouch and native pointer/keyboard events
//! into a single stream of [`NormalizedEvent`]s with stable finger ids and `0..1` coordinates.

#[cfg(feature = "direct")]
pub mod evdev_source;
#[cfg(feature = "windowed")]
pub mod native_source;
pub mod mock_source;

use crate::config::InputConfig;
use crate::error::CoreResult;

/// A touch/mouse/keyboard event normalized away from any particular input backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NormalizedEvent {
    /// A new finger contact began. Coordinates are normalized to `[0, 1]` of the touch
    /// surface's reported range.
    FingerDown { touch_id: u32, finger_id: u32, x_norm: f32, y_norm: f32, pressure: f32 },
    /// An active finger moved.
    FingerMotion { touch_id: u32, finger_id: u32, x_norm: f32, y_norm: f32, pressure: f32 },
    /// A finger contact ended.
    FingerUp { touch_id: u32, finger_id: u32, x_norm: f32, y_norm: f32 },
    /// A mouse button was pressed, in surface pixel coordinates.
    MouseButtonDown { button: MouseButton, x: i32, y: i32 },
    /// A mouse button was released.
    MouseButtonUp { button: MouseButton, x: i32, y: i32 },
    /// The mouse moved; `buttons` is the bitmask of currently held buttons.
    MouseMotion { x: i32, y: i32, buttons: MouseButtons },
    /// A key was pressed.
    KeyDown { keysym: u32 },
    /// A key was released.
    KeyUp { keysym: u32 },
    /// The host requested termination (window close, SIGINT-equivalent).
    Quit,
}

/// Mouse buttons the native source distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel/auxiliary button.
    Middle,
}

bitflags::bitflags! {
    /// Bitmask of currently held mouse buttons, carried on `MouseMotion`.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct MouseButtons: u8 {
        /// Primary button held.
        const LEFT = 0b001;
        /// Secondary button held.
        const RIGHT = 0b010;
        /// Auxiliary button held.
        const MIDDLE = 0b100;
    }
}

/// Touch/mouse/keyboard capabilities a source exposes once started.
#[derive(Clone, Copy, Debug, Default)]
pub struct Capabilities {
    /// Whether the source can produce finger events at all.
    pub has_touch: bool,
    /// Maximum number of simultaneous touch contacts the device reports.
    pub max_touch_points: u32,
    /// Reported raw `ABS_MT_POSITION_X` minimum, before normalization.
    pub touch_x_min: i32,
    /// Reported raw `ABS_MT_POSITION_X` maximum.
    pub touch_x_max: i32,
    /// Reported raw `ABS_MT_POSITION_Y` minimum.
    pub touch_y_min: i32,
    /// Reported raw `ABS_MT_POSITION_Y` maximum.
    pub touch_y_max: i32,
    /// Whether the source can produce mouse events.
    pub has_mouse: bool,
    /// Whether the source can produce key events.
    pub has_keyboard: bool,
}

/// A concrete input source. Realized as a closed enum, matching the display backend's
/// trait-object-free dispatch style.
pub enum InputSource {
    /// Host native event queue (SDL2), for desktop development hosts.
    #[cfg(feature = "windowed")]
    Native(native_source::NativeSource),
    /// Raw evdev multitouch, for embedded panels.
    #[cfg(feature = "direct")]
    Evdev(evdev_source::EvdevSource),
    /// Deterministic scripted source, for tests.
    Mock(mock_source::MockSource),
}

impl InputSource {
    /// Constructs a source per `config.source`, auto-selecting evdev when `prefer_evdev` is
    /// set (the caller passes `true` exactly when the display backend chose direct) and
    /// native otherwise, per §4.4's auto-selection rule.
    pub fn create(config: &InputConfig, prefer_evdev: bool) -> CoreResult<InputSource> {
        use crate::config::InputSourceKind;
        let chosen = match config.source {
            InputSourceKind::Auto if prefer_evdev => InputSourceKind::Evdev,
            InputSourceKind::Auto => InputSourceKind::Native,
            explicit => explicit,
        };
        log::info!("input source selected: {chosen:?}");
        match chosen {
            #[cfg(feature = "direct")]
            InputSourceKind::Evdev => Ok(InputSource::Evdev(evdev_source::EvdevSource::start(config)?)),
            #[cfg(not(feature = "direct"))]
            InputSourceKind::Evdev => Err(crate::error::CoreError::new(
                crate::error::ErrorKind::InputDeviceUnavailable,
                "InputSource::create: evdev requires the `direct` feature",
            )),
            InputSourceKind::Mock => Ok(InputSource::Mock(mock_source::MockSource::new())),
            #[cfg(feature = "windowed")]
            _ => Ok(InputSource::Native(native_source::NativeSource::start()?)),
            #[cfg(not(feature = "windowed"))]
            _ => Err(crate::error::CoreError::new(
                crate::error::ErrorKind::InputDeviceUnavailable,
                "InputSource::create: native requires the `windowed` feature",
            )),
        }
    }

    /// Returns the device/queue's reported capabilities.
    pub fn capabilities(&self) -> Capabilities {
        match self {
            #[cfg(feature = "windowed")]
            InputSource::Native(s) => s.capabilities(),
            #[cfg(feature = "direct")]
            InputSource::Evdev(s) => s.capabilities(),
            InputSource::Mock(s) => s.capabilities(),
        }
    }

    /// Drains every normalized event produced since the last call, without blocking.
    pub fn drain(&mut self) -> Vec<NormalizedEvent> {
        match self {
            #[cfg(feature = "windowed")]
            InputSource::Native(s) => s.drain(),
            #[cfg(feature = "direct")]
            InputSource::Evdev(s) => s.drain(),
            InputSource::Mock(s) => s.drain(),
        }
    }

    /// Stops any background reader thread and releases device handles.
    pub fn stop(&mut self) {
        match self {
            #[cfg(feature = "windowed")]
            InputSource::Native(s) => s.stop(),
            #[cfg(feature = "direct")]
            InputSource::Evdev(s) => s.stop(),
            InputSource::Mock(_) => {}
        }
    }
}
