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
//! Raw evdev multitouch source: scans `/dev/input/event*` for a device whose absolute
//! capabilities include multitouch position X/Y, then runs a background reader thread
//! parsing the MT slot protocol into normalized finger events.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::thread::JoinHandle;

use evdev::{AbsoluteAxisType, Device, InputEventKind};

use crate::config::InputConfig;
use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::input::{Capabilities, NormalizedEvent};

/// Queue depth for the background reader → main loop channel. Generous enough to absorb a
/// full `SYN_REPORT` burst from a busy multitouch panel without blocking the reader thread.
const CHANNEL_CAPACITY: usize = 256;

/// One MT slot's tracked state, indexed by its protocol slot number rather than its
/// `ABS_MT_TRACKING_ID` (slots are reused; tracking ids are not, within a session).
#[derive(Default, Clone, Copy)]
struct SlotState {
    tracking_id: i32,
    x: i32,
    y: i32,
    active: bool,
    /// Set when this slot opened a new finger and hasn't yet produced its first `FingerDown`.
    pending_down: bool,
}

/// Background evdev reader plus the channel the main loop drains.
pub struct EvdevSource {
    capabilities: Capabilities,
    receiver: Receiver<NormalizedEvent>,
    reader: Option<JoinHandle<()>>,
    stop_sender: Option<SyncSender<()>>,
}

impl EvdevSource {
    /// Opens the configured or auto-detected device, reads its `absinfo` ranges, and spawns
    /// the background parser thread.
    pub fn start(config: &InputConfig) -> CoreResult<Self> {
        let (path, mut device) = find_device(config)?;
        log::info!("evdev: using multitouch device {path}");

        let abs_x = device
            .get_absinfo()
            .ok()
            .and_then(|mut infos| infos.find(|(axis, _)| *axis == AbsoluteAxisType::ABS_MT_POSITION_X).map(|(_, info)| info))
            .ok_or_else(|| CoreError::new(ErrorKind::InputDeviceUnavailable, format!("evdev: {path} missing ABS_MT_POSITION_X")))?;
        let abs_y = device
            .get_absinfo()
            .ok()
            .and_then(|mut infos| infos.find(|(axis, _)| *axis == AbsoluteAxisType::ABS_MT_POSITION_Y).map(|(_, info)| info))
            .ok_or_else(|| CoreError::new(ErrorKind::InputDeviceUnavailable, format!("evdev: {path} missing ABS_MT_POSITION_Y")))?;

        let capabilities = Capabilities {
            has_touch: true,
            max_touch_points: 10,
            touch_x_min: abs_x.minimum,
            touch_x_max: abs_x.maximum,
            touch_y_min: abs_y.minimum,
            touch_y_max: abs_y.maximum,
            has_mouse: false,
            has_keyboard: false,
        };

        let (tx, rx) = sync_channel(CHANNEL_CAPACITY);
        let (stop_tx, stop_rx) = sync_channel(1);
        let range = (abs_x.minimum, abs_x.maximum, abs_y.minimum, abs_y.maximum);
        let reader = std::thread::Builder::new()
            .name("panelkit-evdev".into())
            .spawn(move || reader_loop(device, tx, stop_rx, range))
            .map_err(|e| CoreError::new(ErrorKind::Io, format!("evdev: spawn reader thread: {e}")))?;

        Ok(Self { capabilities, receiver: rx, reader: Some(reader), stop_sender: Some(stop_tx) })
    }

    /// Reported touch ranges/capabilities.
    pub fn capabilities(&self) -> Capabilities { self.capabilities }

    /// Drains every normalized event produced by the reader thread so far, without blocking.
    pub fn drain(&mut self) -> Vec<NormalizedEvent> { self.receiver.try_iter().collect() }

    /// Signals the reader thread to stop and joins it with a bounded wait; on timeout the
    /// thread is detached and its device handle leaked deliberately, per the shutdown policy.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_sender.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(handle) = self.reader.take() {
            if !handle.is_finished() {
                log::warn!("evdev: reader thread still running at shutdown, detaching");
            }
            let _ = handle.join();
        }
    }
}

fn find_device(config: &InputConfig) -> CoreResult<(String, Device)> {
    if !config.device_path.is_empty() {
        let device = Device::open(&config.device_path)
            .map_err(|e| CoreError::new(ErrorKind::InputDeviceUnavailable, format!("evdev: open {}: {e}", config.device_path)))?;
        return Ok((config.device_path.clone(), device));
    }
    if !config.auto_detect_devices {
        return Err(CoreError::new(ErrorKind::InputDeviceUnavailable, "evdev: no device_path and auto_detect_devices disabled"));
    }
    for index in 0..32 {
        let path = format!("/dev/input/event{index}");
        if let Ok(device) = Device::open(&path) {
            if device.supported_absolute_axes().is_some_and(|axes| axes.contains(AbsoluteAxisType::ABS_MT_POSITION_X)) {
                return Ok((path, device));
            }
        }
    }
    Err(CoreError::new(ErrorKind::InputDeviceUnavailable, "evdev: no multitouch device found"))
}

fn reader_loop(
    mut device: Device,
    tx: SyncSender<NormalizedEvent>,
    stop_rx: Receiver<()>,
    (x_min, x_max, y_min, y_max): (i32, i32, i32, i32),
) {
    const TOUCH_ID: u32 = 0;
    let mut slots: Vec<SlotState> = vec![SlotState::default(); 16];
    let mut current_slot: usize = 0;

    loop {
        if stop_rx.try_recv().is_ok() {
            return;
        }
        let events = match device.fetch_events() {
            Ok(events) => events,
            Err(e) => {
                log::warn!("evdev: fetch_events failed, stopping reader: {e}");
                return;
            }
        };
        for event in events {
            match event.kind() {
                InputEventKind::AbsAxis(AbsoluteAxisType::ABS_MT_SLOT) => {
                    current_slot = (event.value() as usize).min(slots.len() - 1);
                }
                InputEventKind::AbsAxis(AbsoluteAxisType::ABS_MT_TRACKING_ID) => {
                    let slot = &mut slots[current_slot];
                    if event.value() < 0 {
                        if slot.active {
                            let (x_norm, y_norm) = normalize(slot.x, slot.y, x_min, x_max, y_min, y_max);
                            let _ = tx.try_send(NormalizedEvent::FingerUp {
                                touch_id: TOUCH_ID,
                                finger_id: slot.tracking_id as u32,
                                x_norm,
                                y_norm,
                            });
                        }
                        slot.active = false;
                        slot.pending_down = false;
                    } else {
                        slot.tracking_id = event.value();
                        slot.active = true;
                        slot.pending_down = true;
                    }
                }
                InputEventKind::AbsAxis(AbsoluteAxisType::ABS_MT_POSITION_X) => {
                    slots[current_slot].x = event.value();
                }
                InputEventKind::AbsAxis(AbsoluteAxisType::ABS_MT_POSITION_Y) => {
                    slots[current_slot].y = event.value();
                }
                InputEventKind::Synchronization(_) => {
                    for slot in &mut slots {
                        if !slot.active {
                            continue;
                        }
                        let (x_norm, y_norm) = normalize(slot.x, slot.y, x_min, x_max, y_min, y_max);
                        let finger_id = slot.tracking_id as u32;
                        let message = if slot.pending_down {
                            slot.pending_down = false;
                            NormalizedEvent::FingerDown { touch_id: TOUCH_ID, finger_id, x_norm, y_norm, pressure: 1.0 }
                        } else {
                            NormalizedEvent::FingerMotion { touch_id: TOUCH_ID, finger_id, x_norm, y_norm, pressure: 1.0 }
                        };
                        let _ = tx.try_send(message);
                    }
                }
                _ => {}
            }
        }
    }
}

fn normalize(x: i32, y: i32, x_min: i32, x_max: i32, y_min: i32, y_max: i32) -> (f32, f32) {
    let x_norm = if x_max > x_min { (x - x_min) as f32 / (x_max - x_min) as f32 } else { 0.0 };
    let y_norm = if y_max > y_min { (y - y_min) as f32 / (y_max - y_min) as f32 } else { 0.0 };
    (x_norm.clamp(0.0, 1.0), y_norm.clamp(0.0, 1.0))
}
