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
//! Deterministic scripted input source, for tests: queue up events by hand or via the
//! `tap`/`swipe` helpers, then let the application loop drain them exactly like any other
//! source.

use std::collections::VecDeque;

use crate::input::{Capabilities, NormalizedEvent};

/// Scripted source backed by a plain queue the test pushes events onto.
#[derive(Default)]
pub struct MockSource {
    queue: VecDeque<NormalizedEvent>,
}

impl MockSource {
    /// Creates a source with an empty queue.
    pub fn new() -> Self { Self::default() }

    /// Appends a single event to the end of the queue.
    pub fn push(&mut self, event: NormalizedEvent) { self.queue.push_back(event); }

    /// Queues a finger-down immediately followed by a finger-up at the same point, the
    /// shortest possible interaction classified as a click by the gesture engine.
    pub fn tap(&mut self, touch_id: u32, finger_id: u32, x_norm: f32, y_norm: f32) {
        self.push(NormalizedEvent::FingerDown { touch_id, finger_id, x_norm, y_norm, pressure: 1.0 });
        self.push(NormalizedEvent::FingerUp { touch_id, finger_id, x_norm, y_norm });
    }

    /// Queues a finger-down, one motion to `(to_x, to_y)`, then a finger-up there — a single
    /// straight-line drag/swipe gesture.
    pub fn swipe(&mut self, touch_id: u32, finger_id: u32, from_x: f32, from_y: f32, to_x: f32, to_y: f32) {
        self.push(NormalizedEvent::FingerDown { touch_id, finger_id, x_norm: from_x, y_norm: from_y, pressure: 1.0 });
        self.push(NormalizedEvent::FingerMotion { touch_id, finger_id, x_norm: to_x, y_norm: to_y, pressure: 1.0 });
        self.push(NormalizedEvent::FingerUp { touch_id, finger_id, x_norm: to_x, y_norm: to_y });
    }

    /// Reports touch-capable, single-point capabilities by default; tests needing otherwise
    /// can construct `Capabilities` directly and drive the gesture engine without a source.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            has_touch: true,
            max_touch_points: 1,
            touch_x_min: 0,
            touch_x_max: 1,
            touch_y_min: 0,
            touch_y_max: 1,
            has_mouse: false,
            has_keyboard: false,
        }
    }

    /// Drains every queued event.
    pub fn drain(&mut self) -> Vec<NormalizedEvent> { self.queue.drain(..).collect() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tap_produces_down_then_up_at_same_point() {
        let mut source = MockSource::new();
        source.tap(0, 1, 0.5, 0.5);
        let events = source.drain();
        assert_eq!(
            events,
            vec![
                NormalizedEvent::FingerDown { touch_id: 0, finger_id: 1, x_norm: 0.5, y_norm: 0.5, pressure: 1.0 },
                NormalizedEvent::FingerUp { touch_id: 0, finger_id: 1, x_norm: 0.5, y_norm: 0.5 },
            ]
        );
        assert!(source.drain().is_empty());
    }
}
