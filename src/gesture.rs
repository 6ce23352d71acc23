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
//! Classifies a raw pointer stream into click / vertical drag / horizontal swipe / hold.

use std::time::{Duration, Instant};

use crate::geometry::Point;

/// Configuration knobs driving the state machine's transitions, with the spec's defaults.
#[derive(Copy, Clone, Debug)]
pub struct GestureConfig {
    /// Movement, in pixels, past which `potential` commits to a drag direction.
    pub drag_threshold_px: i32,
    /// Time with no movement past which `potential` becomes `hold`.
    pub hold_timeout: Duration,
    /// Unused directly by the state machine itself (click resolution is movement-driven) but
    /// carried as a documented knob per the spec; collaborators may use it as an upper bound
    /// on how long a still pointer-down may be held before a click is disallowed outright.
    pub click_timeout: Duration,
    /// Fraction of page-manager width a horizontal drag must cross to commit a page change.
    pub swipe_commit_fraction: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 10,
            hold_timeout: Duration::from_millis(1000),
            click_timeout: Duration::from_millis(1000),
            swipe_commit_fraction: 0.30,
        }
    }
}

/// Which classification the pointer stream currently carries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No pointer down.
    Idle,
    /// Pointer down, not yet classified.
    Potential,
    /// Classified as a tap; delivered to `target_widget` then returns to `Idle`.
    Click,
    /// Classified as a vertical drag (scroll).
    DragVertical,
    /// Classified as a horizontal drag (page swipe).
    DragHorizontal,
    /// Classified as a hold (pointer down, stationary, past `hold_timeout`).
    Hold,
}

/// The gesture engine's full state, addressed by a single active pointer id at a time.
#[derive(Clone, Debug)]
pub struct GestureState {
    /// Current classification.
    pub phase: Phase,
    /// Point the pointer went down at.
    pub start_point: Point,
    /// Instant the pointer went down.
    pub start_time: Instant,
    /// Most recently observed pointer position.
    pub last_point: Point,
    /// Which pointer (finger id or synthetic mouse id) this state tracks.
    pub pointer_id: u32,
    /// Widget id hit-tested at pointer-down, if any.
    pub target_widget: Option<String>,
    /// Page index active when the gesture began, for drag/swipe routing.
    pub target_page: i32,
}

impl GestureState {
    fn idle_at(now: Instant) -> Self {
        Self { phase: Phase::Idle, start_point: Point::default(), start_time: now, last_point: Point::default(), pointer_id: 0, target_widget: None, target_page: 0 }
    }
}

/// Outcome the application loop acts on after feeding one pointer event to the engine.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureOutcome {
    /// Nothing externally visible happened this step (e.g. entering `potential`).
    None,
    /// A click should be dispatched to `target_widget`, provided the up-point the caller
    /// hit-tests against is still within its bounds — the engine itself has no access to the
    /// widget tree to check this, so it reports both and leaves the bounds check to the
    /// caller, per the click-discipline invariant (down on target ∧ up inside target bounds).
    Click { target_widget: Option<String>, point: Point },
    /// A vertical drag moved by `(dx, dy)` pixels since the last event.
    ScrollDelta { dx: i32, dy: i32 },
    /// A horizontal drag updated the page-manager offset, as a delta in pixels.
    SwipeDelta { dx_total: i32 },
    /// The horizontal drag ended; the caller resolves commit/snap-back via
    /// `swipe_commit_fraction` against the page-manager's own width.
    SwipeEnd { dx_total: i32 },
    /// The pointer has been held stationary past `hold_timeout`.
    HoldStarted,
    /// A hold ended via pointer-up.
    HoldEnded,
}

/// The pointer-stream state machine described in §4.5.
pub struct GestureEngine {
    config: GestureConfig,
    state: GestureState,
}

impl GestureEngine {
    /// Creates an idle engine with the given configuration.
    pub fn new(config: GestureConfig) -> Self { Self { config, state: GestureState::idle_at(Instant::now()) } }

    /// Current gesture state, for diagnostics/tests.
    pub fn state(&self) -> &GestureState { &self.state }

    /// Feeds a pointer-down at `point`, hit-tested to `target_widget` by the caller.
    pub fn pointer_down(&mut self, pointer_id: u32, point: Point, target_widget: Option<String>, target_page: i32, now: Instant) -> GestureOutcome {
        self.state = GestureState { phase: Phase::Potential, start_point: point, start_time: now, last_point: point, pointer_id, target_widget, target_page };
        GestureOutcome::None
    }

    /// Feeds pointer motion to `point`.
    pub fn pointer_motion(&mut self, pointer_id: u32, point: Point, now: Instant) -> GestureOutcome {
        if pointer_id != self.state.pointer_id || self.state.phase == Phase::Idle {
            return GestureOutcome::None;
        }
        match self.state.phase {
            Phase::Potential => self.classify_from_potential(point, now),
            Phase::DragVertical => {
                let dy = point.y - self.state.last_point.y;
                self.state.last_point = point;
                GestureOutcome::ScrollDelta { dx: 0, dy }
            }
            Phase::DragHorizontal => {
                self.state.last_point = point;
                GestureOutcome::SwipeDelta { dx_total: point.x - self.state.start_point.x }
            }
            _ => GestureOutcome::None,
        }
    }

    fn classify_from_potential(&mut self, point: Point, now: Instant) -> GestureOutcome {
        let dx = point.x - self.state.start_point.x;
        let dy = point.y - self.state.start_point.y;
        if dx.abs() > self.config.drag_threshold_px || dy.abs() > self.config.drag_threshold_px {
            self.state.phase = if dx.abs() > dy.abs() { Phase::DragHorizontal } else { Phase::DragVertical };
            self.state.last_point = point;
            return GestureOutcome::None;
        }
        if now.duration_since(self.state.start_time) > self.config.hold_timeout {
            self.state.phase = Phase::Hold;
            return GestureOutcome::HoldStarted;
        }
        GestureOutcome::None
    }

    /// Called once per frame (independent of pointer events) so a stationary `potential`
    /// pointer can still transition to `hold` after `hold_timeout` elapses.
    pub fn tick(&mut self, now: Instant) -> GestureOutcome {
        if self.state.phase == Phase::Potential && now.duration_since(self.state.start_time) > self.config.hold_timeout {
            self.state.phase = Phase::Hold;
            return GestureOutcome::HoldStarted;
        }
        GestureOutcome::None
    }

    /// Feeds a pointer-up at `point`.
    pub fn pointer_up(&mut self, pointer_id: u32, point: Point) -> GestureOutcome {
        if pointer_id != self.state.pointer_id {
            return GestureOutcome::None;
        }
        let outcome = match self.state.phase {
            Phase::Potential => GestureOutcome::Click { target_widget: self.state.target_widget.clone(), point },
            Phase::DragHorizontal => GestureOutcome::SwipeEnd { dx_total: point.x - self.state.start_point.x },
            Phase::Hold => GestureOutcome::HoldEnded,
            Phase::DragVertical | Phase::Click | Phase::Idle => GestureOutcome::None,
        };
        self.state = GestureState::idle_at(Instant::now());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;

    #[test]
    fn short_tap_yields_click() {
        let mut engine = GestureEngine::new(GestureConfig::default());
        let t0 = Instant::now();
        engine.pointer_down(1, point(200, 220), Some("change_color_btn".into()), 0, t0);
        let outcome = engine.pointer_up(1, point(200, 220));
        assert_eq!(outcome, GestureOutcome::Click { target_widget: Some("change_color_btn".into()), point: point(200, 220) });
        assert_eq!(engine.state().phase, Phase::Idle);
    }

    #[test]
    fn horizontal_drag_past_threshold_classifies_and_reports_swipe_delta() {
        let mut engine = GestureEngine::new(GestureConfig::default());
        let t0 = Instant::now();
        engine.pointer_down(1, point(400, 300), None, 0, t0);
        engine.pointer_motion(1, point(260, 305), t0);
        assert_eq!(engine.state().phase, Phase::DragHorizontal);
        let outcome = engine.pointer_up(1, point(260, 305));
        assert_eq!(outcome, GestureOutcome::SwipeEnd { dx_total: -140 });
    }

    #[test]
    fn commit_threshold_s3_scenario() {
        let mut engine = GestureEngine::new(GestureConfig::default());
        let t0 = Instant::now();
        engine.pointer_down(1, point(400, 300), None, 0, t0);
        engine.pointer_motion(1, point(240, 305), t0);
        let outcome = engine.pointer_up(1, point(240, 305));
        assert_eq!(outcome, GestureOutcome::SwipeEnd { dx_total: -160 });
        // ratio = 160/480 ~= 0.333 >= 0.30, caller commits; verified at the page-manager layer.
    }

    #[test]
    fn vertical_drag_reports_scroll_delta() {
        let mut engine = GestureEngine::new(GestureConfig::default());
        let t0 = Instant::now();
        engine.pointer_down(1, point(100, 100), None, 0, t0);
        let outcome = engine.pointer_motion(1, point(102, 150), t0);
        assert_eq!(outcome, GestureOutcome::ScrollDelta { dx: 0, dy: 50 });
    }

    #[test]
    fn stationary_hold_past_timeout_fires_on_tick() {
        let mut engine = GestureEngine::new(GestureConfig { hold_timeout: Duration::from_millis(0), ..GestureConfig::default() });
        let t0 = Instant::now();
        engine.pointer_down(1, point(50, 50), Some("data_row".into()), 0, t0);
        let outcome = engine.tick(t0 + Duration::from_millis(1));
        assert_eq!(outcome, GestureOutcome::HoldStarted);
        let outcome = engine.pointer_up(1, point(50, 50));
        assert_eq!(outcome, GestureOutcome::HoldEnded);
    }

    #[test]
    fn wrong_pointer_id_is_ignored() {
        let mut engine = GestureEngine::new(GestureConfig::default());
        let t0 = Instant::now();
        engine.pointer_down(1, point(0, 0), None, 0, t0);
        let outcome = engine.pointer_motion(2, point(50, 50), t0);
        assert_eq!(outcome, GestureOutcome::None);
        assert_eq!(engine.state().phase, Phase::Potential);
    }
}
