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
//! Horizontal pager: drag/swipe with elastic edges, a commit-or-snap-back animation, and a
//! fading page indicator capsule. See §4.7; the animation rate is time-based
//! (`~7.2` offset units/second) rather than the source's fixed 0.12-per-frame step, per the
//! REDESIGN FLAGS note about frame-rate independence.

use std::time::{Duration, Instant};

use crate::geometry::{Color, Rect};

/// Fraction a drag offset is multiplied by when dragging past the first or last page, per the
/// elastic-edge behavior.
const ELASTIC_FACTOR: f32 = 0.30;
/// Offset units per second the animation steps at; equivalent to the source's
/// `0.12`-per-frame rate at an assumed 60 Hz (`0.12 * 60 = 7.2`).
const ANIMATION_RATE_PER_SEC: f32 = 7.2;
/// How long after the last interaction the indicator capsule stays fully visible before
/// starting to fade.
const INDICATOR_GRACE: Duration = Duration::from_secs(2);
/// How long the indicator capsule takes to fade from full to zero alpha once the grace period
/// elapses.
const INDICATOR_FADE: Duration = Duration::from_millis(400);

/// Which interaction mode the page manager is currently in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransitionMode {
    /// At rest: `offset == 0`, no outstanding animation.
    Idle,
    /// A horizontal drag is actively updating `offset`.
    Dragging,
    /// `offset` is animating toward a commit (`±1`) or a snap-back (`0`).
    Animating,
}

/// Horizontal pager state: current/target page, transition mode, and the `[-1, 1]` offset
/// (in units of manager width) the drag/animation currently holds.
#[derive(Clone)]
pub struct PageManagerWidget {
    current_page: i32,
    target_page: i32,
    mode: TransitionMode,
    offset: f32,
    target_offset: f32,
    last_interaction: Option<Instant>,
}

impl PageManagerWidget {
    /// Builds a page manager at rest on page 0.
    pub fn new() -> Self {
        Self { current_page: 0, target_page: 0, mode: TransitionMode::Idle, offset: 0.0, target_offset: 0.0, last_interaction: None }
    }

    /// The page currently at rest (or, mid-transition, the page being transitioned away from).
    pub fn current_page(&self) -> i32 { self.current_page }
    /// Current transition mode.
    pub fn mode(&self) -> TransitionMode { self.mode }
    /// Current drag/animation offset, in `[-1, 1]` units of manager width.
    pub fn offset(&self) -> f32 { self.offset }

    /// Feeds a horizontal drag update. `dx_total` is the pointer's total horizontal
    /// displacement since the gesture began; `width` and `page_count` describe the manager's
    /// current geometry. Applies the elastic-edge resist when dragging past the first/last
    /// page.
    pub fn drag(&mut self, dx_total: i32, width: i32, page_count: i32) {
        if width <= 0 {
            return;
        }
        let mut raw = dx_total as f32 / width as f32;
        let at_first_edge = self.current_page <= 0 && raw > 0.0;
        let at_last_edge = self.current_page >= page_count - 1 && raw < 0.0;
        if at_first_edge || at_last_edge {
            raw *= ELASTIC_FACTOR;
        }
        self.mode = TransitionMode::Dragging;
        self.offset = raw.clamp(-1.0, 1.0);
        self.last_interaction = Some(Instant::now());
    }

    /// Resolves a drag end into either a page commit or a snap-back, per the commit-threshold
    /// rule: `|dx_total| / width >= swipe_commit_fraction` commits to the neighbor in the drag
    /// direction, provided that neighbor exists; otherwise the manager snaps back. The ratio
    /// used for this decision is the raw (pre-elastic) displacement fraction, matching the
    /// literal scenario arithmetic in §8.
    pub fn end_drag(&mut self, dx_total: i32, width: i32, page_count: i32, commit_fraction: f32) {
        self.last_interaction = Some(Instant::now());
        if width <= 0 {
            self.snap_back();
            return;
        }
        let ratio = dx_total as f32 / width as f32;
        let neighbor = if ratio < 0.0 { self.current_page + 1 } else if ratio > 0.0 { self.current_page - 1 } else { self.current_page };
        let neighbor_valid = neighbor >= 0 && neighbor < page_count && neighbor != self.current_page;
        if neighbor_valid && ratio.abs() >= commit_fraction {
            self.target_page = neighbor;
            self.target_offset = if ratio < 0.0 { -1.0 } else { 1.0 };
            self.mode = TransitionMode::Animating;
        } else {
            self.snap_back();
        }
    }

    fn snap_back(&mut self) {
        self.target_page = self.current_page;
        self.target_offset = 0.0;
        self.mode = TransitionMode::Animating;
    }

    /// Advances the animation by `dt`. Returns `Some((from, to))` the instant the transition
    /// completes and `current_page` changes; returns `None` on every other call, including the
    /// frame a snap-back completes (since no page actually changed).
    pub fn step(&mut self, dt: Duration) -> Option<(i32, i32)> {
        if self.mode != TransitionMode::Animating {
            return None;
        }
        let delta = ANIMATION_RATE_PER_SEC * dt.as_secs_f32();
        if self.offset < self.target_offset {
            self.offset = (self.offset + delta).min(self.target_offset);
        } else {
            self.offset = (self.offset - delta).max(self.target_offset);
        }
        if (self.offset - self.target_offset).abs() > f32::EPSILON {
            return None;
        }
        self.mode = TransitionMode::Idle;
        self.offset = 0.0;
        if self.target_page != self.current_page {
            let from = self.current_page;
            self.current_page = self.target_page;
            Some((from, self.current_page))
        } else {
            None
        }
    }

    /// Computes each child page's `relative_bounds` from `current_page`/`offset` and writes
    /// them, then recomputes the whole visible subtree's absolute bounds via the ordinary
    /// layout rule. This is how a swipe translates the manager's entire visible subtree, per
    /// the position-update behavior in §4.7.
    pub fn position_children(&self, children: &[super::tree::WidgetHandle], manager_bounds: Rect) {
        for (index, child) in children.iter().enumerate() {
            let slot = (index as i32 - self.current_page) as f32 + self.offset;
            let x = (slot * manager_bounds.w as f32).round() as i32;
            child.with_mut(|node| {
                node.relative_bounds = Rect::new(x, 0, manager_bounds.w, manager_bounds.h);
            });
            super::tree::layout(child, manager_bounds.origin());
        }
    }

    /// Jumps directly to `page` with no drag or animation: a programmatic navigation
    /// shortcut for buttons that target a fixed page, distinct from the swipe-driven
    /// commit/snap-back path. Returns `Some((from, to))` if the page actually changed, `None`
    /// if `page` is out of range or already current.
    pub fn jump_to(&mut self, page: i32, page_count: i32) -> Option<(i32, i32)> {
        if page < 0 || page >= page_count || page == self.current_page {
            return None;
        }
        let from = self.current_page;
        self.current_page = page;
        self.target_page = page;
        self.mode = TransitionMode::Idle;
        self.offset = 0.0;
        self.target_offset = 0.0;
        self.last_interaction = Some(Instant::now());
        Some((from, page))
    }

    /// Alpha the indicator capsule should currently render at: full for `INDICATOR_GRACE`
    /// after the last interaction, linearly fading to zero over the following
    /// `INDICATOR_FADE`, zero forever after (until the next interaction resets the timer).
    /// Before any interaction has ever occurred, the indicator is fully visible.
    pub fn indicator_alpha(&self) -> u8 {
        let Some(last) = self.last_interaction else { return 255 };
        let elapsed = last.elapsed();
        if elapsed <= INDICATOR_GRACE {
            return 255;
        }
        let into_fade = elapsed - INDICATOR_GRACE;
        if into_fade >= INDICATOR_FADE {
            return 0;
        }
        let remaining = 1.0 - (into_fade.as_secs_f32() / INDICATOR_FADE.as_secs_f32());
        (remaining * 255.0).round() as u8
    }

    /// Paints the indicator capsule: one dot per page, centered near the bottom of `bounds`,
    /// the current page highlighted, faded per [`Self::indicator_alpha`]. `page_count` is
    /// threaded in by the widget manager, which knows the child count; zero or one page draws
    /// nothing (there is nothing to indicate).
    pub fn render_indicators_for(&self, bounds: Rect, page_count: i32, surface: &mut crate::display::Surface) {
        if page_count <= 1 {
            return;
        }
        let alpha = self.indicator_alpha();
        if alpha == 0 {
            return;
        }
        const DOT: i32 = 8;
        const GAP: i32 = 6;
        let total_w = page_count * DOT + (page_count - 1) * GAP;
        let capsule = Rect::new(bounds.x + (bounds.w - total_w) / 2 - GAP, bounds.y + bounds.h - DOT - 16, total_w + GAP * 2, DOT + GAP);
        surface.fill_rect(capsule.x, capsule.y, capsule.w, capsule.h, Color::new(0, 0, 0, (alpha as u32 * 100 / 255) as u8));
        for i in 0..page_count {
            let x = capsule.x + GAP + i * (DOT + GAP);
            let y = capsule.y + GAP / 2;
            let color = if i == self.current_page {
                Color::new(255, 255, 255, alpha)
            } else {
                Color::new(255, 255, 255, (alpha as u32 * 90 / 255) as u8)
            };
            surface.fill_rect(x, y, DOT, DOT, color);
        }
    }

}

impl Default for PageManagerWidget {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_rest_offset_is_zero_and_mode_idle() {
        let pm = PageManagerWidget::new();
        assert_eq!(pm.offset(), 0.0);
        assert_eq!(pm.mode(), TransitionMode::Idle);
        assert_eq!(pm.current_page(), 0);
    }

    #[test]
    fn swipe_below_threshold_snaps_back() {
        let mut pm = PageManagerWidget::new();
        pm.drag(-140, 480, 2);
        pm.end_drag(-140, 480, 2, 0.30);
        assert_eq!(pm.mode(), TransitionMode::Animating);
        // Drive the animation to completion; it must never report a page change.
        let mut changed = None;
        for _ in 0..200 {
            if let Some(t) = pm.step(Duration::from_millis(16)) {
                changed = Some(t);
            }
        }
        assert_eq!(changed, None);
        assert_eq!(pm.current_page(), 0);
        assert_eq!(pm.mode(), TransitionMode::Idle);
    }

    #[test]
    fn swipe_at_or_above_threshold_commits() {
        let mut pm = PageManagerWidget::new();
        pm.drag(-160, 480, 2);
        pm.end_drag(-160, 480, 2, 0.30);
        assert_eq!(pm.mode(), TransitionMode::Animating);
        let mut changed = None;
        for _ in 0..200 {
            if let Some(t) = pm.step(Duration::from_millis(16)) {
                changed = Some(t);
            }
        }
        assert_eq!(changed, Some((0, 1)));
        assert_eq!(pm.current_page(), 1);
    }

    #[test]
    fn exactly_threshold_commits() {
        let mut pm = PageManagerWidget::new();
        // -144 / 480 == exactly -0.30.
        pm.end_drag(-144, 480, 2, 0.30);
        assert_eq!(pm.mode(), TransitionMode::Animating);
        assert_eq!(pm.target_offset, -1.0);
    }

    #[test]
    fn dragging_past_last_page_is_elastic() {
        let mut pm = PageManagerWidget::new();
        pm.current_page = 1;
        pm.drag(-200, 480, 2);
        assert!((pm.offset() - (-200.0 / 480.0 * ELASTIC_FACTOR)).abs() < 1e-6);
    }

    #[test]
    fn swipe_past_last_page_has_no_valid_neighbor_and_snaps_back() {
        let mut pm = PageManagerWidget::new();
        pm.current_page = 1;
        pm.end_drag(-300, 480, 2, 0.30);
        assert_eq!(pm.target_page, 1);
    }

    #[test]
    fn indicator_fades_after_grace_period() {
        let mut pm = PageManagerWidget::new();
        pm.last_interaction = Some(Instant::now() - INDICATOR_GRACE - INDICATOR_FADE / 2);
        let alpha = pm.indicator_alpha();
        assert!(alpha > 0 && alpha < 255);
    }

    #[test]
    fn indicator_fully_transparent_well_after_fade() {
        let mut pm = PageManagerWidget::new();
        pm.last_interaction = Some(Instant::now() - INDICATOR_GRACE - INDICATOR_FADE - Duration::from_secs(1));
        assert_eq!(pm.indicator_alpha(), 0);
    }

    #[test]
    fn position_children_places_current_page_at_origin() {
        use crate::widget::container::ContainerWidget;
        use crate::widget::tree::{WidgetHandle, WidgetNode};
        use crate::widget::WidgetKind;

        let pm = PageManagerWidget::new();
        let page0 = WidgetHandle::new(WidgetNode::new("page0", WidgetKind::Container(ContainerWidget::default()), Rect::default()));
        let page1 = WidgetHandle::new(WidgetNode::new("page1", WidgetKind::Container(ContainerWidget::default()), Rect::default()));
        let children = vec![page0.clone(), page1.clone()];
        pm.position_children(&children, Rect::new(0, 0, 480, 640));
        assert_eq!(page0.with(|n| n.bounds), Rect::new(0, 0, 480, 640));
        assert_eq!(page1.with(|n| n.bounds), Rect::new(480, 0, 480, 640));
    }
}
