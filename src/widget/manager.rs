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
//! Bridges [`crate::gesture::GestureOutcome`] to the widget tree: hit-testing, hover/pressed
//! flag bookkeeping, click dispatch, and driving the page managers that live in the tree.

use std::collections::HashMap;
use std::time::Duration;

use crate::event_bus::EventBus;
use crate::events::{self, ButtonPressedEvent, PageTransitionEvent};
use crate::widget::tree::{self, WidgetFlags, WidgetHandle};
use crate::widget::WidgetKind;

/// Tracks per-pointer pressed targets and the single current hover target, and owns the
/// click-dispatch and page-manager-driving logic that acts on the widget tree.
#[derive(Default)]
pub struct WidgetManager {
    pressed: HashMap<u32, WidgetHandle>,
    hovered: Option<WidgetHandle>,
}

impl WidgetManager {
    /// Builds a manager with no pressed pointers and no hover target.
    pub fn new() -> Self { Self { pressed: HashMap::new(), hovered: None } }

    /// Hit-tests `(x, y)` under `root`, marks the result (if any) `PRESSED` and `HOVERED`, and
    /// remembers it against `pointer_id` so a later [`Self::pointer_up`] can find it again
    /// even if the pointer has since moved off it. Returns the hit widget's id, which the
    /// caller feeds to the gesture engine as `target_widget`.
    pub fn pointer_down(&mut self, root: &WidgetHandle, pointer_id: u32, x: i32, y: i32) -> Option<String> {
        let hit = tree::hit_test(root, x, y)?;
        hit.with_mut(|n| n.state_flags.insert(WidgetFlags::HOVERED | WidgetFlags::PRESSED));
        let id = hit.id();
        self.pressed.insert(pointer_id, hit);
        Some(id)
    }

    /// Updates the hover target for ordinary (non-drag, no button held) pointer motion,
    /// clearing `HOVERED` on the previous target and setting it on the new one.
    pub fn pointer_motion_hover(&mut self, root: &WidgetHandle, x: i32, y: i32) {
        let hit = tree::hit_test(root, x, y);
        if let Some(prev) = &self.hovered {
            if !hit.as_ref().is_some_and(|h| h.same_node(prev)) {
                prev.with_mut(|n| n.state_flags.remove(WidgetFlags::HOVERED));
            }
        }
        if let Some(h) = &hit {
            h.with_mut(|n| n.state_flags.insert(WidgetFlags::HOVERED));
        }
        self.hovered = hit;
    }

    /// Clears `PRESSED` (and, unless still hovered, `HOVERED`) on the pointer's remembered
    /// target and forgets it. Called once a gesture resolves to anything other than a click
    /// (click dispatch itself is handled by [`Self::dispatch_click`], which clears pressed
    /// only after the click has fired, per the load-bearing click-dispatch-before-pressed-
    /// clear ordering).
    pub fn pointer_up(&mut self, pointer_id: u32, x: i32, y: i32) {
        if let Some(target) = self.pressed.remove(&pointer_id) {
            target.with_mut(|n| {
                n.state_flags.remove(WidgetFlags::PRESSED);
                if !n.bounds.contains(crate::geometry::Point::new(x, y)) {
                    n.state_flags.remove(WidgetFlags::HOVERED);
                }
            });
        }
    }

    /// Dispatches a click to `widget_id`: delivered if and only if the widget is still marked
    /// `PRESSED` and `point` (the up-point) still lies within its bounds — the click-discipline
    /// invariant in §4.6. While delivered, invokes the widget's own configured click event (if
    /// a button) and publishes the generic `ui.button_pressed` event; either way, clears
    /// `PRESSED`/forgets the pointer afterwards. The ordering (check, then dispatch, then
    /// clear) matters because a handler reacting to the button's own event may itself inspect
    /// the button's current flags.
    pub fn dispatch_click(&mut self, root: &WidgetHandle, bus: &EventBus, pointer_id: u32, widget_id: &str, point: crate::geometry::Point) {
        let Some(node) = tree::find_by_id(root, widget_id) else {
            self.pressed.remove(&pointer_id);
            return;
        };
        let (is_disabled, page, button_index, label, still_pressed, in_bounds) = node.with(|n| {
            let disabled = n.state_flags.contains(WidgetFlags::DISABLED);
            let still_pressed = n.state_flags.contains(WidgetFlags::PRESSED);
            let in_bounds = n.bounds.contains(point);
            let (page, button_index, label) = match &n.kind {
                WidgetKind::Button(button) => {
                    let label = n.children.first().map(|c| c.with(|child| match &child.kind {
                        WidgetKind::Text(text) => text.text().to_string(),
                        _ => String::new(),
                    })).unwrap_or_default();
                    (button.page(), button.index(), label)
                }
                _ => (-1, -1, String::new()),
            };
            (disabled, page, button_index, label, still_pressed, in_bounds)
        });
        if !is_disabled && still_pressed && in_bounds {
            node.with(|n| {
                if let WidgetKind::Button(button) = &n.kind {
                    button.dispatch_click(bus, widget_id);
                }
            });
            let payload: std::sync::Arc<ButtonPressedEvent> = std::sync::Arc::new(ButtonPressedEvent {
                button_index,
                page,
                timestamp_ms: events::now_ms(),
                button_text: label,
            });
            bus.publish("ui.button_pressed", payload);
        }
        node.with_mut(|n| n.state_flags.remove(WidgetFlags::PRESSED));
        self.pressed.remove(&pointer_id);
    }

    /// Feeds a horizontal drag delta to the page manager identified by `widget_id`.
    pub fn drag_page_manager(&self, root: &WidgetHandle, widget_id: &str, dx_total: i32) {
        let Some(node) = tree::find_by_id(root, widget_id) else { return };
        let (width, page_count) = node.with(|n| (n.bounds.w, n.children.len() as i32));
        node.with_mut(|n| {
            if let WidgetKind::PageManager(pm) = &mut n.kind {
                pm.drag(dx_total, width, page_count);
            }
        });
        self.reposition(&node);
    }

    /// Resolves a drag end on the page manager identified by `widget_id` into a commit or
    /// snap-back animation.
    pub fn end_drag_page_manager(&self, root: &WidgetHandle, widget_id: &str, dx_total: i32, commit_fraction: f32) {
        let Some(node) = tree::find_by_id(root, widget_id) else { return };
        let (width, page_count) = node.with(|n| (n.bounds.w, n.children.len() as i32));
        node.with_mut(|n| {
            if let WidgetKind::PageManager(pm) = &mut n.kind {
                pm.end_drag(dx_total, width, page_count, commit_fraction);
            }
        });
    }

    /// Steps every page manager in the tree by `dt`, repositions its children, and publishes
    /// `system.page_transition` for each transition that completes this frame. This is the
    /// sole driver of page-manager animation; it is not also stepped from the generic per-node
    /// update walk, since that walk lacks the bus and sibling-bounds context this needs.
    pub fn update_page_managers(&self, node: &WidgetHandle, bus: &EventBus, dt: Duration) {
        let (kind_is_pm, children) = node.with(|n| (matches!(n.kind, WidgetKind::PageManager(_)), n.children.clone()));
        if kind_is_pm {
            let transition = node.with_mut(|n| match &mut n.kind {
                WidgetKind::PageManager(pm) => pm.step(dt),
                _ => None,
            });
            self.reposition(node);
            if let Some((from, to)) = transition {
                let payload: std::sync::Arc<PageTransitionEvent> =
                    std::sync::Arc::new(PageTransitionEvent { from_page: from, to_page: to, timestamp_ms: events::now_ms() });
                bus.publish("system.page_transition", payload);
            }
        }
        for child in &children {
            self.update_page_managers(child, bus, dt);
        }
    }

    /// Jumps the page manager identified by `widget_id` straight to `page`, with no drag or
    /// animation, and publishes `system.page_transition` if the page actually changed. Used
    /// by buttons that navigate to a fixed page rather than responding to a swipe.
    pub fn jump_page_manager(&self, root: &WidgetHandle, bus: &EventBus, widget_id: &str, page: i32) {
        let Some(node) = tree::find_by_id(root, widget_id) else { return };
        let page_count = node.with(|n| n.children.len() as i32);
        let transition = node.with_mut(|n| match &mut n.kind {
            WidgetKind::PageManager(pm) => pm.jump_to(page, page_count),
            _ => None,
        });
        self.reposition(&node);
        if let Some((from, to)) = transition {
            let payload: std::sync::Arc<PageTransitionEvent> =
                std::sync::Arc::new(PageTransitionEvent { from_page: from, to_page: to, timestamp_ms: events::now_ms() });
            bus.publish("system.page_transition", payload);
        }
    }

    fn reposition(&self, node: &WidgetHandle) {
        let (bounds, children) = node.with(|n| (n.bounds, n.children.clone()));
        node.with(|n| {
            if let WidgetKind::PageManager(pm) = &n.kind {
                pm.position_children(&children, bounds);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::widget::button::ButtonWidget;
    use crate::widget::container::ContainerWidget;
    use crate::widget::page_manager::PageManagerWidget;
    use crate::widget::text::TextWidget;
    use crate::widget::tree::{layout_root, WidgetNode};

    fn button_tree() -> WidgetHandle {
        let root = WidgetHandle::new(WidgetNode::new("root", WidgetKind::Container(ContainerWidget::default()), Rect::new(0, 0, 480, 640)));
        let button = WidgetHandle::new(WidgetNode::new(
            "btn",
            WidgetKind::Button(ButtonWidget::new().with_click_event("demo.clicked").with_page(0).with_index(7)),
            Rect::new(10, 10, 100, 40),
        ));
        let label = WidgetHandle::new(WidgetNode::new("btn_label", WidgetKind::Text(TextWidget::new("Go", 0, 16, crate::geometry::Color::BLACK)), Rect::new(0, 0, 100, 40)));
        button.with_mut(|n| n.children.push(label));
        root.with_mut(|n| n.children.push(button));
        layout_root(&root, Rect::new(0, 0, 480, 640));
        root
    }

    #[test]
    fn click_dispatches_before_clearing_pressed_and_publishes_generic_event() {
        let root = button_tree();
        let bus = EventBus::new();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(None));
        {
            let seen = seen.clone();
            bus.subscribe(
                "ui.button_pressed",
                Box::new(move |payload| {
                    if let Some(event) = payload.downcast_ref::<ButtonPressedEvent>() {
                        *seen.lock().unwrap() = Some(event.clone());
                    }
                }),
            )
            .unwrap();
        }
        let mut manager = WidgetManager::new();
        let id = manager.pointer_down(&root, 1, 20, 20).unwrap();
        assert_eq!(id, "btn");
        manager.dispatch_click(&root, &bus, 1, &id, crate::geometry::Point::new(20, 20));
        let event = seen.lock().unwrap().clone().unwrap();
        assert_eq!(event.button_index, 7);
        assert_eq!(event.page, 0);
        assert_eq!(event.button_text, "Go");
        let btn = tree::find_by_id(&root, "btn").unwrap();
        assert!(!btn.with(|n| n.state_flags.contains(WidgetFlags::PRESSED)));
    }

    #[test]
    fn disabled_button_click_is_noop() {
        let root = button_tree();
        let btn = tree::find_by_id(&root, "btn").unwrap();
        btn.with_mut(|n| n.state_flags.insert(WidgetFlags::DISABLED));
        let bus = EventBus::new();
        let hits = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        {
            let hits = hits.clone();
            bus.subscribe("ui.button_pressed", Box::new(move |_| { hits.fetch_add(1, std::sync::atomic::Ordering::SeqCst); })).unwrap();
        }
        let mut manager = WidgetManager::new();
        manager.pointer_down(&root, 1, 20, 20);
        manager.dispatch_click(&root, &bus, 1, "btn", crate::geometry::Point::new(20, 20));
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn up_point_outside_bounds_cancels_the_click() {
        // Invariant 5: a click fires iff (down on target) ∧ (up inside target bounds). Down
        // at (20, 20) targets "btn" (bounds 10,10..110,50); deliver the up at (400, 400),
        // well outside it.
        let root = button_tree();
        let bus = EventBus::new();
        let hits = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        {
            let hits = hits.clone();
            bus.subscribe("ui.button_pressed", Box::new(move |_| { hits.fetch_add(1, std::sync::atomic::Ordering::SeqCst); })).unwrap();
        }
        let mut manager = WidgetManager::new();
        let id = manager.pointer_down(&root, 1, 20, 20).unwrap();
        manager.dispatch_click(&root, &bus, 1, &id, crate::geometry::Point::new(400, 400));
        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 0);
        let btn = tree::find_by_id(&root, "btn").unwrap();
        assert!(!btn.with(|n| n.state_flags.contains(WidgetFlags::PRESSED)));
    }

    #[test]
    fn page_manager_commit_publishes_transition() {
        let root = WidgetHandle::new(WidgetNode::new("root", WidgetKind::Container(ContainerWidget::default()), Rect::new(0, 0, 480, 640)));
        let pager = WidgetHandle::new(WidgetNode::new("pager", WidgetKind::PageManager(PageManagerWidget::new()), Rect::new(0, 0, 480, 640)));
        let page0 = WidgetHandle::new(WidgetNode::new("page0", WidgetKind::Container(ContainerWidget::default()), Rect::default()));
        let page1 = WidgetHandle::new(WidgetNode::new("page1", WidgetKind::Container(ContainerWidget::default()), Rect::default()));
        pager.with_mut(|n| n.children.extend([page0, page1]));
        root.with_mut(|n| n.children.push(pager));
        layout_root(&root, Rect::new(0, 0, 480, 640));

        let manager = WidgetManager::new();
        let bus = EventBus::new();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(None));
        {
            let seen = seen.clone();
            bus.subscribe(
                "system.page_transition",
                Box::new(move |payload| {
                    if let Some(event) = payload.downcast_ref::<PageTransitionEvent>() {
                        *seen.lock().unwrap() = Some(event.clone());
                    }
                }),
            )
            .unwrap();
        }
        manager.end_drag_page_manager(&root, "pager", -160, 0.30);
        for _ in 0..200 {
            manager.update_page_managers(&root, &bus, Duration::from_millis(16));
        }
        let event = seen.lock().unwrap().clone().unwrap();
        assert_eq!(event.from_page, 0);
        assert_eq!(event.to_page, 1);
        let page1 = tree::find_by_id(&root, "page1").unwrap();
        assert_eq!(page1.with(|n| n.bounds), Rect::new(0, 0, 480, 640));
    }
}
