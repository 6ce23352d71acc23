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
//! `WidgetNode`, the ownership tree built from it, and hit-test/layout/render over that tree.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crate::display::Surface;
use crate::error::CoreResult;
use crate::event_bus::{EventBus, SubscriptionToken};
use crate::geometry::{Color, Rect};
use crate::widget::{TextMeasurer, WidgetKind};

bitflags::bitflags! {
    /// Set membership over a widget's interaction/visibility state.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct WidgetFlags: u32 {
        /// No flags set; the default resting state.
        const NORMAL = 0;
        /// Pointer is over the widget.
        const HOVERED = 1 << 0;
        /// Widget holds the press for some pointer id.
        const PRESSED = 1 << 1;
        /// Widget holds keyboard focus.
        const FOCUSED = 1 << 2;
        /// Widget does not receive pointer/update/render.
        const DISABLED = 1 << 3;
        /// Widget and its children are skipped by hit-test, dispatch, and render.
        const HIDDEN = 1 << 4;
        /// Widget's layout is stale and must be recomputed on the next pass.
        const DIRTY = 1 << 5;
    }
}

/// A node in the widget ownership tree. Every widget kind embeds one of these for its shared
/// fields; the kind-specific payload lives in [`WidgetKind`].
pub struct WidgetNode {
    /// Short stable string, unique among siblings.
    pub id: String,
    /// Per-kind payload.
    pub kind: WidgetKind,
    /// Offset and size relative to the parent's origin. Authoritative for children.
    pub relative_bounds: Rect,
    /// Absolute bounds in surface coordinates. Derived, not authoritative.
    pub bounds: Rect,
    /// Interaction/visibility state.
    pub state_flags: WidgetFlags,
    /// Fill color painted before children.
    pub background: Color,
    /// Color used by text-bearing kinds.
    pub foreground: Color,
    /// Border stroke color.
    pub border: Color,
    /// Border stroke width in pixels; `0` draws no border.
    pub border_width: i32,
    /// Uniform inner padding, consulted by kinds that lay out their own children.
    pub padding: i32,
    /// Ordered children; this node exclusively owns them.
    pub children: Vec<WidgetHandle>,
    /// Event-bus subscriptions this widget owns; released on destroy.
    pub subscribed_events: Vec<(String, SubscriptionToken)>,
}

impl WidgetNode {
    /// Builds a node with the given id/kind/relative bounds and otherwise-default styling.
    pub fn new(id: impl Into<String>, kind: WidgetKind, relative_bounds: Rect) -> Self {
        Self {
            id: id.into(),
            kind,
            relative_bounds,
            bounds: relative_bounds,
            state_flags: WidgetFlags::DIRTY,
            background: Color::TRANSPARENT,
            foreground: Color::BLACK,
            border: Color::TRANSPARENT,
            border_width: 0,
            padding: 0,
            children: Vec::new(),
            subscribed_events: Vec::new(),
        }
    }

    fn is_visible(&self) -> bool { !self.state_flags.contains(WidgetFlags::HIDDEN) }
    fn is_enabled(&self) -> bool { !self.state_flags.contains(WidgetFlags::DISABLED) }

    /// A widget is interactive (participates in the hit-test tie-break rule) if it is a
    /// button or a page-manager; containers, text, time, and data-display are passive.
    fn is_interactive(&self) -> bool { matches!(self.kind, WidgetKind::Button(_) | WidgetKind::PageManager(_)) }

    /// Releases every subscription this node owns. Must be called before the node is dropped
    /// (removal from a parent precedes destruction, per the widget lifecycle invariant).
    pub fn release_subscriptions(&mut self, bus: &EventBus) {
        for (name, token) in self.subscribed_events.drain(..) {
            let _ = bus.unsubscribe(&name, token);
        }
        for child in &self.children {
            child.with_mut(|node| node.release_subscriptions(bus));
        }
    }
}

/// Shared, interior-mutable handle to a [`WidgetNode`], matching the teacher's
/// `Rc<RefCell<...>>` container-handle idiom generalized to the retained widget tree.
#[derive(Clone)]
pub struct WidgetHandle(Rc<RefCell<WidgetNode>>);

impl WidgetHandle {
    /// Wraps `node` in a fresh handle.
    pub fn new(node: WidgetNode) -> Self { Self(Rc::new(RefCell::new(node))) }

    /// Borrows the node immutably.
    pub fn borrow(&self) -> Ref<'_, WidgetNode> { self.0.borrow() }
    /// Borrows the node mutably.
    pub fn borrow_mut(&self) -> RefMut<'_, WidgetNode> { self.0.borrow_mut() }

    /// Executes `f` with a read-only borrow of the node.
    pub fn with<R>(&self, f: impl FnOnce(&WidgetNode) -> R) -> R { f(&self.0.borrow()) }
    /// Executes `f` with a mutable borrow of the node.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut WidgetNode) -> R) -> R { f(&mut self.0.borrow_mut()) }

    /// Identity comparison, used by the widget manager to test "is this still the remembered
    /// pressed target".
    pub fn same_node(&self, other: &WidgetHandle) -> bool { Rc::ptr_eq(&self.0, &other.0) }

    /// This handle's widget id, for lookups/diagnostics.
    pub fn id(&self) -> String { self.0.borrow().id.clone() }
}

/// Depth-first hit-test over visible, enabled widgets whose bounds contain `(x, y)`,
/// preferring the deepest hit. Applies the interactive-ancestor tie-break: if the deepest hit
/// is a non-interactive container and an ancestor on the hit path is interactive, the
/// interactive ancestor is returned instead.
pub fn hit_test(root: &WidgetHandle, x: i32, y: i32) -> Option<WidgetHandle> {
    let point = crate::geometry::Point::new(x, y);
    hit_test_path(root, point).map(|path| resolve_tie_break(path))
}

fn hit_test_path(node: &WidgetHandle, point: crate::geometry::Point) -> Option<Vec<WidgetHandle>> {
    let (visible, enabled, contains, children) = node.with(|n| (n.is_visible(), n.is_enabled(), n.bounds.contains(point), n.children.clone()));
    if !visible || !enabled || !contains {
        return None;
    }
    for child in children.iter().rev() {
        if let Some(mut path) = hit_test_path(child, point) {
            path.push(node.clone());
            return Some(path);
        }
    }
    Some(vec![node.clone()])
}

fn resolve_tie_break(path: Vec<WidgetHandle>) -> WidgetHandle {
    let deepest = path[0].clone();
    if deepest.with(|n| n.is_interactive()) {
        return deepest;
    }
    for ancestor in path.iter().skip(1) {
        if ancestor.with(|n| n.is_interactive()) {
            return ancestor.clone();
        }
    }
    deepest
}

/// Recomputes `node`'s absolute bounds as `parent_origin + relative_bounds`, then recurses
/// into children using this node's own origin. Call with the root's own absolute bounds as
/// `parent_origin` plus `relative_bounds = bounds` at the root (root widgets set their own
/// absolute bounds directly and are not translated by anything further up).
pub fn layout(node: &WidgetHandle, parent_origin: crate::geometry::Point) {
    let (bounds, children) = node.with_mut(|n| {
        n.bounds = Rect::translate_from(parent_origin, n.relative_bounds);
        n.state_flags.remove(WidgetFlags::DIRTY);
        (n.bounds, n.children.clone())
    });
    for child in &children {
        layout(child, bounds.origin());
    }
}

/// Lays out the root widget directly at `bounds` (its absolute position is authoritative,
/// not derived from any parent), then recurses into children.
pub fn layout_root(root: &WidgetHandle, bounds: Rect) {
    root.with_mut(|n| {
        n.bounds = bounds;
        n.relative_bounds = bounds;
        n.state_flags.remove(WidgetFlags::DIRTY);
    });
    let children = root.with(|n| n.children.clone());
    for child in &children {
        layout(child, bounds.origin());
    }
}

/// Depth-first, pre-order render: paints background and border, then recurses into visible
/// children in order. Kind-specific content (text glyphs, etc.) is painted by each kind's
/// own `render` hook, invoked after the background/border and before children.
pub fn render(node: &WidgetHandle, surface: &mut Surface, measurer: &dyn TextMeasurer) -> CoreResult<()> {
    let (visible, bounds, background, border, border_width, children) =
        node.with(|n| (n.is_visible(), n.bounds, n.background, n.border, n.border_width, n.children.clone()));
    if !visible {
        return Ok(());
    }
    if background.a > 0 {
        surface.fill_rect(bounds.x, bounds.y, bounds.w, bounds.h, background);
    }
    if border_width > 0 && border.a > 0 {
        paint_border(surface, bounds, border_width, border);
    }
    node.with_mut(|n| crate::widget::render_kind(n, surface, measurer))?;
    for child in &children {
        render(child, surface, measurer)?;
    }
    Ok(())
}

/// Depth-first search for the node whose `id` equals `id`, starting at (and including) `node`.
pub fn find_by_id(node: &WidgetHandle, id: &str) -> Option<WidgetHandle> {
    let (this_id, children) = node.with(|n| (n.id.clone(), n.children.clone()));
    if this_id == id {
        return Some(node.clone());
    }
    for child in &children {
        if let Some(found) = find_by_id(child, id) {
            return Some(found);
        }
    }
    None
}

fn paint_border(surface: &mut Surface, bounds: Rect, width: i32, color: Color) {
    surface.fill_rect(bounds.x, bounds.y, bounds.w, width, color);
    surface.fill_rect(bounds.x, bounds.y + bounds.h - width, bounds.w, width, color);
    surface.fill_rect(bounds.x, bounds.y, width, bounds.h, color);
    surface.fill_rect(bounds.x + bounds.w - width, bounds.y, width, bounds.h, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::container::ContainerWidget;

    fn leaf(id: &str, rel: Rect) -> WidgetHandle {
        WidgetHandle::new(WidgetNode::new(id, WidgetKind::Container(ContainerWidget::default()), rel))
    }

    #[test]
    fn layout_propagates_parent_origin() {
        let root = leaf("root", Rect::new(0, 0, 480, 640));
        let child = leaf("child", Rect::new(10, 20, 100, 50));
        root.with_mut(|n| n.children.push(child.clone()));
        layout_root(&root, Rect::new(0, 0, 480, 640));
        let bounds = child.with(|n| n.bounds);
        assert_eq!(bounds, Rect::new(10, 20, 100, 50));
    }

    #[test]
    fn hit_test_prefers_deepest_visible_child() {
        let root = leaf("root", Rect::new(0, 0, 480, 640));
        let child = leaf("child", Rect::new(10, 10, 100, 100));
        root.with_mut(|n| n.children.push(child.clone()));
        layout_root(&root, Rect::new(0, 0, 480, 640));
        let hit = hit_test(&root, 50, 50).unwrap();
        assert_eq!(hit.id(), "child");
    }

    #[test]
    fn hit_test_skips_hidden_widgets() {
        let root = leaf("root", Rect::new(0, 0, 480, 640));
        let child = leaf("child", Rect::new(10, 10, 100, 100));
        child.with_mut(|n| n.state_flags.insert(WidgetFlags::HIDDEN));
        root.with_mut(|n| n.children.push(child.clone()));
        layout_root(&root, Rect::new(0, 0, 480, 640));
        let hit = hit_test(&root, 50, 50).unwrap();
        assert_eq!(hit.id(), "root");
    }
}
