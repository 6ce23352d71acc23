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
//! Retained widget tree: hit-testing, event propagation, layout, and Z-order rendering over
//! a sum type of widget kinds.

pub mod button;
pub mod container;
pub mod data_display;
pub mod manager;
pub mod page;
pub mod page_manager;
pub mod text;
pub mod time_widget;
pub mod tree;

pub use manager::WidgetManager;
pub use tree::{WidgetFlags, WidgetHandle, WidgetNode};

use crate::geometry::Color;

/// Opaque handle to a font a [`TextMeasurer`] knows how to measure and rasterize. The core
/// never inspects its value; it is defined by and round-tripped through the text-rendering
/// collaborator.
pub type FontHandle = u32;

/// A small rasterized RGBA8 glyph run, produced by a [`TextMeasurer`] and cached on a text
/// widget keyed by `(text, color, font)`.
#[derive(Clone)]
pub struct TextTexture {
    /// Rasterized width in pixels.
    pub width: u32,
    /// Rasterized height in pixels.
    pub height: u32,
    /// Row-major RGBA8 pixels, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

/// Text measurement/rasterization capability delegated to an external collaborator, per the
/// font-rasterization Non-goal: the core never touches font files directly.
pub trait TextMeasurer {
    /// Returns the pixel size a string would occupy if rasterized with `font` at `size`.
    fn measure(&self, text: &str, font: FontHandle, size: u32) -> (u32, u32);
    /// Rasterizes `text` with `font` at `size` in `color`.
    fn rasterize(&self, text: &str, font: FontHandle, size: u32, color: Color) -> TextTexture;
}

/// Horizontal alignment for [`text::TextWidget`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextAlign {
    /// Flush to the widget's left edge.
    Left,
    /// Centered within the widget's bounds.
    Center,
    /// Flush to the widget's right edge.
    Right,
}

/// The per-kind payload of a [`WidgetNode`]. A sum type rather than a trait-object
/// hierarchy, per the widget-kind dispatch redesign.
pub enum WidgetKind {
    /// Background + children only.
    Container(container::ContainerWidget),
    /// Cached rasterized text.
    Text(text::TextWidget),
    /// Interactive container with four state colors and a click contract.
    Button(button::ButtonWidget),
    /// Composes a text child reformatted from the wall clock.
    Time(time_widget::TimeWidget),
    /// Four-row label/value grid.
    DataDisplay(data_display::DataDisplayWidget),
    /// One screen within a page manager.
    Page(page::PageWidget),
    /// Horizontal pager with swipe, elastic edges, and indicators.
    PageManager(page_manager::PageManagerWidget),
}

impl WidgetKind {
    /// Short tag for logging/diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            WidgetKind::Container(_) => "container",
            WidgetKind::Text(_) => "text",
            WidgetKind::Button(_) => "button",
            WidgetKind::Time(_) => "time",
            WidgetKind::DataDisplay(_) => "data-display",
            WidgetKind::Page(_) => "page",
            WidgetKind::PageManager(_) => "page-manager",
        }
    }
}

/// Paints kind-specific content (glyphs, indicator capsule) for `node`, invoked by
/// [`tree::render`] after the shared background/border paint and before children render. Most
/// kinds have no content of their own beyond the shared node fields and the children the tree
/// walk already recurses into.
pub(crate) fn render_kind(node: &mut tree::WidgetNode, surface: &mut crate::display::Surface, measurer: &dyn TextMeasurer) -> crate::error::CoreResult<()> {
    match &mut node.kind {
        WidgetKind::Text(text) => {
            text.render(node.bounds, surface, measurer);
            Ok(())
        }
        WidgetKind::PageManager(page_manager) => {
            let page_count = node.children.len() as i32;
            page_manager.render_indicators_for(node.bounds, page_count, surface);
            Ok(())
        }
        WidgetKind::Container(_) | WidgetKind::Button(_) | WidgetKind::Time(_) | WidgetKind::DataDisplay(_) | WidgetKind::Page(_) => Ok(()),
    }
}

/// Per-frame, pre-render update for `node`'s own content: re-derives a button's fill color
/// from its current state flags, and reformats the time widget's child when the clock has
/// ticked. Runs before `tree::render` each frame so the paint step never lags a frame behind
/// the state it paints (unlike recoloring inside `render_kind`, which would paint last frame's
/// background before recomputing it). Page managers are stepped separately by
/// [`manager::WidgetManager`], which also needs the event bus and sibling bounds that this
/// generic per-node walk doesn't have.
pub(crate) fn update_kind(node: &mut tree::WidgetNode, now: chrono::DateTime<chrono::Local>) {
    let children = node.children.clone();
    match &mut node.kind {
        WidgetKind::Button(button) => {
            node.background = button.resolve_color(node.state_flags);
        }
        WidgetKind::Time(time) => {
            time.update(&children, now);
        }
        WidgetKind::Container(_) | WidgetKind::Text(_) | WidgetKind::DataDisplay(_) | WidgetKind::Page(_) | WidgetKind::PageManager(_) => {}
    }
}
