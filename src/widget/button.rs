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
//! Interactive container: derives its fill color from the owning node's state flags and
//! carries the bus event a click publishes. Labels are composed as an ordinary child text
//! widget rather than an owned string, keeping styling/layout in one place.

use crate::event_bus::{EventBus, Payload};
use crate::geometry::Color;
use crate::widget::tree::WidgetFlags;

/// The four colors a button cycles through as its state flags change.
#[derive(Copy, Clone, Debug)]
pub struct ButtonColors {
    /// Resting state, no interaction.
    pub normal: Color,
    /// Pointer is over the button but not pressed.
    pub hover: Color,
    /// Pointer is down on the button.
    pub pressed: Color,
    /// Button does not accept input.
    pub disabled: Color,
}

impl Default for ButtonColors {
    fn default() -> Self {
        Self {
            normal: Color::new(0x3a, 0x3a, 0x48, 255),
            hover: Color::new(0x4a, 0x4a, 0x5c, 255),
            pressed: Color::new(0x2a, 0x2a, 0x38, 255),
            disabled: Color::new(0x28, 0x28, 0x30, 160),
        }
    }
}

/// A clickable button. Holds no label of its own (that's a child [`super::text::TextWidget`]);
/// holds the action a click takes: an event name published on the bus with an owned copy of
/// `click_payload_widget_id` as its payload, so subscribers can tell which button fired
/// without the button needing to know who's listening.
#[derive(Clone)]
pub struct ButtonWidget {
    colors: ButtonColors,
    on_click_event: Option<String>,
    page: i32,
    button_index: i32,
}

impl ButtonWidget {
    /// Builds a button with default colors and no configured click event.
    pub fn new() -> Self { Self { colors: ButtonColors::default(), on_click_event: None, page: -1, button_index: -1 } }

    /// Builds a button with the given colors.
    pub fn with_colors(colors: ButtonColors) -> Self { Self { colors, on_click_event: None, page: -1, button_index: -1 } }

    /// Configures the bus event name a click publishes.
    pub fn with_click_event(mut self, event_name: impl Into<String>) -> Self {
        self.on_click_event = Some(event_name.into());
        self
    }

    /// Associates this button with a page index, carried on the generic `ui.button_pressed`
    /// payload the widget manager publishes for every click.
    pub fn with_page(mut self, page: i32) -> Self {
        self.page = page;
        self
    }

    /// Sets the stable `button_index` carried on the generic `ui.button_pressed` payload
    /// (spec §6), distinct from the widget id: a small ordinal a collaborator can switch on
    /// without string matching.
    pub fn with_index(mut self, index: i32) -> Self {
        self.button_index = index;
        self
    }

    /// The page this button is associated with, or `-1` if none was configured.
    pub fn page(&self) -> i32 { self.page }

    /// The `button_index` this button reports on `ui.button_pressed`, or `-1` if none was
    /// configured.
    pub fn index(&self) -> i32 { self.button_index }

    /// The color this button's background should show for `flags`, in disabled > pressed >
    /// hover > normal priority order.
    pub fn resolve_color(&self, flags: WidgetFlags) -> Color {
        if flags.contains(WidgetFlags::DISABLED) {
            self.colors.disabled
        } else if flags.contains(WidgetFlags::PRESSED) {
            self.colors.pressed
        } else if flags.contains(WidgetFlags::HOVERED) {
            self.colors.hover
        } else {
            self.colors.normal
        }
    }

    /// Invoked by the widget manager when this button is clicked. Publishes
    /// `on_click_event` (if configured) with `widget_id` as the payload.
    pub fn dispatch_click(&self, bus: &EventBus, widget_id: &str) {
        if let Some(name) = &self.on_click_event {
            let payload: Payload = std::sync::Arc::new(widget_id.to_string());
            bus.publish(name, payload);
        }
    }
}

impl Default for ButtonWidget {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_outranks_pressed_and_hover() {
        let button = ButtonWidget::new();
        let flags = WidgetFlags::DISABLED | WidgetFlags::PRESSED | WidgetFlags::HOVERED;
        assert_eq!(button.resolve_color(flags), button.colors.disabled);
    }

    #[test]
    fn pressed_outranks_hover() {
        let button = ButtonWidget::new();
        let flags = WidgetFlags::PRESSED | WidgetFlags::HOVERED;
        assert_eq!(button.resolve_color(flags), button.colors.pressed);
    }

    #[test]
    fn click_publishes_configured_event_with_widget_id() {
        let bus = EventBus::new();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(None));
        {
            let seen = seen.clone();
            bus.subscribe(
                "system.page_transition",
                Box::new(move |payload| {
                    if let Some(id) = payload.downcast_ref::<String>() {
                        *seen.lock().unwrap() = Some(id.clone());
                    }
                }),
            )
            .unwrap();
        }
        let button = ButtonWidget::new().with_click_event("system.page_transition");
        button.dispatch_click(&bus, "go_to_page_1_btn");
        assert_eq!(seen.lock().unwrap().as_deref(), Some("go_to_page_1_btn"));
    }

    #[test]
    fn click_with_no_configured_event_is_noop() {
        let bus = EventBus::new();
        let button = ButtonWidget::new();
        button.dispatch_click(&bus, "whatever");
    }
}
