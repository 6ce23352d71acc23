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
//! Wall-clock display: reformats the current local time on a `strftime`-style pattern and
//! writes the result into a composed text child, only when the formatted string actually
//! changes (once a second for the default pattern, not once a frame).

use chrono::Local;

use crate::widget::tree::WidgetHandle;
use crate::widget::WidgetKind;

/// Default pattern: `HH:MM:SS`, 24-hour clock.
pub const DEFAULT_PATTERN: &str = "%H:%M:%S";

/// Composes a text child reformatted from the wall clock on every `update` call where the
/// formatted string has changed since the last call.
#[derive(Clone)]
pub struct TimeWidget {
    pattern: String,
    last_rendered: Option<String>,
}

impl TimeWidget {
    /// Builds a time widget using `pattern` (chrono `strftime` syntax).
    pub fn new(pattern: impl Into<String>) -> Self { Self { pattern: pattern.into(), last_rendered: None } }

    /// Formats `now` and, if it differs from the last formatted value, writes it into the
    /// first child (expected to be a [`WidgetKind::Text`]). Returns `true` if the child was
    /// updated.
    pub fn update(&mut self, children: &[WidgetHandle], now: chrono::DateTime<Local>) -> bool {
        let formatted = now.format(&self.pattern).to_string();
        if self.last_rendered.as_deref() == Some(formatted.as_str()) {
            return false;
        }
        self.last_rendered = Some(formatted.clone());
        if let Some(child) = children.first() {
            child.with_mut(|node| {
                if let WidgetKind::Text(text) = &mut node.kind {
                    text.set_text(formatted);
                }
            });
        }
        true
    }
}

impl Default for TimeWidget {
    fn default() -> Self { Self::new(DEFAULT_PATTERN) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Color, Rect};
    use crate::widget::text::TextWidget;
    use crate::widget::tree::WidgetNode;
    use chrono::TimeZone;

    fn text_child(initial: &str) -> WidgetHandle {
        let text = TextWidget::new(initial, 1, 18, Color::WHITE);
        WidgetHandle::new(WidgetNode::new("time_label", WidgetKind::Text(text), Rect::new(0, 0, 80, 20)))
    }

    #[test]
    fn update_writes_formatted_time_into_child() {
        let mut widget = TimeWidget::new("%H:%M:%S");
        let child = text_child("");
        let now = Local.with_ymd_and_hms(2026, 1, 1, 9, 30, 5).unwrap();
        let changed = widget.update(std::slice::from_ref(&child), now);
        assert!(changed);
        child.with(|n| {
            if let WidgetKind::Text(text) = &n.kind {
                assert_eq!(text.text(), "09:30:05");
            } else {
                panic!("expected text child");
            }
        });
    }

    #[test]
    fn update_is_a_noop_within_the_same_second() {
        let mut widget = TimeWidget::new("%H:%M:%S");
        let child = text_child("");
        let now = Local.with_ymd_and_hms(2026, 1, 1, 9, 30, 5).unwrap();
        assert!(widget.update(std::slice::from_ref(&child), now));
        assert!(!widget.update(std::slice::from_ref(&child), now));
    }
}
