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
//! Four-row label/value grid showing the latest cached user record. Each row is two
//! composed text children (label, value); bounds are recomputed whenever the record changes.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::geometry::{Color, Rect};
use crate::widget::text::TextWidget;
use crate::widget::tree::WidgetHandle;
use crate::widget::{FontHandle, WidgetKind};

/// The record shape stored under `("api", "user_data")` and carried by
/// `api.user_data_updated` payloads.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone number.
    pub phone: String,
    /// Free-form location string.
    pub location: String,
}

impl UserRecord {
    /// Encodes as the byte form the state store carries.
    pub fn to_bytes(&self) -> CoreResult<Vec<u8>> {
        serde_yaml2::to_string(self)
            .map(|s| s.into_bytes())
            .map_err(|e| CoreError::new(ErrorKind::Parse, format!("UserRecord::to_bytes: {e}")))
    }

    /// Decodes the byte form produced by [`UserRecord::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let text = std::str::from_utf8(bytes).map_err(|e| CoreError::new(ErrorKind::Parse, format!("UserRecord::from_bytes: {e}")))?;
        serde_yaml2::from_str(text).map_err(|e| CoreError::new(ErrorKind::Parse, format!("UserRecord::from_bytes: {e}")))
    }
}

const ROW_LABELS: [&str; 4] = ["Name", "Email", "Phone", "Location"];

/// Displays a [`UserRecord`] as four label/value rows. Expects exactly 8 children in order:
/// `[label0, value0, label1, value1, label2, value2, label3, value3]`, built by
/// [`DataDisplayWidget::build_children`] at construction time.
#[derive(Clone, Default)]
pub struct DataDisplayWidget {
    current: UserRecord,
}

impl DataDisplayWidget {
    /// Builds the 8 label/value text children for a data-display at the given row height,
    /// using `font`/`label_color`/`value_color` for styling. The caller attaches these as the
    /// owning node's children.
    pub fn build_children(font: FontHandle, row_height: i32, label_width: i32, value_width: i32, label_color: Color, value_color: Color) -> Vec<WidgetHandle> {
        let mut children = Vec::with_capacity(8);
        for (row, label) in ROW_LABELS.iter().enumerate() {
            let y = row as i32 * row_height;
            let label_node = WidgetHandle::new(crate::widget::tree::WidgetNode::new(
                format!("data_display_label_{row}"),
                WidgetKind::Text(TextWidget::new(*label, font, 14, label_color)),
                Rect::new(0, y, label_width, row_height),
            ));
            let value_node = WidgetHandle::new(crate::widget::tree::WidgetNode::new(
                format!("data_display_value_{row}"),
                WidgetKind::Text(TextWidget::new("", font, 14, value_color)),
                Rect::new(label_width, y, value_width, row_height),
            ));
            children.push(label_node);
            children.push(value_node);
        }
        children
    }

    /// Replaces the displayed record, writing the four value strings into the value-column
    /// children (odd indices) if the record actually changed.
    pub fn update(&mut self, children: &[WidgetHandle], record: UserRecord) -> bool {
        if record == self.current {
            return false;
        }
        self.current = record;
        let values = [&self.current.name, &self.current.email, &self.current.phone, &self.current.location];
        for (row, value) in values.iter().enumerate() {
            if let Some(child) = children.get(row * 2 + 1) {
                child.with_mut(|node| {
                    if let WidgetKind::Text(text) = &mut node.kind {
                        text.set_text((*value).clone());
                    }
                });
            }
        }
        true
    }

    /// The record currently displayed.
    pub fn current(&self) -> &UserRecord { &self.current }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_round_trips_through_bytes() {
        let record = UserRecord { name: "Ada".into(), email: "a@x".into(), phone: "555".into(), location: "NYC".into() };
        let bytes = record.to_bytes().unwrap();
        assert_eq!(UserRecord::from_bytes(&bytes).unwrap(), record);
    }

    #[test]
    fn update_writes_values_into_value_column_children() {
        let children = DataDisplayWidget::build_children(1, 20, 60, 100, Color::WHITE, Color::WHITE);
        let mut widget = DataDisplayWidget::default();
        let record = UserRecord { name: "Ada".into(), email: "a@x".into(), phone: "555".into(), location: "NYC".into() };
        let changed = widget.update(&children, record.clone());
        assert!(changed);
        children[1].with(|n| {
            if let WidgetKind::Text(text) = &n.kind { assert_eq!(text.text(), "Ada"); } else { panic!("expected text"); }
        });
        children[7].with(|n| {
            if let WidgetKind::Text(text) = &n.kind { assert_eq!(text.text(), "NYC"); } else { panic!("expected text"); }
        });
    }

    #[test]
    fn update_is_noop_for_unchanged_record() {
        let children = DataDisplayWidget::build_children(1, 20, 60, 100, Color::WHITE, Color::WHITE);
        let mut widget = DataDisplayWidget::default();
        let record = UserRecord { name: "Ada".into(), email: "a@x".into(), phone: "555".into(), location: "NYC".into() };
        assert!(widget.update(&children, record.clone()));
        assert!(!widget.update(&children, record));
    }
}
