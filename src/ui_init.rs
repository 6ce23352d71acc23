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
//! Builds the fixed two-page widget tree the binary starts with, and wires the bus
//! subscriptions that translate button clicks and API updates into state-store writes.
//! Handlers registered here only ever touch [`EventBus`]/[`StateStore`] clones (both
//! `Send + Sync`); they never close over a [`WidgetHandle`], which is an `Rc` and so cannot
//! cross into a bus handler. Applying a changed store value back onto the tree is instead
//! [`crate::app::App`]'s job, once per frame.

use std::sync::Arc;

use crate::config::Config;
use crate::event_bus::EventBus;
use crate::events::{ApiRefreshEvent, PageTransitionEvent};
use crate::geometry::{Color, Rect};
use crate::state_store::StateStore;
use crate::widget::button::ButtonWidget;
use crate::widget::container::ContainerWidget;
use crate::widget::data_display::{DataDisplayWidget, UserRecord};
use crate::widget::page::PageWidget;
use crate::widget::page_manager::PageManagerWidget;
use crate::widget::text::TextWidget;
use crate::widget::time_widget::TimeWidget;
use crate::widget::tree::{WidgetHandle, WidgetNode};
use crate::widget::{TextAlign, WidgetKind};

/// Widget id of the root page manager, addressed directly by the application loop for drag
/// and jump routing.
pub(crate) const PAGER_ID: &str = "pager";
/// Widget id of page 0's color-cycling title text.
pub(crate) const PAGE0_TITLE_ID: &str = "page0_title";
/// Widget id of the button that requests page 1's fixed navigation target.
pub(crate) const GOTO_PAGE1_BTN_ID: &str = "goto_page1_btn";
/// Widget id of page 1's clock readout.
pub(crate) const PAGE1_TIME_ID: &str = "page1_time";
/// Widget id of the cached-user-record display on page 1.
pub(crate) const DATA_DISPLAY_ID: &str = "user_data_display";
/// Widget id of the container holding the three debug buttons.
pub(crate) const DEBUG_CONTAINER_ID: &str = "debug_container";

const CHANGE_COLOR_EVENT: &str = "page0.change_color_clicked";
const BLUE_EVENT: &str = "page1.blue_clicked";
const RANDOM_EVENT: &str = "page1.random_clicked";
const TIME_TOGGLE_EVENT: &str = "page1.time_toggle_clicked";
const REFRESH_USER_EVENT: &str = "page1.refresh_user_clicked";
const EXIT_APP_EVENT: &str = "page1.exit_app_clicked";
const DEBUG_TOGGLE_FLAGS_EVENT: &str = "page1.debug_toggle_flags_clicked";
const DEBUG_FORCE_NOTIFY_EVENT: &str = "page1.debug_force_notify_clicked";
const DEBUG_DUMP_STATE_EVENT: &str = "page1.debug_dump_state_clicked";

/// The cycling palette the "Change Text Color" button steps through, in order.
pub(crate) const PALETTE: [Color; 7] = [
    Color::new(0xe0, 0x3c, 0x3c, 255), // red
    Color::new(0xe0, 0x8c, 0x32, 255), // orange
    Color::new(0xdc, 0xc8, 0x3c, 255), // yellow
    Color::new(0x46, 0xb4, 0x5a, 255), // green
    Color::new(0x3c, 0x78, 0xdc, 255), // blue
    Color::new(0x5a, 0x46, 0xc8, 255), // indigo
    Color::new(0xaa, 0x46, 0xbe, 255), // violet
];

const BG_BLUE: Color = Color::new(0x20, 0x40, 0x90, 255);
const FONT_REGULAR: u32 = 0;
const FONT_LARGE: u32 = 1;
const FONT_SMALL: u32 = 2;

/// Widget handles the application loop re-reads from the store and applies every frame, kept
/// around at construction time rather than re-found by id on every pass.
pub(crate) struct Handles {
    pub(crate) page0_title: WidgetHandle,
    pub(crate) page1_time: WidgetHandle,
    pub(crate) data_display: WidgetHandle,
    pub(crate) debug_container: WidgetHandle,
}

/// Builds the root container, its page manager, and both pages, seeds the store with every
/// key the tree's presentation depends on, and subscribes the bus handlers that translate
/// clicks into store writes.
pub(crate) fn build(config: &Config, bus: &EventBus, store: &Arc<StateStore>) -> (WidgetHandle, Handles) {
    let width = config.display.width as i32;
    let height = config.display.height as i32;

    seed_store(store, config);
    subscribe_handlers(bus, store);

    let root = WidgetHandle::new(WidgetNode::new("root", WidgetKind::Container(ContainerWidget), Rect::new(0, 0, width, height)));
    let pager = WidgetHandle::new(WidgetNode::new(PAGER_ID, WidgetKind::PageManager(PageManagerWidget::new()), Rect::new(0, 0, width, height)));

    let (page0, page0_title) = build_page0(width, height);
    let (page1, page1_time, data_display, debug_container) = build_page1(width, height);
    pager.with_mut(|n| n.children.extend([page0, page1]));
    root.with_mut(|n| n.children.push(pager));

    (root, Handles { page0_title, page1_time, data_display, debug_container })
}

fn seed_store(store: &StateStore, config: &Config) {
    let bg = config.ui.colors.background;
    let _ = store.set("app", "bg_color", &[bg.r, bg.g, bg.b, bg.a]);
    let _ = store.set("app", "page1_text_color", &[0]);
    let _ = store.set("app", "show_time", &[1]);
    let _ = store.set("app", "show_debug", &[0]);
    let _ = store.set("app", "quit", &[0]);
}

fn subscribe_handlers(bus: &EventBus, store: &Arc<StateStore>) {
    {
        let store = store.clone();
        bus.subscribe(
            CHANGE_COLOR_EVENT,
            Box::new(move |_payload| {
                let idx = store.get("app", "page1_text_color").map(|e| e.bytes.first().copied().unwrap_or(0)).unwrap_or(0);
                let next = (idx as usize + 1) % PALETTE.len();
                let _ = store.set("app", "page1_text_color", &[next as u8]);
            }),
        )
        .expect("change-color subscription");
    }
    {
        let store = store.clone();
        bus.subscribe(
            BLUE_EVENT,
            Box::new(move |_payload| {
                let _ = store.set("app", "bg_color", &[BG_BLUE.r, BG_BLUE.g, BG_BLUE.b, BG_BLUE.a]);
            }),
        )
        .expect("blue subscription");
    }
    {
        let store = store.clone();
        bus.subscribe(
            RANDOM_EVENT,
            Box::new(move |_payload| {
                let (r, g, b): (u8, u8, u8) = (rand::random(), rand::random(), rand::random());
                let _ = store.set("app", "bg_color", &[r, g, b, 255]);
            }),
        )
        .expect("random subscription");
    }
    {
        let store = store.clone();
        bus.subscribe(
            TIME_TOGGLE_EVENT,
            Box::new(move |_payload| {
                let shown = store.get("app", "show_time").map(|e| e.bytes.first().copied().unwrap_or(1) != 0).unwrap_or(true);
                let _ = store.set("app", "show_time", &[if shown { 0 } else { 1 }]);
            }),
        )
        .expect("time-toggle subscription");
    }
    {
        let bus_clone = bus.clone();
        bus.subscribe(
            REFRESH_USER_EVENT,
            Box::new(move |_payload| {
                let payload = Arc::new(ApiRefreshEvent { timestamp_ms: crate::events::now_ms(), source: "refresh_user_btn".to_string() });
                bus_clone.publish("system.api_refresh", payload);
            }),
        )
        .expect("refresh-user subscription");
    }
    {
        let store = store.clone();
        bus.subscribe(EXIT_APP_EVENT, Box::new(move |_payload| { let _ = store.set("app", "quit", &[1]); })).expect("exit-app subscription");
    }
    {
        let store = store.clone();
        bus.subscribe(
            DEBUG_TOGGLE_FLAGS_EVENT,
            Box::new(move |_payload| {
                let shown = store.get("app", "show_debug").map(|e| e.bytes.first().copied().unwrap_or(0) != 0).unwrap_or(false);
                let _ = store.set("app", "show_debug", &[if shown { 0 } else { 1 }]);
            }),
        )
        .expect("debug-toggle subscription");
    }
    bus.subscribe(DEBUG_FORCE_NOTIFY_EVENT, Box::new(move |_payload| { log::info!("debug: forced notification requested"); })).expect("debug-notify subscription");
    {
        let store = store.clone();
        bus.subscribe(
            DEBUG_DUMP_STATE_EVENT,
            Box::new(move |_payload| {
                store.iterate_wildcard("*:*", |type_name, id, entry| {
                    log::info!("state_store: {type_name}:{id} = {} bytes", entry.size);
                });
            }),
        )
        .expect("debug-dump subscription");
    }
    bus.subscribe(
        "system.page_transition",
        Box::new(move |payload| {
            if let Some(event) = payload.downcast_ref::<PageTransitionEvent>() {
                log::info!("page transition: {} -> {}", event.from_page, event.to_page);
            }
        }),
    )
    .expect("page-transition diagnostics subscription");
    {
        let store = store.clone();
        bus.subscribe(
            "api.user_data_updated",
            Box::new(move |payload| {
                if let Some(record) = payload.downcast_ref::<UserRecord>() {
                    if let Ok(bytes) = record.to_bytes() {
                        let _ = store.set("api", "user_data", &bytes);
                    }
                }
            }),
        )
        .expect("user-data subscription");
    }
}

fn build_page0(width: i32, height: i32) -> (WidgetHandle, WidgetHandle) {
    let page = WidgetHandle::new(WidgetNode::new("page0", WidgetKind::Page(PageWidget::new(0)), Rect::new(0, 0, width, height)));

    let title = WidgetHandle::new(WidgetNode::new(
        PAGE0_TITLE_ID,
        WidgetKind::Text(TextWidget::new("PanelKit", FONT_LARGE, 28, PALETTE[0]).with_align(TextAlign::Center)),
        Rect::new(0, 40, width, 60),
    ));

    let button = WidgetHandle::new(WidgetNode::new(
        "change_color_btn",
        WidgetKind::Button(ButtonWidget::new().with_click_event(CHANGE_COLOR_EVENT).with_page(0).with_index(0)),
        Rect::new(width / 2 - 90, 200, 180, 50),
    ));
    let label = WidgetHandle::new(WidgetNode::new(
        "change_color_btn_label",
        WidgetKind::Text(TextWidget::new("Change Text Color", FONT_REGULAR, 16, Color::WHITE).with_align(TextAlign::Center)),
        Rect::new(0, 0, 180, 50),
    ));
    button.with_mut(|n| n.children.push(label));

    page.with_mut(|n| n.children.extend([title.clone(), button]));
    (page, title)
}

fn build_page1(width: i32, height: i32) -> (WidgetHandle, WidgetHandle, WidgetHandle, WidgetHandle) {
    let page = WidgetHandle::new(WidgetNode::new("page1", WidgetKind::Page(PageWidget::new(1)), Rect::new(width, 0, width, height)));

    let title = WidgetHandle::new(WidgetNode::new(
        "page1_title",
        WidgetKind::Text(TextWidget::new("Controls", FONT_LARGE, 28, Color::WHITE).with_align(TextAlign::Center)),
        Rect::new(0, 20, width, 50),
    ));

    let time_widget = WidgetHandle::new(WidgetNode::new(
        PAGE1_TIME_ID,
        WidgetKind::Time(TimeWidget::new(crate::widget::time_widget::DEFAULT_PATTERN)),
        Rect::new(240, 20, 220, 30),
    ));
    let time_label = WidgetHandle::new(WidgetNode::new("page1_time_label", WidgetKind::Text(TextWidget::new("", FONT_SMALL, 18, Color::WHITE)), Rect::new(0, 0, 220, 30)));
    time_widget.with_mut(|n| n.children.push(time_label));

    let data_display = WidgetHandle::new(WidgetNode::new(DATA_DISPLAY_ID, WidgetKind::DataDisplay(DataDisplayWidget::default()), Rect::new(240, 90, 220, 160)));
    let data_children = DataDisplayWidget::build_children(FONT_SMALL, 40, 90, 130, Color::new(0xa0, 0xa0, 0xb0, 255), Color::WHITE);
    data_display.with_mut(|n| n.children.extend(data_children));

    let buttons: [(&str, &str, &str); 6] = [
        ("blue_btn", BLUE_EVENT, "Blue"),
        ("random_btn", RANDOM_EVENT, "Random"),
        ("time_toggle_btn", TIME_TOGGLE_EVENT, "Time"),
        (GOTO_PAGE1_BTN_ID, "", "Go to Page 1"),
        ("refresh_user_btn", REFRESH_USER_EVENT, "Refresh User"),
        ("exit_app_btn", EXIT_APP_EVENT, "Exit App"),
    ];
    let mut button_handles = Vec::with_capacity(buttons.len());
    for (i, (id, event, label)) in buttons.iter().enumerate() {
        button_handles.push(make_button(id, event, label, 20, 90 + i as i32 * 52, 200, 44, 1, i as i32));
    }

    let debug_buttons: [(&str, &str, &str); 3] = [
        ("debug_toggle_flags_btn", DEBUG_TOGGLE_FLAGS_EVENT, "Debug: Flags"),
        ("debug_force_notify_btn", DEBUG_FORCE_NOTIFY_EVENT, "Debug: Notify"),
        ("debug_dump_state_btn", DEBUG_DUMP_STATE_EVENT, "Debug: Dump"),
    ];
    let debug_container = WidgetHandle::new(WidgetNode::new(DEBUG_CONTAINER_ID, WidgetKind::Container(ContainerWidget), Rect::new(20, 402, 200, 160)));
    for (i, (id, event, label)) in debug_buttons.iter().enumerate() {
        let button = make_button(id, event, label, 0, i as i32 * 52, 200, 44, -1, buttons.len() as i32 + i as i32);
        debug_container.with_mut(|n| n.children.push(button));
    }

    page.with_mut(|n| {
        n.children.push(title);
        n.children.extend(button_handles);
        n.children.push(time_widget.clone());
        n.children.push(data_display.clone());
        n.children.push(debug_container.clone());
    });
    (page, time_widget, data_display, debug_container)
}

fn make_button(id: &str, event: &str, label: &str, x: i32, y: i32, w: i32, h: i32, page: i32, button_index: i32) -> WidgetHandle {
    let mut button = ButtonWidget::new().with_page(page).with_index(button_index);
    if !event.is_empty() {
        button = button.with_click_event(event);
    }
    let handle = WidgetHandle::new(WidgetNode::new(id.to_string(), WidgetKind::Button(button), Rect::new(x, y, w, h)));
    let label = WidgetHandle::new(WidgetNode::new(format!("{id}_label"), WidgetKind::Text(TextWidget::new(label, FONT_REGULAR, 16, Color::WHITE).with_align(TextAlign::Center)), Rect::new(0, 0, w, h)));
    handle.with_mut(|n| n.children.push(label));
    handle
}
