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
//! The application: owns every collaborator wired together by [`crate::ui_init`], drives the
//! ~60Hz frame loop, and bridges gesture outcomes into widget-manager and page-manager calls.
//!
//! Bus handlers installed in [`crate::ui_init`] only ever write to the state store, since a
//! [`crate::widget::tree::WidgetHandle`] is an `Rc` and cannot cross into a `Send + Sync` bus
//! handler. Applying a changed store value onto the tree — recoloring page 0's title,
//! showing/hiding the clock, refreshing the cached user record — is this module's job,
//! repeated once per frame; every one of those applications is idempotent, so doing it
//! unconditionally every frame rather than tracking "did this change" is both simpler and
//! correct.

use std::time::{Duration, Instant};

use chrono::Local;

use crate::config::Config;
use crate::display::mock::MockBackend;
use crate::display::Backend;
use crate::error::{CoreResult, Notification, NotificationChannel};
use crate::event_bus::EventBus;
use crate::gesture::{GestureConfig, GestureEngine, GestureOutcome};
use crate::geometry::{Color, Point};
use crate::input::mock_source::MockSource;
use crate::input::{InputSource, MouseButton, NormalizedEvent};
use crate::state_store::StateStore;
use crate::text_measurer::BlockTextMeasurer;
use crate::ui_init::{self, Handles};
use crate::widget::tree::{self, WidgetFlags, WidgetHandle};
use crate::widget::{data_display::UserRecord, TextMeasurer, WidgetKind, WidgetManager};

/// Synthetic pointer id mouse events are tracked under, kept out of the range evdev/SDL2
/// finger ids occupy.
const MOUSE_POINTER_ID: u32 = u32::MAX;
/// Target frame interval for the ~60Hz cadence in the application loop.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Owns every runtime collaborator: display backend, input source, gesture classifier,
/// widget tree and the manager that drives it, event bus, state store, and the notification
/// channel the error-handling design feeds. Construct with [`App::new`] for a real backend
/// and input source, or [`App::new_with`] to supply already-built ones (what the integration
/// tests use to drive a [`MockBackend`]/[`MockSource`] pair headlessly).
pub struct App {
    backend: Backend,
    input: InputSource,
    gesture: GestureEngine,
    manager: WidgetManager,
    root: WidgetHandle,
    handles: Handles,
    bus: EventBus,
    store: std::sync::Arc<StateStore>,
    measurer: Box<dyn TextMeasurer>,
    notifications: NotificationChannel,
    width: u32,
    height: u32,
}

impl App {
    /// Builds a backend and input source per `config` (auto-selecting direct/evdev vs.
    /// windowed/native as §4.3/§4.4 describe) and wires the rest of the runtime around them.
    pub fn new(config: Config) -> CoreResult<Self> {
        let backend = Backend::create(&config.display)?;
        let prefer_evdev = matches!(backend, Backend::Direct(_));
        let input = InputSource::create(&config.input, prefer_evdev)?;
        Self::new_with(config, backend, input)
    }

    /// Builds the runtime around an already-constructed backend and input source. Used
    /// directly by tests that want a [`MockBackend`]/[`MockSource`] pair without touching a
    /// real display or device.
    pub fn new_with(config: Config, backend: Backend, input: InputSource) -> CoreResult<Self> {
        let info = backend.info();
        let bus = EventBus::new();
        let store = std::sync::Arc::new(StateStore::new());
        let (root, handles) = ui_init::build(&config, &bus, &store);
        tree::layout_root(&root, crate::geometry::Rect::new(0, 0, info.actual_width as i32, info.actual_height as i32));

        Ok(Self {
            backend,
            input,
            gesture: GestureEngine::new(GestureConfig::default()),
            manager: WidgetManager::new(),
            root,
            handles,
            bus,
            store,
            measurer: Box::new(BlockTextMeasurer::new()),
            notifications: NotificationChannel::new(32),
            width: info.actual_width,
            height: info.actual_height,
        })
    }

    /// Builds an all-mock runtime (headless backend, scripted input source) for tests.
    pub fn new_mock(config: Config, width: u32, height: u32) -> CoreResult<Self> {
        Self::new_with(config, Backend::Mock(MockBackend::new(width, height)), InputSource::Mock(MockSource::new()))
    }

    /// The event bus, for tests that want to subscribe and observe published events.
    pub fn bus(&self) -> &EventBus { &self.bus }
    /// The state store, for tests that want to seed or assert on cached values.
    pub fn store(&self) -> &std::sync::Arc<StateStore> { &self.store }
    /// The root of the widget tree, for tests that want to inspect widget state directly.
    pub fn root(&self) -> &WidgetHandle { &self.root }
    /// Mutable access to the input source, so tests can push scripted events onto a
    /// [`MockSource`] between frames.
    pub fn input_mut(&mut self) -> &mut InputSource { &mut self.input }
    /// The backend, for tests that want to inspect the painted surface or present count.
    pub fn backend(&self) -> &Backend { &self.backend }

    /// Whether the application has been asked to quit, via `("app", "quit")` or a `Quit`
    /// input event.
    pub fn should_quit(&self) -> bool {
        self.store.get("app", "quit").map(|e| e.bytes.first().copied().unwrap_or(0) != 0).unwrap_or(false)
    }

    /// Runs the frame loop until [`Self::should_quit`], sleeping to hold the ~60Hz cadence,
    /// then tears down the input source.
    pub fn run(&mut self) -> CoreResult<()> {
        while !self.should_quit() {
            let frame_start = Instant::now();
            self.step(FRAME_INTERVAL)?;
            let elapsed = frame_start.elapsed();
            if elapsed < FRAME_INTERVAL {
                std::thread::sleep(FRAME_INTERVAL - elapsed);
            }
        }
        self.input.stop();
        Ok(())
    }

    /// Runs exactly one frame: drains input, classifies gestures, dispatches clicks and page
    /// drags, syncs store-derived presentation onto the tree, steps page-manager animation,
    /// drains and republishes queued notifications, then paints and presents. `dt` is the
    /// interval to advance page-manager animation by (independent of wall-clock sleeping, so
    /// tests can drive deterministic frame steps).
    pub fn step(&mut self, dt: Duration) -> CoreResult<()> {
        let now = Instant::now();
        for event in self.input.drain() {
            self.handle_input_event(event, now);
        }
        let _ = self.gesture.tick(now);

        self.sync_store_to_tree();
        self.update_tree(&self.root.clone(), Local::now());
        self.manager.update_page_managers(&self.root, &self.bus, dt);

        for notification in self.notifications.drain() {
            self.bus.publish("system.notification", std::sync::Arc::new(notification));
        }

        let bg = self.store.get("app", "bg_color").ok().and_then(|e| decode_color(&e.bytes)).unwrap_or(Color::BLACK);
        let surface = self.backend.surface_mut();
        surface.clear(bg);
        tree::render(&self.root, surface, self.measurer.as_ref())?;
        self.backend.present()?;
        Ok(())
    }

    fn handle_input_event(&mut self, event: NormalizedEvent, now: Instant) {
        match event {
            NormalizedEvent::FingerDown { finger_id, x_norm, y_norm, .. } => {
                let (x, y) = self.to_pixels(x_norm, y_norm);
                self.pointer_down(finger_id, x, y, now);
            }
            NormalizedEvent::FingerMotion { finger_id, x_norm, y_norm, .. } => {
                let (x, y) = self.to_pixels(x_norm, y_norm);
                self.pointer_motion(finger_id, x, y, now);
            }
            NormalizedEvent::FingerUp { finger_id, x_norm, y_norm, .. } => {
                let (x, y) = self.to_pixels(x_norm, y_norm);
                self.pointer_up(finger_id, x, y);
            }
            NormalizedEvent::MouseButtonDown { button, x, y } => {
                if button == MouseButton::Left {
                    self.pointer_down(MOUSE_POINTER_ID, x, y, now);
                }
            }
            NormalizedEvent::MouseButtonUp { button, x, y } => {
                if button == MouseButton::Left {
                    self.pointer_up(MOUSE_POINTER_ID, x, y);
                }
            }
            NormalizedEvent::MouseMotion { x, y, buttons } => {
                if buttons.is_empty() {
                    self.manager.pointer_motion_hover(&self.root, x, y);
                } else {
                    self.pointer_motion(MOUSE_POINTER_ID, x, y, now);
                }
            }
            NormalizedEvent::KeyDown { keysym } => log::trace!("key down: {keysym}"),
            NormalizedEvent::KeyUp { keysym } => log::trace!("key up: {keysym}"),
            NormalizedEvent::Quit => {
                let _ = self.store.set("app", "quit", &[1]);
            }
        }
    }

    fn pointer_down(&mut self, pointer_id: u32, x: i32, y: i32, now: Instant) {
        let target_widget = self.manager.pointer_down(&self.root, pointer_id, x, y);
        let target_page = self.current_page();
        let outcome = self.gesture.pointer_down(pointer_id, Point::new(x, y), target_widget, target_page, now);
        self.apply_outcome(pointer_id, outcome);
    }

    fn pointer_motion(&mut self, pointer_id: u32, x: i32, y: i32, now: Instant) {
        let outcome = self.gesture.pointer_motion(pointer_id, Point::new(x, y), now);
        self.apply_outcome(pointer_id, outcome);
    }

    fn pointer_up(&mut self, pointer_id: u32, x: i32, y: i32) {
        let outcome = self.gesture.pointer_up(pointer_id, Point::new(x, y));
        self.apply_outcome(pointer_id, outcome);
        self.manager.pointer_up(pointer_id, x, y);
    }

    fn apply_outcome(&mut self, pointer_id: u32, outcome: GestureOutcome) {
        match outcome {
            GestureOutcome::None | GestureOutcome::ScrollDelta { .. } | GestureOutcome::HoldStarted | GestureOutcome::HoldEnded => {}
            GestureOutcome::Click { target_widget, point } => {
                if let Some(id) = target_widget {
                    self.manager.dispatch_click(&self.root, &self.bus, pointer_id, &id, point);
                    self.handle_click_side_effect(&id);
                }
            }
            GestureOutcome::SwipeDelta { dx_total } => {
                self.manager.drag_page_manager(&self.root, ui_init::PAGER_ID, dx_total);
            }
            GestureOutcome::SwipeEnd { dx_total } => {
                self.manager.end_drag_page_manager(&self.root, ui_init::PAGER_ID, dx_total, 0.30);
            }
        }
    }

    /// Widget ids whose click needs direct access to [`WidgetManager`]/the page manager
    /// rather than a pure store write, so they cannot be handled by a bus subscription
    /// installed in [`crate::ui_init`] (a bus handler cannot capture a `WidgetHandle`).
    fn handle_click_side_effect(&mut self, widget_id: &str) {
        if widget_id == ui_init::GOTO_PAGE1_BTN_ID {
            self.manager.jump_page_manager(&self.root, &self.bus, ui_init::PAGER_ID, 1);
        }
    }

    fn current_page(&self) -> i32 {
        tree::find_by_id(&self.root, ui_init::PAGER_ID)
            .map(|pager| pager.with(|n| match &n.kind {
                WidgetKind::PageManager(pm) => pm.current_page(),
                _ => 0,
            }))
            .unwrap_or(0)
    }

    fn to_pixels(&self, x_norm: f32, y_norm: f32) -> (i32, i32) {
        ((x_norm * self.width as f32) as i32, (y_norm * self.height as f32) as i32)
    }

    /// Re-applies every store key the presentation depends on to the tree. Each application
    /// is a no-op if nothing actually changed (flag inserts/removes are idempotent, and
    /// `TextWidget::set_color`/`DataDisplayWidget::update` already skip unchanged values), so
    /// running this unconditionally every frame is both simpler than tracking deltas and
    /// exactly as correct.
    fn sync_store_to_tree(&self) {
        if let Ok(entry) = self.store.get("app", "page1_text_color") {
            let idx = entry.bytes.first().copied().unwrap_or(0) as usize % ui_init::PALETTE.len();
            self.handles.page0_title.with_mut(|n| {
                if let WidgetKind::Text(text) = &mut n.kind {
                    text.set_color(ui_init::PALETTE[idx]);
                }
            });
        }

        let show_time = self.store.get("app", "show_time").map(|e| e.bytes.first().copied().unwrap_or(1) != 0).unwrap_or(true);
        set_hidden(&self.handles.page1_time, !show_time);

        let show_debug = self.store.get("app", "show_debug").map(|e| e.bytes.first().copied().unwrap_or(0) != 0).unwrap_or(false);
        set_hidden(&self.handles.debug_container, !show_debug);

        if let Ok(entry) = self.store.get("api", "user_data") {
            if let Ok(record) = UserRecord::from_bytes(&entry.bytes) {
                self.apply_user_record(record);
            }
        }
    }

    fn apply_user_record(&self, record: UserRecord) {
        let children = self.handles.data_display.with(|n| n.children.clone());
        self.handles.data_display.with_mut(|n| {
            if let WidgetKind::DataDisplay(dd) = &mut n.kind {
                dd.update(&children, record);
            }
        });
    }

    /// Recursive per-node update pass (button color resolution, clock reformatting); see
    /// [`crate::widget::update_kind`] for what each kind actually does.
    fn update_tree(&self, node: &WidgetHandle, now: chrono::DateTime<Local>) {
        let children = node.with(|n| n.children.clone());
        node.with_mut(|n| crate::widget::update_kind(n, now));
        for child in &children {
            self.update_tree(child, now);
        }
    }
}

fn set_hidden(handle: &WidgetHandle, hidden: bool) {
    handle.with_mut(|n| {
        if hidden {
            n.state_flags.insert(WidgetFlags::HIDDEN);
        } else {
            n.state_flags.remove(WidgetFlags::HIDDEN);
        }
    });
}

fn decode_color(bytes: &[u8]) -> Option<Color> {
    if bytes.len() == 4 {
        Some(Color::new(bytes[0], bytes[1], bytes[2], bytes[3]))
    } else {
        None
    }
}

/// Pushes a notification onto `channel`'s sender, logging rather than panicking if the
/// channel is full. Kept as a free function since producers reaching for this live outside
/// `App` (e.g. a future out-of-scope collaborator thread holding only the cloned sender).
pub fn notify(channel: &NotificationChannel, notification: Notification) {
    if channel.sender().try_send(notification).is_err() {
        log::warn!("notification channel full, dropping notification");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::data_display::UserRecord;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.display.width = 480;
        config.display.height = 640;
        config
    }

    #[test]
    fn construction_lays_out_initial_tree() {
        let app = App::new_mock(test_config(), 480, 640).unwrap();
        let button = tree::find_by_id(app.root(), "change_color_btn").unwrap();
        assert_eq!(button.with(|n| n.bounds), crate::geometry::Rect::new(150, 200, 180, 50));
    }

    #[test]
    fn s1_click_cycles_page0_title_color_without_changing_page() {
        let mut app = App::new_mock(test_config(), 480, 640).unwrap();
        if let InputSource::Mock(source) = app.input_mut() {
            source.tap(0, 1, 200.0 / 480.0, 220.0 / 640.0);
        }
        app.step(Duration::from_millis(16)).unwrap();
        let idx = app.store().get("app", "page1_text_color").unwrap().bytes[0];
        assert_eq!(idx, 1);
        assert_eq!(app.current_page(), 0);
    }

    #[test]
    fn s3_swipe_past_commit_fraction_changes_page() {
        let mut app = App::new_mock(test_config(), 480, 640).unwrap();
        if let InputSource::Mock(source) = app.input_mut() {
            source.swipe(0, 1, 400.0 / 480.0, 300.0 / 640.0, 240.0 / 480.0, 305.0 / 640.0);
        }
        app.step(Duration::from_millis(16)).unwrap();
        for _ in 0..200 {
            app.step(Duration::from_millis(16)).unwrap();
        }
        assert_eq!(app.current_page(), 1);
    }

    #[test]
    fn s2_swipe_under_commit_fraction_snaps_back() {
        let mut app = App::new_mock(test_config(), 480, 640).unwrap();
        if let InputSource::Mock(source) = app.input_mut() {
            source.swipe(0, 1, 400.0 / 480.0, 300.0 / 640.0, 260.0 / 480.0, 305.0 / 640.0);
        }
        app.step(Duration::from_millis(16)).unwrap();
        for _ in 0..200 {
            app.step(Duration::from_millis(16)).unwrap();
        }
        assert_eq!(app.current_page(), 0);
    }

    #[test]
    fn exit_app_button_sets_quit() {
        let mut app = App::new_mock(test_config(), 480, 640).unwrap();
        app.manager.jump_page_manager(&app.root.clone(), &app.bus.clone(), ui_init::PAGER_ID, 1);
        app.step(Duration::from_millis(16)).unwrap();
        let button = tree::find_by_id(app.root(), "exit_app_btn").unwrap();
        let bounds = button.with(|n| n.bounds);
        if let InputSource::Mock(source) = app.input_mut() {
            let cx = (bounds.x + bounds.w / 2) as f32 / 480.0;
            let cy = (bounds.y + bounds.h / 2) as f32 / 640.0;
            source.tap(0, 1, cx, cy);
        }
        app.step(Duration::from_millis(16)).unwrap();
        assert!(app.should_quit());
    }

    #[test]
    fn api_user_data_updated_populates_data_display() {
        let app = App::new_mock(test_config(), 480, 640).unwrap();
        let record = UserRecord { name: "Ada".into(), email: "ada@example.com".into(), phone: "555".into(), location: "London".into() };
        app.bus().publish("api.user_data_updated", std::sync::Arc::new(record.clone()));
        app.sync_store_to_tree();
        let value0 = tree::find_by_id(app.root(), "data_display_value_0").unwrap();
        assert_eq!(value0.with(|n| match &n.kind {
            WidgetKind::Text(text) => text.text().to_string(),
            _ => String::new(),
        }), "Ada");
    }
}
