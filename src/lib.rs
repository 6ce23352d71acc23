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
#![deny(missing_docs)]
//! `panelkit` is a touch-first UI runtime for small embedded Linux panels and desktop
//! development hosts. It draws a small set of interactive pages to a framebuffer, routes
//! touch and pointer gestures through a retained widget tree, and keeps widget state
//! synchronized with background data sources through an event bus and a typed state store.
//!
//! The crate is organized leaves-first, matching the dependency order of its subsystems:
//! event bus and state store at the bottom, display backend and input source next, the
//! gesture engine above those, the widget tree and manager above that, and the application
//! loop and hardcoded UI initialization on top.

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod event_bus;
pub mod events;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod state_store;
pub mod text_measurer;
pub mod widget;

mod app;
mod ui_init;

pub use app::App;
pub use error::{CoreError, CoreResult, ErrorKind, Notification, NotificationChannel, Severity};
pub use event_bus::EventBus;
pub use state_store::StateStore;
