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
//! Typed payloads for the stable bus name namespace in §6. The bus itself is untyped
//! (`Arc<dyn Any + Send + Sync>`); these structs are what producers actually publish and
//! consumers actually downcast to for each reserved name.

use std::time::{SystemTime, UNIX_EPOCH};

/// Payload of `system.page_transition`, published once a page-manager animation completes.
#[derive(Clone, Debug, PartialEq)]
pub struct PageTransitionEvent {
    /// Page index active before the transition.
    pub from_page: i32,
    /// Page index active after the transition.
    pub to_page: i32,
    /// Wall-clock milliseconds since the Unix epoch when the transition completed.
    pub timestamp_ms: u64,
}

/// Payload of `system.api_refresh`, published when something requests the out-of-scope HTTP
/// collaborator refetch the cached user record.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRefreshEvent {
    /// Wall-clock milliseconds since the Unix epoch when the refresh was requested.
    pub timestamp_ms: u64,
    /// What triggered the refresh (a widget id, or a fixed string for periodic refresh).
    pub source: String,
}

/// Payload of `ui.button_pressed`, published by the widget manager for every button click in
/// addition to whatever event the button itself is configured to publish.
#[derive(Clone, Debug, PartialEq)]
pub struct ButtonPressedEvent {
    /// The button's configured ordinal, or `-1` if none was set. Matches §6's wire field name
    /// directly; not the same as the widget's string `id` (see `manager::dispatch_click`).
    pub button_index: i32,
    /// The page the button lives on, or `-1` if not associated with a page.
    pub page: i32,
    /// Wall-clock milliseconds since the Unix epoch when the click was dispatched.
    pub timestamp_ms: u64,
    /// The button's label text, read from its composed text child at dispatch time.
    pub button_text: String,
}

/// Current wall-clock time as milliseconds since the Unix epoch, used to timestamp bus
/// payloads. Falls back to `0` if the system clock is set before the epoch.
pub fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}
