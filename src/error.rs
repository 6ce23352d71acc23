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
//! Error taxonomy, the thread-local "last error" diagnostic slot, and the
//! severity-tagged notification channel a UI collaborator drains to show failures.

use std::cell::RefCell;
use std::time::Duration;

/// The distinguished error kinds the core recognizes, per the error handling design.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A caller-supplied argument was invalid (empty name, non-positive size, ...).
    InvalidArgument,
    /// An allocation failed. Always fatal.
    OutOfMemory,
    /// A lookup found nothing for the given key.
    NotFound,
    /// An attempt to create something that already exists.
    AlreadyExists,
    /// An operation was attempted in a state that does not permit it.
    InvalidState,
    /// A bounded collection (bus handler list) is at capacity.
    QueueFull,
    /// Rendering a frame failed.
    RenderFailed,
    /// A display backend failed to initialize.
    DisplayInitFailed,
    /// A previously initialized display backend has disconnected.
    DisplayDisconnected,
    /// An input device could not be opened or is no longer available.
    InputDeviceUnavailable,
    /// A privileged operation (DRM master, device open) was denied.
    PermissionDenied,
    /// An operation exceeded its deadline.
    Timeout,
    /// A network-facing collaborator reported a transport failure.
    Network,
    /// A parse of structured input (config, payload) failed.
    Parse,
    /// A filesystem or device I/O operation failed.
    Io,
}

impl ErrorKind {
    /// Maps a kind onto the severity a notification should be rendered at, per §7's
    /// "severity is derived from code" rule.
    pub fn severity(self) -> Severity {
        match self {
            ErrorKind::InvalidArgument => Severity::Warning,
            ErrorKind::Network => Severity::Warning,
            ErrorKind::OutOfMemory => Severity::Critical,
            ErrorKind::DisplayInitFailed | ErrorKind::DisplayDisconnected => Severity::Critical,
            _ => Severity::Error,
        }
    }

    /// Returns `true` if this kind is defined as fatal (exit for supervisor restart) rather
    /// than recoverable or merely surfaced to the caller.
    pub fn is_fatal(self) -> bool {
        matches!(self, ErrorKind::DisplayDisconnected | ErrorKind::OutOfMemory | ErrorKind::PermissionDenied)
    }
}

/// A structured error carrying both a [`ErrorKind`] and a short diagnostic context string
/// (typically `"function_name: key or id involved"`).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind:?}: {context}")]
pub struct CoreError {
    /// Which distinguished error kind occurred.
    pub kind: ErrorKind,
    /// Short diagnostic context: function name, key/id involved.
    pub context: String,
}

impl CoreError {
    /// Builds an error and records it in the thread-local last-error slot, matching the
    /// "regardless of whether the caller inspects it" propagation rule in §7.
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        let err = Self { kind, context: context.into() };
        LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(err.clone()));
        err
    }
}

/// Result alias used throughout the core for fallible operations.
pub type CoreResult<T> = Result<T, CoreError>;

thread_local! {
    static LAST_ERROR: RefCell<Option<CoreError>> = const { RefCell::new(None) };
}

/// Returns a copy of the most recent error recorded on this thread via [`CoreError::new`],
/// as a diagnostic aid independent of whatever the caller did with the `Result`.
pub fn last_error() -> Option<CoreError> { LAST_ERROR.with(|slot| slot.borrow().clone()) }

/// Severity a notification is rendered at.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational, does not need the user's attention.
    Info,
    /// A recoverable problem occurred; surfaced but not alarming.
    Warning,
    /// An operation failed outright.
    Error,
    /// A fault that will likely end the process.
    Critical,
}

/// A single user-visible failure record, pushed onto the notification channel.
#[derive(Clone, Debug)]
pub struct Notification {
    /// The error kind that produced this notification.
    pub code: ErrorKind,
    /// Derived severity.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Suggested on-screen display duration; collaborators are free to coalesce.
    pub duration_hint: Duration,
}

impl Notification {
    /// Builds a notification from an error, deriving severity from its kind.
    pub fn from_error(err: &CoreError) -> Self {
        Self {
            code: err.kind,
            severity: err.kind.severity(),
            message: err.context.clone(),
            duration_hint: default_duration_for(err.kind.severity()),
        }
    }
}

fn default_duration_for(severity: Severity) -> Duration {
    match severity {
        Severity::Info => Duration::from_secs(2),
        Severity::Warning => Duration::from_secs(4),
        Severity::Error => Duration::from_secs(6),
        Severity::Critical => Duration::from_secs(10),
    }
}

/// Bounded channel of [`Notification`]s. The application loop drains it once per frame and
/// republishes each entry on the reserved `system.notification` bus name so that any UI
/// collaborator subscribed to it can render the failure surface.
pub struct NotificationChannel {
    sender: std::sync::mpsc::SyncSender<Notification>,
    receiver: std::sync::mpsc::Receiver<Notification>,
}

impl NotificationChannel {
    /// Creates a channel with the given bound; overflow drops the oldest-style producer call
    /// (the sender simply fails and the caller logs and proceeds, never blocking the UI
    /// thread on a full notification queue).
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = std::sync::mpsc::sync_channel(capacity.max(1));
        Self { sender, receiver }
    }

    /// Returns a cloneable handle producers can push notifications through.
    pub fn sender(&self) -> std::sync::mpsc::SyncSender<Notification> { self.sender.clone() }

    /// Drains all notifications currently queued without blocking.
    pub fn drain(&self) -> Vec<Notification> { self.receiver.try_iter().collect() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_follows_code() {
        assert_eq!(ErrorKind::InvalidArgument.severity(), Severity::Warning);
        assert_eq!(ErrorKind::Network.severity(), Severity::Warning);
        assert_eq!(ErrorKind::OutOfMemory.severity(), Severity::Critical);
        assert_eq!(ErrorKind::DisplayDisconnected.severity(), Severity::Critical);
        assert_eq!(ErrorKind::NotFound.severity(), Severity::Error);
    }

    #[test]
    fn last_error_is_recorded_regardless_of_inspection() {
        let _ = CoreError::new(ErrorKind::QueueFull, "subscribe: weather.temperature");
        let last = last_error().expect("an error was recorded");
        assert_eq!(last.kind, ErrorKind::QueueFull);
        assert_eq!(last.context, "subscribe: weather.temperature");
    }

    #[test]
    fn notification_channel_drains_without_blocking() {
        let chan = NotificationChannel::new(4);
        let err = CoreError::new(ErrorKind::RenderFailed, "render_root: page-manager");
        chan.sender().try_send(Notification::from_error(&err)).unwrap();
        let drained = chan.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].severity, Severity::Error);
    }
}
