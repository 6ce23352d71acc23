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
//! Typed runtime configuration. The core crate only ever consumes a [`Config`]; loading it
//! from YAML and applying `--config-override` is the binary entry point's job.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ErrorKind};
use crate::geometry::Color;

/// Which display backend to use.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Probe the environment and pick windowed or direct.
    Auto,
    /// Force the SDL2-backed desktop backend.
    Windowed,
    /// Force the DRM dumb-buffer backend.
    Direct,
}

impl Default for BackendKind {
    fn default() -> Self { BackendKind::Auto }
}

/// Which input source to use.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSourceKind {
    /// Probe alongside the display backend choice.
    Auto,
    /// Host native pointer/keyboard events.
    Native,
    /// Raw evdev multitouch.
    Evdev,
    /// Deterministic scripted source, for tests.
    Mock,
}

impl Default for InputSourceKind {
    fn default() -> Self { InputSourceKind::Auto }
}

/// `display.*` configuration keys.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Requested surface width in pixels.
    pub width: u32,
    /// Requested surface height in pixels.
    pub height: u32,
    /// Run fullscreen (windowed backend only).
    pub fullscreen: bool,
    /// Request vsync from the backend.
    pub vsync: bool,
    /// Which backend to use.
    pub backend: BackendKind,
}

impl Default for DisplayConfig {
    fn default() -> Self { Self { width: 480, height: 640, fullscreen: false, vsync: true, backend: BackendKind::default() } }
}

/// `input.*` configuration keys.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Which input source to use.
    pub source: InputSourceKind,
    /// Explicit device node path; empty means auto-detect.
    pub device_path: String,
    /// Whether the evdev source should scan for a device rather than require `device_path`.
    pub auto_detect_devices: bool,
    /// Mirror mouse motion/clicks to synthetic finger events on the native source.
    pub mouse_emulation: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self { source: InputSourceKind::default(), device_path: String::new(), auto_detect_devices: true, mouse_emulation: false }
    }
}

/// `ui.colors.*` configuration keys.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UiColorsConfig {
    /// Parsed from a `#RRGGBB` hex string; invalid strings fall back to the default.
    #[serde(with = "hex_color")]
    pub background: Color,
}

impl Default for UiColorsConfig {
    fn default() -> Self { Self { background: Color::new(0x1e, 0x1e, 0x28, 255) } }
}

mod hex_color {
    use super::Color;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::from_hex(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid hex color: {raw}")))
    }
}

/// `ui.fonts.*` configuration keys.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UiFontsConfig {
    /// Point size for body text.
    pub regular_size: u32,
    /// Point size for titles.
    pub large_size: u32,
    /// Point size for captions/debug labels.
    pub small_size: u32,
}

impl Default for UiFontsConfig {
    fn default() -> Self { Self { regular_size: 18, large_size: 28, small_size: 13 } }
}

/// `ui.*` configuration keys.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// `ui.colors.*`.
    pub colors: UiColorsConfig,
    /// `ui.fonts.*`.
    pub fonts: UiFontsConfig,
}

/// `api.*` configuration keys, consumed by the out-of-scope HTTP collaborator.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Request timeout, in milliseconds.
    pub default_timeout_ms: u64,
    /// Retry attempts before giving up.
    pub default_retry_count: u32,
    /// Delay between retries, in milliseconds.
    pub default_retry_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self { Self { default_timeout_ms: 5000, default_retry_count: 3, default_retry_delay_ms: 500 } }
}

/// The fully resolved, typed runtime configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `display.*`.
    pub display: DisplayConfig,
    /// `input.*`.
    pub input: InputConfig,
    /// `ui.*`.
    pub ui: UiConfig,
    /// `api.*`.
    pub api: ApiConfig,
}

impl Config {
    /// Parses a YAML document into a `Config`. Unknown keys are ignored; missing keys take
    /// their `Default` value via `#[serde(default)]` on every nested record.
    pub fn from_yaml(text: &str) -> CoreResult<Config> {
        serde_yaml2::from_str(text).map_err(|e| CoreError::new(ErrorKind::Parse, format!("config::from_yaml: {e}")))
    }

    /// Serializes to YAML, used by `--generate-config`.
    pub fn to_yaml(&self) -> CoreResult<String> {
        serde_yaml2::to_string(self).map_err(|e| CoreError::new(ErrorKind::Parse, format!("config::to_yaml: {e}")))
    }

    /// Merges `other` on top of `self` in place. Every field of `other` wins; there is no
    /// per-field "was this explicitly set" tracking, so an overlay document should normally
    /// be produced by `--generate-config` and trimmed down to the keys actually being
    /// overridden, rather than hand-written from scratch.
    pub fn merge_overlay(&mut self, other: Config) { *self = other; }

    /// Applies a single `key=value` override, as accepted by `--config-override`.
    ///
    /// Recognizes the dotted key paths documented in the configuration keys list
    /// (`display.width`, `ui.colors.background`, ...). Unknown keys or unparsable values are
    /// an [`ErrorKind::InvalidArgument`] error; the caller is expected to warn and continue
    /// with the prior value rather than abort the whole config load.
    pub fn apply_override(&mut self, key: &str, value: &str) -> CoreResult<()> {
        let err = || CoreError::new(ErrorKind::InvalidArgument, format!("config::apply_override: {key}"));
        match key {
            "display.width" => self.display.width = value.parse().map_err(|_| err())?,
            "display.height" => self.display.height = value.parse().map_err(|_| err())?,
            "display.fullscreen" => self.display.fullscreen = value.parse().map_err(|_| err())?,
            "display.vsync" => self.display.vsync = value.parse().map_err(|_| err())?,
            "display.backend" => {
                self.display.backend = match value {
                    "auto" => BackendKind::Auto,
                    "windowed" => BackendKind::Windowed,
                    "direct" => BackendKind::Direct,
                    _ => return Err(err()),
                }
            }
            "input.source" => {
                self.input.source = match value {
                    "auto" => InputSourceKind::Auto,
                    "native" => InputSourceKind::Native,
                    "evdev" => InputSourceKind::Evdev,
                    "mock" => InputSourceKind::Mock,
                    _ => return Err(err()),
                }
            }
            "input.device_path" => self.input.device_path = value.to_string(),
            "input.auto_detect_devices" => self.input.auto_detect_devices = value.parse().map_err(|_| err())?,
            "input.mouse_emulation" => self.input.mouse_emulation = value.parse().map_err(|_| err())?,
            "ui.colors.background" => self.ui.colors.background = Color::from_hex(value).ok_or_else(err)?,
            "ui.fonts.regular_size" => self.ui.fonts.regular_size = value.parse().map_err(|_| err())?,
            "ui.fonts.large_size" => self.ui.fonts.large_size = value.parse().map_err(|_| err())?,
            "ui.fonts.small_size" => self.ui.fonts.small_size = value.parse().map_err(|_| err())?,
            "api.default_timeout_ms" => self.api.default_timeout_ms = value.parse().map_err(|_| err())?,
            "api.default_retry_count" => self.api.default_retry_count = value.parse().map_err(|_| err())?,
            "api.default_retry_delay_ms" => self.api.default_retry_delay_ms = value.parse().map_err(|_| err())?,
            _ => return Err(err()),
        }
        Ok(())
    }

    /// Swaps width/height, as `--portrait` requests.
    pub fn apply_portrait(&mut self) {
        std::mem::swap(&mut self.display.width, &mut self.display.height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_fallbacks() {
        let cfg = Config::default();
        assert_eq!(cfg.display.width, 480);
        assert_eq!(cfg.display.height, 640);
        assert_eq!(cfg.input.source, InputSourceKind::Auto);
        assert_eq!(cfg.api.default_retry_count, 3);
    }

    #[test]
    fn yaml_round_trips() {
        let cfg = Config::default();
        let yaml = cfg.to_yaml().unwrap();
        let parsed = Config::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.display.width, cfg.display.width);
        assert_eq!(parsed.ui.colors.background, cfg.ui.colors.background);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let cfg = Config::from_yaml("display:\n  width: 800\n").unwrap();
        assert_eq!(cfg.display.width, 800);
        assert_eq!(cfg.display.height, 640);
        assert_eq!(cfg.api.default_timeout_ms, 5000);
    }

    #[test]
    fn override_parses_dotted_keys() {
        let mut cfg = Config::default();
        cfg.apply_override("display.width", "800").unwrap();
        cfg.apply_override("ui.colors.background", "#ff0000").unwrap();
        cfg.apply_override("display.backend", "direct").unwrap();
        assert_eq!(cfg.display.width, 800);
        assert_eq!(cfg.ui.colors.background, Color::new(0xff, 0, 0, 255));
        assert_eq!(cfg.display.backend, BackendKind::Direct);

        assert!(cfg.apply_override("nonsense.key", "x").is_err());
        assert!(cfg.apply_override("display.backend", "bogus").is_err());
    }

    #[test]
    fn portrait_swaps_dimensions() {
        let mut cfg = Config::default();
        cfg.apply_portrait();
        assert_eq!(cfg.display.width, 640);
        assert_eq!(cfg.display.height, 480);
    }
}
