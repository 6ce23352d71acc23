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
//! Command-line surface for the `panelkit` binary.

use clap::Parser;

use crate::config::{BackendKind, Config};

/// Touch-first UI runtime for embedded Linux panels and desktop development hosts.
#[derive(Parser, Debug)]
#[command(name = "panelkit", version, about)]
pub struct Cli {
    /// Additional YAML configuration file to overlay on the built-in defaults.
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,

    /// Single `key=value` override, highest precedence. May be passed more than once.
    #[arg(long = "config-override", value_name = "KEY=VALUE")]
    pub config_override: Vec<String>,

    /// Force a specific display backend instead of auto-selecting.
    #[arg(long = "display-backend", value_enum, default_value = "auto")]
    pub display_backend: CliBackend,

    /// Override the requested surface width, in pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Override the requested surface height, in pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Swap width/height.
    #[arg(long)]
    pub portrait: bool,

    /// Validate a configuration file and exit: 0 if valid, 1 with a message if not.
    #[arg(long = "validate-config", value_name = "FILE")]
    pub validate_config: Option<String>,

    /// Write a default configuration file and exit.
    #[arg(long = "generate-config", value_name = "FILE")]
    pub generate_config: Option<String>,
}

/// Mirrors [`BackendKind`] for `clap`'s `value_enum` derive, which needs a concrete type
/// rather than a `serde`-oriented enum.
#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum CliBackend {
    /// See [`BackendKind::Auto`].
    Auto,
    /// See [`BackendKind::Windowed`].
    Windowed,
    /// See [`BackendKind::Direct`].
    Direct,
}

impl From<CliBackend> for BackendKind {
    fn from(value: CliBackend) -> Self {
        match value {
            CliBackend::Auto => BackendKind::Auto,
            CliBackend::Windowed => BackendKind::Windowed,
            CliBackend::Direct => BackendKind::Direct,
        }
    }
}

impl Cli {
    /// Folds the parsed CLI into a [`Config`], applying `--width`/`--height`/`--portrait` and
    /// every `--config-override` in the order given, after any `--config` overlay has already
    /// been merged in by the caller.
    pub fn apply_to(&self, config: &mut Config) -> Result<(), String> {
        config.display.backend = self.display_backend.into();
        if let Some(width) = self.width {
            config.display.width = width;
        }
        if let Some(height) = self.height {
            config.display.height = height;
        }
        if self.portrait {
            config.apply_portrait();
        }
        for entry in &self.config_override {
            let (key, value) = entry
                .split_once('=')
                .ok_or_else(|| format!("--config-override expects key=value, got {entry}"))?;
            config.apply_override(key, value).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_invocation() {
        let cli = Cli::parse_from(["panelkit"]);
        assert_eq!(cli.display_backend, CliBackend::Auto);
        assert!(cli.config.is_none());
    }

    #[test]
    fn parses_overrides_and_dimensions() {
        let cli = Cli::parse_from([
            "panelkit",
            "--display-backend",
            "direct",
            "--width",
            "800",
            "--portrait",
            "--config-override",
            "ui.colors.background=#112233",
        ]);
        let mut config = Config::default();
        cli.apply_to(&mut config).unwrap();
        assert_eq!(config.display.backend, BackendKind::Direct);
        // width=800 applied, then portrait swaps width/height.
        assert_eq!(config.display.width, 640);
        assert_eq!(config.display.height, 800);
        assert_eq!(config.ui.colors.background, crate::geometry::Color::new(0x11, 0x22, 0x33, 255));
    }

    #[test]
    fn rejects_malformed_override() {
        let cli = Cli::parse_from(["panelkit", "--config-override", "no-equals-sign"]);
        let mut config = Config::default();
        assert!(cli.apply_to(&mut config).is_err());
    }
}
