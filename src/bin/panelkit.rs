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
//! Entry point: parses the CLI surface, folds config file + overrides into a [`Config`],
//! handles the `--validate-config`/`--generate-config` early-exit modes, and otherwise
//! constructs and runs an [`App`].

use std::process::ExitCode;

use clap::Parser;

use panelkit::cli::Cli;
use panelkit::config::Config;
use panelkit::App;

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if let Some(path) = &cli.generate_config {
        return generate_config(path);
    }
    if let Some(path) = &cli.validate_config {
        return validate_config(path);
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(message) => {
            log::error!("{message}");
            return ExitCode::FAILURE;
        }
    };

    match App::new(config) {
        Ok(mut app) => match app.run() {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                log::error!("panelkit exited with an error: {err}");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            log::error!("failed to start panelkit: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Builds the effective config: built-in defaults, overlaid by `--config` if given, overlaid
/// by `--width`/`--height`/`--portrait`/`--config-override` in that order.
fn load_config(cli: &Cli) -> Result<Config, String> {
    let mut config = Config::default();
    if let Some(path) = &cli.config {
        match std::fs::read_to_string(path) {
            Ok(text) => match Config::from_yaml(&text) {
                Ok(overlay) => config.merge_overlay(overlay),
                Err(e) => {
                    log::warn!("--config {path}: {e}, falling back to built-in defaults");
                }
            },
            Err(e) => {
                log::warn!("--config {path}: {e}, falling back to built-in defaults");
            }
        }
    }
    cli.apply_to(&mut config)?;
    Ok(config)
}

/// `--validate-config <file>`: exit 0 on valid, exit 1 with a message on invalid.
fn validate_config(path: &str) -> ExitCode {
    match std::fs::read_to_string(path) {
        Ok(text) => match Config::from_yaml(&text) {
            Ok(_) => {
                println!("{path}: valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{path}: invalid: {e}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            eprintln!("{path}: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `--generate-config <file>`: write a default configuration and exit.
fn generate_config(path: &str) -> ExitCode {
    let config = Config::default();
    let yaml = match config.to_yaml() {
        Ok(yaml) => yaml,
        Err(e) => {
            eprintln!("failed to serialize default config: {e}");
            return ExitCode::FAILURE;
        }
    };
    match std::fs::write(path, yaml) {
        Ok(()) => {
            println!("wrote default configuration to {path}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("failed to write {path}: {e}");
            ExitCode::FAILURE
        }
    }
}
