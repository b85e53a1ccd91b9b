// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{bail, Context, Result};
use clap::Parser;
use ember_data::builtin_registry;
use ember_data::scene::ResourcePaths;
use ember_runtime::config::CONFIG_FILE;
use ember_runtime::{Engine, EngineConfig, EngineError};
use ember_sync::transport::tcp;
use ember_sync::{RemoteLogger, Role, SyncEndpoint};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Runs the Ember engine, standalone or attached to the editor.
#[derive(Parser, Debug)]
#[command(name = "ember", version, about)]
struct Cli {
    /// Connect to the editor instead of playing the startup scene.
    #[arg(long)]
    editor: bool,
    /// Resource directory. Searched for upwards from the working directory by default.
    #[arg(long, value_name = "DIR")]
    resources: Option<PathBuf>,
    /// Scene to load in standalone mode, overriding `startup_scene`.
    #[arg(long, value_name = "FILE")]
    scene: Option<PathBuf>,
    /// Stop after this many frames.
    #[arg(long, value_name = "N")]
    frames: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let logger = RemoteLogger::new();
    let log_sink = logger.sink();
    logger.install().context("failed to install logger")?;

    let paths = match &cli.resources {
        Some(dir) => ResourcePaths::new(dir.clone()),
        None => ResourcePaths::locate(),
    }
    .context("failed to locate the resource directory")?;
    let config = EngineConfig::load(&paths.config()?.join(CONFIG_FILE))?;

    let registry = Arc::new(builtin_registry());
    let mut engine = Engine::new(config, registry);
    if engine.config().generate_templates {
        engine
            .publish_templates(&paths)
            .context("failed to write variant templates")?;
    }

    if cli.editor {
        let config = engine.config().clone();
        let addr: SocketAddr = config
            .editor_address
            .parse()
            .with_context(|| format!("invalid editor address '{}'", config.editor_address))?;
        let link = tcp::connect(addr, config.connect_attempts, config.retry_interval())
            .map_err(EngineError::from)?;
        let mut endpoint = SyncEndpoint::start(Role::Engine, link).map_err(EngineError::from)?;
        log_sink.attach(endpoint.sender(), config.remote_log_filter());

        if !endpoint.announce(config.announce_attempts, config.retry_interval(), None) {
            return Err(EngineError::HandshakeFailed.into());
        }
        engine = engine.with_link(endpoint);
        if !engine.wait_for_scene(Duration::from_millis(config.scene_wait_ms)) {
            log::warn!("No scene received from the editor; starting empty.");
        }
    } else {
        let scene = match cli.scene {
            Some(scene) => scene,
            None => paths.scenes()?.join(&engine.config().startup_scene),
        };
        if !scene.is_file() {
            bail!("startup scene {} does not exist", scene.display());
        }
        engine.load_scene_file(&scene)?;
        engine.enter_play_mode(false);
    }

    engine.run(cli.frames);
    engine.shutdown();
    Ok(())
}
