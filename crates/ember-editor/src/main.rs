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

use anyhow::{Context, Result};
use clap::Parser;
use crossbeam_channel::{never, select, tick, unbounded, Receiver};
use ember_data::scene::{ResourcePaths, VariantLibrary};
use ember_editor::{Command, EditorSession};
use ember_sync::transport::tcp;
use ember_sync::{Role, SyncEndpoint, SyncMessage};
use env_logger::{Builder, Env};
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

/// Waits for an engine and drives it from the terminal.
#[derive(Parser, Debug)]
#[command(name = "ember-editor", version, about)]
struct Cli {
    /// Address the engine connects to.
    #[arg(long, default_value = "127.0.0.1:5557")]
    listen: String,
    /// Resource directory. Searched for upwards from the working directory by default.
    #[arg(long, value_name = "DIR")]
    resources: Option<PathBuf>,
    /// Scene pushed to the engine once it announces itself.
    #[arg(long, value_name = "FILE")]
    scene: Option<PathBuf>,
    /// Seconds to wait for the engine to connect.
    #[arg(long, default_value_t = 60)]
    accept_timeout: u64,
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let paths = match &cli.resources {
        Some(dir) => ResourcePaths::new(dir.clone()),
        None => ResourcePaths::locate(),
    }
    .context("failed to locate the resource directory")?;
    let library = VariantLibrary::load(&paths.variants()?, &paths.requires()?)
        .context("failed to load variant templates")?;
    log::info!("{} prefabs available.", library.prefab_names().count());

    let listener = tcp::listen(cli.listen.as_str())?;
    log::info!("Waiting for an engine on {}...", cli.listen);
    let link = tcp::accept(&listener, Duration::from_secs(cli.accept_timeout))?;
    let endpoint = SyncEndpoint::start(Role::Editor, link)?;

    let mut session = EditorSession::new(endpoint, library);
    if let Some(scene) = &cli.scene {
        session.load_scene(scene)?;
    }

    let mut commands = spawn_console();
    let frame = tick(Duration::from_millis(16));
    loop {
        select! {
            recv(commands) -> line => {
                let Ok(line) = line else {
                    log::debug!("Console closed; still serving the engine.");
                    commands = never();
                    continue;
                };
                match Command::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => {
                        if let Err(e) = command.apply(&mut session) {
                            log::error!("{e}");
                        }
                    }
                    Ok(None) => {}
                    Err(e) => log::warn!("{e}"),
                }
            }
            recv(frame) -> _ => {
                for message in session.pump() {
                    match message {
                        SyncMessage::EngineStarted => {
                            log::info!("Engine connected; sending the scene.");
                            session.push_scene()?;
                        }
                        SyncMessage::EngineShutdown => {
                            session.shutdown();
                            return Ok(());
                        }
                        _ => {}
                    }
                }
                if !session.endpoint().is_link_open() {
                    log::warn!("Engine link closed.");
                    break;
                }
            }
        }
    }

    session.shutdown();
    Ok(())
}

fn spawn_console() -> Receiver<String> {
    let (tx, rx) = unbounded();
    std::thread::Builder::new()
        .name("ember-editor-console".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines().map_while(Result::ok) {
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .ok();
    rx
}
