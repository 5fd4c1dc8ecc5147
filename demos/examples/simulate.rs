// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Run the full simulation over a synthetic history.
//!
//! Three users change files in a small project for a simulated minute. Stats are
//! logged every second; set `RUST_LOG`-style verbosity with the second argument
//! (`info`, `debug`, or `trace`).
//!
//! An optional YAML settings file may be passed as the first argument. Missing fields keep
//! their defaults, e.g.
//!
//! ```yaml
//! seed: 3
//! user_speed: 300.0
//! layout:
//!   gravity: 5.0
//!   entry_idle_time: 20.0
//! ```
//!
//! Run:
//! - `cargo run -p sylva_demos --example simulate`
//! - `cargo run -p sylva_demos --example simulate -- settings.yml debug`

use std::error::Error;
use std::fs::File;

use log::{LevelFilter, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use sylva_sim::{Settings, Simulation};
use sylva_tree::{EntryMeta, PathEvent};

const USERS: [&str; 3] = ["ana", "bo", "cy"];
const DIRS: [&str; 6] = [
    "/src/",
    "/src/net/",
    "/src/net/http/",
    "/src/ui/",
    "/docs/",
    "/tests/",
];

fn load_settings(path: Option<&str>) -> Result<Settings, Box<dyn Error>> {
    match path {
        Some(path) => Ok(serde_yaml::from_reader(File::open(path)?)?),
        None => Ok(Settings::default()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    let level = match args.get(2).map(String::as_str) {
        Some("trace") => LevelFilter::Trace,
        Some("debug") => LevelFilter::Debug,
        _ => LevelFilter::Info,
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    let settings = load_settings(args.get(1).map(String::as_str))?;
    info!("settings: {settings:?}");
    let mut sim = Simulation::new(settings);

    let dt = 1.0 / 60.0;
    for frame in 0..3600_usize {
        // One commit every quarter second.
        if frame % 15 == 0 {
            let commit = frame / 15;
            let user = USERS[commit % USERS.len()];
            let dir = DIRS[(commit * 7) % DIRS.len()];
            let path = format!("{dir}file{}.rs", commit % 40);
            let meta = EntryMeta::by(user);
            // Every ninth commit deletes a file; the user walks over and it fades out.
            sim.push_event(if commit % 9 == 8 {
                PathEvent::Remove { path, meta }
            } else {
                PathEvent::Add { path, meta }
            });
        }

        let stats = sim.tick(dt);
        if frame % 60 == 59 {
            info!(
                "t={:.0}s nodes={} entries={} users={} visible={} dir_loops={} user_loops={} partition_depth={}",
                sim.time(),
                stats.nodes,
                stats.entries,
                stats.users,
                stats.visible_nodes,
                stats.dir_inner_loops,
                stats.user_inner_loops,
                stats.partition.depth,
            );
        }
    }

    for (_, user) in sim.users() {
        info!(
            "{} at ({:.0}, {:.0}) with {} actions",
            user.name(),
            user.pos().x,
            user.pos().y,
            user.action_count()
        );
    }
    Ok(())
}
