//! Common test utilities for videos-dl integration tests

#![allow(dead_code)]

use std::path::Path;
use videos_dl::{Config, Event, EventLog, Position};

/// Configuration reading link lists from `root` and writing to `root/downloads`
pub fn config_in(root: &Path) -> Config {
    let mut config = Config::default();
    config.download.input_dir = root.to_path_buf();
    config.download.download_dir = root.join("downloads");
    config
}

/// Write a link list file into `root`
pub fn write_list(root: &Path, name: &str, links: &[&str]) {
    let mut content = links.join("\n");
    content.push('\n');
    std::fs::write(root.join(name), content).expect("write link list");
}

/// Counter positions of every finished link, in order
pub fn finished_positions(log: &EventLog) -> Vec<Position> {
    log.events
        .iter()
        .filter_map(|e| match e {
            Event::Complete { position, .. } | Event::Skipped { position, .. } => Some(*position),
            _ => None,
        })
        .collect()
}
