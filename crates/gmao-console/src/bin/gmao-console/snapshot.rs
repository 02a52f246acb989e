//! Snapshot dump mode.
//!
//! Connects and prints the first accepted snapshot as pretty JSON. The server
//! pushes one on connection establishment; a `lister` request covers servers
//! that wait to be asked.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use gmao_console::config::ConsoleConfig;
use gmao_console::sync_client::{LinkEvent, SyncClient};
use gmao_sync::{Command, StateStore};

use crate::style;

pub fn run_snapshot(console_config: &ConsoleConfig, timeout_secs: u64) -> anyhow::Result<()> {
    let mut client = SyncClient::from_config(console_config)?;
    let mut store = StateStore::new();
    let received = Rc::new(Cell::new(false));
    let flag = Rc::clone(&received);
    store.subscribe(move |_| flag.set(true));

    client.connect();
    if !client.is_connected() {
        anyhow::bail!("no connection to {}", client.endpoint().url);
    }
    client.send(&Command::Lister);

    let deadline = Instant::now() + Duration::from_secs(timeout_secs);
    while !received.get() && Instant::now() < deadline {
        for link_event in client.pump(&mut store) {
            if let LinkEvent::SnapshotDiscarded { reason } = link_event {
                eprintln!(
                    "{}",
                    style::warning(format!("Discarded inbound snapshot: {reason}"))
                );
            }
        }
        if !client.is_connected() {
            std::thread::sleep(console_config.poll_interval);
        }
    }
    if !received.get() {
        anyhow::bail!(
            "no snapshot within {timeout_secs}s from {}",
            client.endpoint().url
        );
    }
    println!("{}", serde_json::to_string_pretty(store.snapshot())?);
    Ok(())
}
