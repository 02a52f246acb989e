//! One-shot command sender.
//!
//! Connects, fires a single command, and exits. There is no acknowledgment to
//! wait for; success only means the frame was written.

use gmao_console::config::ConsoleConfig;
use gmao_console::sync_client::SyncClient;
use gmao_sync::{Command, EntityId};

use crate::cli::SendAction;
use crate::style;

pub fn run_send(console_config: &ConsoleConfig, action: &SendAction) -> anyhow::Result<()> {
    let command = build_command(action);
    let mut client = SyncClient::from_config(console_config)?;
    client.connect();
    if !client.is_connected() {
        anyhow::bail!("no connection to {}", client.endpoint().url);
    }
    if !client.send(&command) {
        anyhow::bail!("send failed for '{}'", command.action());
    }
    println!("{}", style::success(format!("Sent {}.", command.action())));
    Ok(())
}

fn build_command(action: &SendAction) -> Command {
    match action {
        SendAction::Lister => Command::Lister,
        SendAction::AddMachine {
            id,
            name,
            status,
            chain,
        } => Command::AddMachine {
            id_machine: EntityId::new(id),
            name_machine: name.clone(),
            status_machine: status.clone(),
            id_chain: EntityId::new(chain),
        },
        SendAction::ModifyMachine {
            id,
            name,
            status,
            chain,
        } => Command::ModifyMachine {
            id_machine: EntityId::new(id),
            name_machine: name.clone(),
            status_machine: status.clone(),
            id_chain: EntityId::new(chain),
        },
        SendAction::DeleteMachine { id } => Command::DeleteMachine {
            id_machine: EntityId::new(id),
        },
        SendAction::AddMaintenance {
            id,
            machine,
            kind,
            description,
            date,
            status,
            technician,
        } => Command::AddMaintenance {
            id_maintenance: EntityId::new(id),
            id_machine: EntityId::new(machine),
            kind: kind.clone(),
            description: description.clone(),
            date: date.clone(),
            status_maintenance: status.clone(),
            technician: technician.clone(),
        },
        SendAction::ModifyMaintenance {
            id,
            machine,
            kind,
            description,
            date,
            status,
            technician,
        } => Command::ModifyMaintenance {
            id_maintenance: EntityId::new(id),
            id_machine: EntityId::new(machine),
            kind: kind.clone(),
            description: description.clone(),
            date: date.clone(),
            status_maintenance: status.clone(),
            technician: technician.clone(),
        },
        SendAction::DeleteMaintenance { id } => Command::DeleteMaintenance {
            id_maintenance: EntityId::new(id),
        },
    }
}
