//! Outbound command messages.
//!
//! Commands are fire-and-forget: the client sends one JSON object with an
//! `action` discriminator and infers success only from the next pushed
//! snapshot. Field names match the server's expectations exactly, including
//! the raw `type` key on maintenance payloads.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::SyncError;
use crate::model::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Command {
    AddMachine {
        id_machine: EntityId,
        name_machine: String,
        status_machine: String,
        id_chain: EntityId,
    },
    ModifyMachine {
        id_machine: EntityId,
        name_machine: String,
        status_machine: String,
        id_chain: EntityId,
    },
    DeleteMachine {
        id_machine: EntityId,
    },
    AddMaintenance {
        id_maintenance: EntityId,
        id_machine: EntityId,
        #[serde(rename = "type")]
        kind: String,
        description: String,
        date: String,
        status_maintenance: String,
        technician: String,
    },
    ModifyMaintenance {
        id_maintenance: EntityId,
        id_machine: EntityId,
        #[serde(rename = "type")]
        kind: String,
        description: String,
        date: String,
        status_maintenance: String,
        technician: String,
    },
    DeleteMaintenance {
        id_maintenance: EntityId,
    },
    /// Snapshot refresh request; the server answers any message with a fresh
    /// push, and treats this action as the plain listing query.
    Lister,
}

impl Command {
    /// The wire value of the `action` discriminator.
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Command::AddMachine { .. } => "add_machine",
            Command::ModifyMachine { .. } => "modify_machine",
            Command::DeleteMachine { .. } => "delete_machine",
            Command::AddMaintenance { .. } => "add_maintenance",
            Command::ModifyMaintenance { .. } => "modify_maintenance",
            Command::DeleteMaintenance { .. } => "delete_maintenance",
            Command::Lister => "lister",
        }
    }

    /// Encodes the command as one JSON text frame.
    pub fn encode(&self) -> Result<String, SyncError> {
        serde_json::to_string(self).map_err(|err| SyncError::EncodeCommand(SmolStr::new(err.to_string())))
    }
}
