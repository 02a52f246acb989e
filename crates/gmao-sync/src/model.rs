//! Snapshot data model and decoding.
//!
//! The server pushes the whole application state as one JSON document with
//! five collections: `chains`, `machines`, `equipment`, `maintenance` and
//! `stock`. A document missing any of them is rejected wholesale; fields
//! missing inside individual records decode to empty values and render as
//! blanks.

#![allow(missing_docs)]

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::SyncError;

/// Machine status wire strings the server is known to send, in the order
/// dialogs offer them.
pub const MACHINE_STATUSES: [&str; 3] = ["En fonctionnement", "En maintenance", "En panne"];

/// An entity key as it travels on the wire.
///
/// The server emits chain ids as JSON numbers and machine ids as strings,
/// but accepts every id back as a string. Ids therefore decode from either
/// shape, normalize to their decimal string form, and always serialize as
/// strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EntityId(SmolStr);

impl EntityId {
    #[must_use]
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(SmolStr::new(text.as_ref().trim()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl From<&str> for EntityId {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl Serialize for EntityId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = EntityId;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a string or numeric id")
            }

            fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<EntityId, E> {
                Ok(EntityId::new(value))
            }

            fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<EntityId, E> {
                Ok(EntityId(SmolStr::new(value.to_string())))
            }

            fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<EntityId, E> {
                Ok(EntityId(SmolStr::new(value.to_string())))
            }

            fn visit_f64<E: serde::de::Error>(self, value: f64) -> Result<EntityId, E> {
                if value.fract() == 0.0 && value.abs() < 9e15 {
                    Ok(EntityId(SmolStr::new((value as i64).to_string())))
                } else {
                    Ok(EntityId(SmolStr::new(value.to_string())))
                }
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Display bucket derived from a machine status string. The raw string is
/// rendered verbatim; the tone only drives styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Ok,
    Maintenance,
    Failure,
    Unknown,
}

impl StatusTone {
    #[must_use]
    pub fn of(status: &str) -> Self {
        match status {
            "En fonctionnement" => Self::Ok,
            "En maintenance" => Self::Maintenance,
            "En panne" => Self::Failure,
            _ => Self::Unknown,
        }
    }
}

/// A production line grouping machines.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Chain {
    #[serde(default)]
    pub id_chain: EntityId,
    #[serde(default)]
    pub name_chain: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Machine {
    #[serde(default)]
    pub id_machine: EntityId,
    #[serde(default)]
    pub name_machine: String,
    #[serde(default)]
    pub status_machine: String,
    #[serde(default)]
    pub id_chain: EntityId,
}

impl Machine {
    #[must_use]
    pub fn tone(&self) -> StatusTone {
        StatusTone::of(&self.status_machine)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    #[serde(default)]
    pub id_maintenance: EntityId,
    #[serde(default)]
    pub id_machine: EntityId,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub status_maintenance: String,
    #[serde(default)]
    pub technician: String,
}

/// Loosely-typed record used for the collections the console carries but
/// never edits (equipment, stock).
pub type Record = serde_json::Map<String, serde_json::Value>;

/// The complete server-pushed application state. A new snapshot fully
/// supersedes the old one; there is no field-level merge.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub chains: Vec<Chain>,
    pub machines: Vec<Machine>,
    pub equipment: Vec<Record>,
    pub maintenance: Vec<MaintenanceRecord>,
    pub stock: Vec<Record>,
    /// Optional monotonic sequence number; most server builds send none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

impl Snapshot {
    /// Technician names seen in maintenance records: trimmed, blank names
    /// skipped, deduplicated case-sensitively, first-seen order preserved.
    #[must_use]
    pub fn technicians(&self) -> Vec<String> {
        let mut seen: IndexSet<String> = IndexSet::new();
        for record in &self.maintenance {
            let name = record.technician.trim();
            if name.is_empty() {
                continue;
            }
            seen.insert(name.to_string());
        }
        seen.into_iter().collect()
    }
}

/// Decodes one inbound text frame into a snapshot.
///
/// Fails when the text is not JSON or when any of the five collections is
/// absent or not an array; the error message names the offending field.
pub fn decode_snapshot(text: &str) -> Result<Snapshot, SyncError> {
    serde_json::from_str(text)
        .map_err(|err| SyncError::MalformedSnapshot(SmolStr::new(err.to_string())))
}
