//! Room snapshot export for backup and audit dumps.
//!
//! The room document already serializes flat; this wraps it with a schema
//! version and export timestamp so a dump taken today can be sanity-checked
//! before being restored later.

use crate::types::{Room, ROOM_SIZE};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Schema version for export format compatibility
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

/// A serializable snapshot of one room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomExport {
    /// Schema version for forward compatibility
    pub schema_version: u32,
    /// Export timestamp (ISO8601)
    pub exported_at: String,
    /// Application namespace the room lives under
    pub app_id: String,
    pub room: Room,
}

impl RoomExport {
    pub fn new(app_id: &str, room: Room) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: chrono::Utc::now().to_rfc3339(),
            app_id: app_id.to_string(),
            room,
        }
    }

    /// Validate the export before import
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version > EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Export schema version {} is newer than supported version {}.",
                self.schema_version, EXPORT_SCHEMA_VERSION
            ));
        }

        if self.room.players.len() > ROOM_SIZE {
            return Err(format!(
                "Room holds {} players but the maximum is {}",
                self.room.players.len(),
                ROOM_SIZE
            ));
        }

        // When roles are assigned, each of the four roles appears exactly once.
        let assigned: Vec<_> = self
            .room
            .players
            .iter()
            .filter_map(|p| p.current_role)
            .collect();
        if !assigned.is_empty() {
            let unique: HashSet<_> = assigned.iter().collect();
            if assigned.len() != self.room.players.len() || unique.len() != assigned.len() {
                return Err("Role assignment is not a one-role-per-player deal".to_string());
            }
        }

        // History is round-ordered and never runs ahead of the counter.
        for (i, entry) in self.room.round_history.iter().enumerate() {
            if entry.round != i as u32 + 1 {
                return Err(format!(
                    "History entry {} records round {}, expected {}",
                    i,
                    entry.round,
                    i + 1
                ));
            }
            if entry.round > self.room.current_round {
                return Err(format!(
                    "History records round {} beyond current round {}",
                    entry.round, self.room.current_round
                ));
            }
        }

        Ok(())
    }
}
