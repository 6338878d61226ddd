use super::{DirectoryError, DirectoryResult, RoomDirectory, RoomEvent};
use crate::types::{Room, RoomId};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};

/// Buffered events per room before slow subscribers start lagging.
const EVENT_CHANNEL_SIZE: usize = 64;

struct RoomSlot {
    room: Room,
    events: broadcast::Sender<RoomEvent>,
}

/// In-memory [`RoomDirectory`] backed by a `tokio` RwLock.
///
/// All clients in one process share the same instance, which makes it a
/// faithful stand-in for a realtime store in tests: every write is atomic
/// and every subscriber sees every revision in order.
pub struct MemoryDirectory {
    rooms: RwLock<HashMap<RoomId, RoomSlot>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomDirectory for MemoryDirectory {
    async fn create(&self, room: Room) -> DirectoryResult<()> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room.id) {
            return Err(DirectoryError::AlreadyExists(room.id));
        }

        let (events, _rx) = broadcast::channel(EVENT_CHANNEL_SIZE);
        rooms.insert(room.id.clone(), RoomSlot { room, events });
        Ok(())
    }

    async fn get(&self, room_id: &str) -> DirectoryResult<Room> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .map(|slot| slot.room.clone())
            .ok_or_else(|| DirectoryError::NotFound(room_id.to_string()))
    }

    async fn update(&self, room: Room) -> DirectoryResult<()> {
        let mut rooms = self.rooms.write().await;
        let slot = rooms
            .get_mut(&room.id)
            .ok_or_else(|| DirectoryError::NotFound(room.id.clone()))?;

        slot.room = room.clone();
        // No receivers connected is fine.
        let _ = slot.events.send(RoomEvent::Changed(room));
        Ok(())
    }

    async fn delete(&self, room_id: &str) -> DirectoryResult<()> {
        let mut rooms = self.rooms.write().await;
        let slot = rooms
            .remove(room_id)
            .ok_or_else(|| DirectoryError::NotFound(room_id.to_string()))?;

        let _ = slot.events.send(RoomEvent::Deleted);
        Ok(())
    }

    async fn subscribe(&self, room_id: &str) -> DirectoryResult<broadcast::Receiver<RoomEvent>> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .map(|slot| slot.events.subscribe())
            .ok_or_else(|| DirectoryError::NotFound(room_id.to_string()))
    }
}
