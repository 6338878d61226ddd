//! The realtime document store seam.
//!
//! The game never talks to a concrete backend directly; it goes through the
//! [`RoomDirectory`] trait so any store with atomic per-document writes and
//! change subscriptions can back it. [`MemoryDirectory`] is the in-process
//! implementation used by tests and the demo binary.

mod memory;

pub use memory::MemoryDirectory;

use crate::types::{Room, RoomId};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Result type for directory operations
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors surfaced by the document store
#[derive(Debug, Clone, thiserror::Error)]
pub enum DirectoryError {
    #[error("room {0} not found")]
    NotFound(RoomId),

    #[error("room {0} already exists")]
    AlreadyExists(RoomId),
}

/// Full-state snapshot delivered to subscribers on every change.
///
/// Subscribers re-derive their entire view from each snapshot; there is no
/// incremental diffing.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    Changed(Room),
    Deleted,
}

/// Contract for a realtime document store holding room documents.
///
/// Writes are atomic per document and validation is the caller's job: the
/// store applies whatever it is given. Per-room delivery to a subscriber is
/// in write order; cross-client latency is unspecified.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Store a new room document. Fails if the id is already taken.
    async fn create(&self, room: Room) -> DirectoryResult<()>;

    /// Fetch the current document.
    async fn get(&self, room_id: &str) -> DirectoryResult<Room>;

    /// Replace the document with a new revision and notify subscribers.
    async fn update(&self, room: Room) -> DirectoryResult<()>;

    /// Remove the document and notify subscribers with [`RoomEvent::Deleted`].
    async fn delete(&self, room_id: &str) -> DirectoryResult<()>;

    /// Subscribe to change notifications for one room.
    async fn subscribe(&self, room_id: &str) -> DirectoryResult<broadcast::Receiver<RoomEvent>>;
}
