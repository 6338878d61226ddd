//! The game session state machine.
//!
//! Every transition is a precondition-checked function over the room
//! document: load the current revision, validate, mutate a copy, persist.
//! Nothing is written when a precondition fails, so failures never require
//! rollback. Concurrency control is the single-writer convention: host-only
//! transitions (round start, bot accusations, restart, roster edits) are
//! only ever initiated by the host's process, and player-scoped ones
//! (own accuse, own ready vote, own join/leave) are idempotent or guarded.

mod deck;
mod room;
mod round;
mod score;

pub mod export;

pub use deck::deal;
pub use round::target_for_round;
pub use score::{resolve, RoundOutcome};

pub(crate) use round::all_humans_ready;

use crate::config::GameConfig;
use crate::store::{DirectoryError, RoomDirectory, RoomEvent};
use crate::types::{Role, Room};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Errors produced by game transitions. Validation variants carry the
/// user-visible message describing the violated constraint.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("player {0} not found in room")]
    PlayerNotFound(String),

    #[error("only the host can do that")]
    NotHost,

    #[error("room is full (max 4)")]
    RoomFull,

    #[error("game in progress")]
    GameInProgress,

    #[error("game is finished")]
    GameFinished,

    #[error("need exactly 4 players")]
    WrongPlayerCount,

    #[error("rounds must be between 5 and 200")]
    RoundsOutOfRange,

    #[error("round already in progress")]
    RoundInProgress,

    #[error("no accusation allowed right now")]
    NotGuessing,

    #[error("round is not awaiting ready votes")]
    NotAwaitingReady,

    #[error("only the police can accuse")]
    NotPolice,

    #[error("{} is never a hunt target", .0.display_name())]
    InvalidHuntTarget(Role),

    #[error("roles have not been dealt")]
    RolesNotDealt,

    #[error("the host cannot kick themselves")]
    KickSelf,

    #[error("could not allocate an unused room code")]
    CodesExhausted,

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// The session service: all transitions live on this type, split across the
/// submodules of `state`. Holds the store handle and the runtime config.
pub struct GameService {
    store: Arc<dyn RoomDirectory>,
    config: GameConfig,
}

impl GameService {
    pub fn new(store: Arc<dyn RoomDirectory>, config: GameConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current revision of a room document.
    pub async fn room(&self, room_id: &str) -> Result<Room, GameError> {
        Ok(self.store.get(room_id).await?)
    }

    /// Change notifications for one room.
    pub async fn subscribe(
        &self,
        room_id: &str,
    ) -> Result<broadcast::Receiver<RoomEvent>, GameError> {
        Ok(self.store.subscribe(room_id).await?)
    }

    pub(crate) fn store(&self) -> &Arc<dyn RoomDirectory> {
        &self.store
    }

    /// Write a new room revision and hand it back to the caller.
    pub(crate) async fn persist(&self, room: Room) -> Result<Room, GameError> {
        self.store.update(room.clone()).await?;
        Ok(room)
    }

    pub(crate) fn require_host(room: &Room, requester: &str) -> Result<(), GameError> {
        if room.is_host(requester) {
            Ok(())
        } else {
            Err(GameError::NotHost)
        }
    }
}
