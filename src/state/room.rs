use super::{GameError, GameService};
use crate::store::{DirectoryError, RoomDirectory};
use crate::types::*;
use rand::Rng;

/// Room codes: 4 uppercase alphanumeric characters.
const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 4;

/// Collision on create is astronomically unlikely but retryable.
const CREATE_ATTEMPTS: usize = 5;

fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

impl GameService {
    /// Create a fresh lobby with the requester as host and sole player.
    pub async fn create_room(&self, host_id: &str, name: &str) -> Result<Room, GameError> {
        for _ in 0..CREATE_ATTEMPTS {
            let room = Room::new(
                generate_room_code(),
                host_id,
                name,
                self.config().default_max_rounds,
            );
            match self.store().create(room.clone()).await {
                Ok(()) => {
                    tracing::info!(room_id = %room.id, %host_id, "room created");
                    return Ok(room);
                }
                Err(DirectoryError::AlreadyExists(code)) => {
                    tracing::debug!(room_id = %code, "room code collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(GameError::CodesExhausted)
    }

    /// Join a lobby. Rejoining with a known id is a no-op in any status,
    /// so a reconnecting player never gets an error.
    pub async fn join_room(
        &self,
        room_id: &str,
        player_id: &str,
        name: &str,
    ) -> Result<Room, GameError> {
        let mut room = self.room(room_id).await?;

        if room.player(player_id).is_some() {
            return Ok(room);
        }
        if room.status != RoomStatus::Lobby {
            return Err(GameError::GameInProgress);
        }
        if room.players.len() >= ROOM_SIZE {
            return Err(GameError::RoomFull);
        }

        room.players.push(Player::human(player_id, name));
        tracing::info!(
            %room_id,
            %player_id,
            players = room.players.len(),
            "player joined"
        );
        self.persist(room).await
    }

    /// Host adds a bot to the lobby, named from the fixed pool (first unused
    /// name wins, falling back to a numbered one).
    pub async fn add_bot(&self, room_id: &str, requester: &str) -> Result<Room, GameError> {
        let mut room = self.room(room_id).await?;
        Self::require_host(&room, requester)?;

        if room.status != RoomStatus::Lobby {
            return Err(GameError::GameInProgress);
        }
        if room.players.len() >= ROOM_SIZE {
            return Err(GameError::RoomFull);
        }

        let name = BOT_NAMES
            .iter()
            .find(|candidate| !room.players.iter().any(|p| p.name == **candidate))
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("Bot {}", room.players.len() + 1));

        let bot = Player::bot(&name);
        tracing::info!(%room_id, bot_id = %bot.id, bot_name = %bot.name, "bot added");
        room.players.push(bot);
        self.persist(room).await
    }

    /// Host removes a player. In the lobby this is a plain roster edit
    /// (how bots are removed); mid-game it abandons the game for everyone,
    /// exactly like a self-initiated leave.
    pub async fn kick_player(
        &self,
        room_id: &str,
        requester: &str,
        target_id: &str,
    ) -> Result<Room, GameError> {
        let mut room = self.room(room_id).await?;
        Self::require_host(&room, requester)?;

        if target_id == room.host_id {
            return Err(GameError::KickSelf);
        }
        if room.player(target_id).is_none() {
            return Err(GameError::PlayerNotFound(target_id.to_string()));
        }

        room.players.retain(|p| p.id != target_id);
        room.ready_players.remove(target_id);

        if room.status != RoomStatus::Lobby {
            tracing::info!(%room_id, %target_id, "player kicked mid-game, abandoning");
            room.finish(FinishReason::Abandoned);
        } else {
            tracing::info!(%room_id, %target_id, "player kicked from lobby");
        }
        self.persist(room).await
    }

    /// Host sets the round count while in the lobby. Legal range [5, 200].
    pub async fn set_max_rounds(
        &self,
        room_id: &str,
        requester: &str,
        value: u32,
    ) -> Result<Room, GameError> {
        let mut room = self.room(room_id).await?;
        Self::require_host(&room, requester)?;

        if room.status != RoomStatus::Lobby {
            return Err(GameError::GameInProgress);
        }
        if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&value) {
            return Err(GameError::RoundsOutOfRange);
        }

        room.max_rounds = value;
        self.persist(room).await
    }

    /// A player leaves on their own.
    ///
    /// In the lobby this is a roster edit, except the host leaving destroys
    /// the room entirely (returns `None`). Mid-game any departure abandons
    /// the game for everyone; nobody plays short-handed.
    pub async fn leave(&self, room_id: &str, player_id: &str) -> Result<Option<Room>, GameError> {
        let mut room = self.room(room_id).await?;

        if room.player(player_id).is_none() {
            return Err(GameError::PlayerNotFound(player_id.to_string()));
        }

        if room.status == RoomStatus::Lobby {
            if room.is_host(player_id) {
                self.store().delete(room_id).await?;
                tracing::info!(%room_id, "host left the lobby, room deleted");
                return Ok(None);
            }
            room.players.retain(|p| p.id != player_id);
            tracing::info!(%room_id, %player_id, "player left the lobby");
            return self.persist(room).await.map(Some);
        }

        room.players.retain(|p| p.id != player_id);
        room.ready_players.remove(player_id);
        room.finish(FinishReason::Abandoned);
        tracing::info!(%room_id, %player_id, "player left mid-game, abandoning");
        self.persist(room).await.map(Some)
    }

    /// Host resets the room back to a fresh lobby: scores zeroed, roles and
    /// history cleared, and a new game instance id minted.
    pub async fn restart(&self, room_id: &str, requester: &str) -> Result<Room, GameError> {
        let mut room = self.room(room_id).await?;
        Self::require_host(&room, requester)?;

        for p in &mut room.players {
            p.total_score = 0;
            p.round_score = 0;
            p.current_role = None;
        }
        room.current_round = 0;
        room.status = RoomStatus::Lobby;
        room.turn_state = TurnState::Idle;
        room.round_target = None;
        room.last_round_result = None;
        room.round_history.clear();
        room.ready_players.clear();
        room.finish_reason = None;
        room.finished_at = None;
        room.game_instance_id = ulid::Ulid::new().to_string();

        tracing::info!(%room_id, instance = %room.game_instance_id, "game restarted");
        self.persist(room).await
    }
}
