use super::{deck, GameError, GameService};
use crate::types::*;

/// Deterministic target alternation: odd rounds hunt the Thief, even rounds
/// the Robber. Fixed rule, not random, so a long match stays balanced.
pub fn target_for_round(round: u32) -> Role {
    if round % 2 == 1 {
        Role::Thief
    } else {
        Role::Robber
    }
}

/// Whether every human player has voted to advance past the current result.
/// Bots never vote; they are implicitly ready.
pub(crate) fn all_humans_ready(room: &Room) -> bool {
    room.players
        .iter()
        .filter(|p| !p.is_bot)
        .all(|p| room.ready_players.contains(&p.id))
}

impl GameService {
    /// Host starts the next round.
    ///
    /// With the round budget exhausted this finishes the game instead; no
    /// roles are dealt and the round counter stays put. Otherwise: bump the
    /// counter, deal fresh roles, zero round scores, set the parity target,
    /// and open the guessing phase.
    pub async fn start_round(&self, room_id: &str, requester: &str) -> Result<Room, GameError> {
        let mut room = self.room(room_id).await?;
        Self::require_host(&room, requester)?;

        if room.status == RoomStatus::Finished {
            return Err(GameError::GameFinished);
        }
        if room.turn_state == TurnState::Guessing {
            return Err(GameError::RoundInProgress);
        }
        if room.players.len() != ROOM_SIZE {
            return Err(GameError::WrongPlayerCount);
        }

        if room.current_round >= room.max_rounds {
            tracing::info!(
                %room_id,
                rounds = room.current_round,
                "round budget exhausted, game finished"
            );
            room.finish(FinishReason::Completed);
            return self.persist(room).await;
        }

        let deck = deck::deal();
        room.current_round += 1;
        for (player, role) in room.players.iter_mut().zip(deck) {
            player.current_role = Some(role);
            player.round_score = 0;
        }
        room.round_target = Some(target_for_round(room.current_round));
        room.ready_players.clear();
        room.last_round_result = None;
        room.turn_state = TurnState::Guessing;
        room.status = RoomStatus::Playing;

        tracing::info!(
            %room_id,
            round = room.current_round,
            target = ?room.round_target,
            "round started"
        );
        self.persist(room).await
    }

    /// A player signals readiness to advance past the RESULT phase.
    /// Idempotent: a repeat vote from the same player is a no-op.
    pub async fn mark_ready(&self, room_id: &str, player_id: &str) -> Result<Room, GameError> {
        let mut room = self.room(room_id).await?;

        if room.player(player_id).is_none() {
            return Err(GameError::PlayerNotFound(player_id.to_string()));
        }
        if room.status == RoomStatus::Finished {
            return Err(GameError::GameFinished);
        }
        if room.turn_state != TurnState::Result {
            return Err(GameError::NotAwaitingReady);
        }

        if !room.ready_players.insert(player_id.to_string()) {
            return Ok(room);
        }
        tracing::debug!(%room_id, %player_id, ready = room.ready_players.len(), "ready vote");
        self.persist(room).await
    }
}
