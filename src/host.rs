//! Host coordinator: the host's process doubles as the authoritative
//! executor for shared transitions.
//!
//! Two jobs, both driven purely by observed state snapshots so they can be
//! tested without any UI: issuing the accusation when a bot holds the
//! Police seat, and starting the next round once every human has voted
//! ready. Both re-check preconditions against a fresh snapshot after their
//! delay and silently discard stale decisions.

use crate::state::GameService;
use crate::store::RoomEvent;
use crate::types::{PlayerId, Role, Room, RoomStatus, TurnState};
use rand::Rng;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

/// Bot accusation policy: pick uniformly among everyone who is neither the
/// bot itself nor the King. Returns `None` only on malformed state.
pub fn choose_bot_target(room: &Room, police_id: &str) -> Option<PlayerId> {
    let candidates: Vec<&str> = room
        .players
        .iter()
        .filter(|p| p.id != police_id && p.current_role != Some(Role::King))
        .map(|p| p.id.as_str())
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let idx = rand::rng().random_range(0..candidates.len());
    Some(candidates[idx].to_string())
}

/// Spawn the coordinator task for one room. Runs until the room is deleted
/// or its event stream closes. Only ever started on the host's process.
pub fn spawn_host_coordinator(
    service: Arc<GameService>,
    room_id: String,
    host_id: String,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut events = match service.subscribe(&room_id).await {
            Ok(rx) => rx,
            Err(e) => {
                tracing::warn!(%room_id, error = %e, "coordinator could not subscribe");
                return;
            }
        };

        // Act on the current snapshot first; events only arrive on change.
        let mut snapshot = match service.room(&room_id).await {
            Ok(room) => Some(room),
            Err(_) => None,
        };

        loop {
            let room = match snapshot.take() {
                Some(room) => room,
                None => match events.recv().await {
                    Ok(RoomEvent::Changed(room)) => room,
                    Ok(RoomEvent::Deleted) => {
                        tracing::info!(%room_id, "room deleted, coordinator stopping");
                        return;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(%room_id, skipped, "coordinator lagged, refetching");
                        match service.room(&room_id).await {
                            Ok(room) => room,
                            Err(_) => return,
                        }
                    }
                    Err(RecvError::Closed) => return,
                },
            };

            if room.status != RoomStatus::Playing {
                continue;
            }

            match room.turn_state {
                TurnState::Guessing => {
                    let police = match room.police() {
                        Some(p) if p.is_bot => p.clone(),
                        _ => continue,
                    };
                    let round = room.current_round;
                    let instance = room.game_instance_id.clone();

                    tokio::time::sleep(service.config().bot_delay).await;

                    // The room may have moved on while the bot was "thinking".
                    let fresh = match service.room(&room_id).await {
                        Ok(r) => r,
                        Err(_) => return,
                    };
                    if fresh.turn_state != TurnState::Guessing
                        || fresh.current_round != round
                        || fresh.game_instance_id != instance
                    {
                        tracing::debug!(%room_id, round, "stale bot decision discarded");
                        continue;
                    }

                    if let Some(target) = choose_bot_target(&fresh, &police.id) {
                        match service.accuse(&room_id, &host_id, &target).await {
                            Ok(_) => {
                                tracing::info!(%room_id, bot = %police.name, %target, "bot police accused")
                            }
                            Err(e) => {
                                tracing::debug!(%room_id, error = %e, "bot accusation no-op")
                            }
                        }
                    }
                }
                TurnState::Result => {
                    if !crate::state::all_humans_ready(&room) {
                        continue;
                    }
                    let round = room.current_round;

                    tokio::time::sleep(service.config().advance_delay).await;

                    let fresh = match service.room(&room_id).await {
                        Ok(r) => r,
                        Err(_) => return,
                    };
                    if fresh.status != RoomStatus::Playing
                        || fresh.turn_state != TurnState::Result
                        || fresh.current_round != round
                        || !crate::state::all_humans_ready(&fresh)
                    {
                        continue;
                    }

                    match service.start_round(&room_id, &host_id).await {
                        Ok(next) => tracing::info!(
                            %room_id,
                            round = next.current_round,
                            status = ?next.status,
                            "auto-advanced after ready votes"
                        ),
                        Err(e) => tracing::debug!(%room_id, error = %e, "auto-advance no-op"),
                    }
                }
                TurnState::Idle => {}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Player, DEFAULT_MAX_ROUNDS};

    fn playing_room() -> Room {
        let mut room = Room::new("AB12".to_string(), "host-1", "Babu", DEFAULT_MAX_ROUNDS);
        room.players.push(Player::bot("Terminator"));
        room.players.push(Player::bot("RoboCop"));
        room.players.push(Player::bot("Wall-E"));
        room.players[0].current_role = Some(Role::King);
        room.players[1].current_role = Some(Role::Police);
        room.players[2].current_role = Some(Role::Robber);
        room.players[3].current_role = Some(Role::Thief);
        room.status = RoomStatus::Playing;
        room.turn_state = TurnState::Guessing;
        room.round_target = Some(Role::Thief);
        room.current_round = 1;
        room
    }

    #[test]
    fn test_bot_never_targets_itself_or_the_king() {
        let room = playing_room();
        let police_id = room.players[1].id.clone();

        for _ in 0..100 {
            let target = choose_bot_target(&room, &police_id).unwrap();
            assert_ne!(target, police_id);
            assert_ne!(target, room.players[0].id, "the King is never accused");
        }
    }

    #[test]
    fn test_no_candidates_yields_none() {
        let mut room = playing_room();
        let police_id = room.players[1].id.clone();
        room.players.retain(|p| p.id == police_id || p.current_role == Some(Role::King));

        assert!(choose_bot_target(&room, &police_id).is_none());
    }
}
