use super::{GameError, GameService};
use crate::types::*;
use std::collections::HashMap;

/// Outcome of resolving one accusation against the scoring rules.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub success: bool,
    pub scores: HashMap<PlayerId, u32>,
    pub message: String,
}

/// Resolve an accusation. Pure: computes the per-player round scores and the
/// result message without touching any state.
///
/// Fixed point values: the King always scores 10. A correct accusation pays
/// the Police 8 and zeroes the caught criminal; everyone else keeps their
/// role's base value. A wrong accusation zeroes the Police instead and both
/// criminals escape with their base value.
pub fn resolve(
    players: &[Player],
    required_role: Role,
    accused_id: &str,
) -> Result<RoundOutcome, GameError> {
    if !required_role.is_criminal() {
        return Err(GameError::InvalidHuntTarget(required_role));
    }

    let accused = players
        .iter()
        .find(|p| p.id == accused_id)
        .ok_or_else(|| GameError::PlayerNotFound(accused_id.to_string()))?;
    let accused_role = accused.current_role.ok_or(GameError::RolesNotDealt)?;

    let success = accused_role == required_role;
    let message = if success {
        format!(
            "Success! Police caught the {}.",
            required_role.display_name()
        )
    } else {
        format!(
            "Failed! Police accused {} ({}).",
            accused.name,
            accused_role.display_name()
        )
    };

    let mut scores = HashMap::new();
    for player in players {
        let role = player.current_role.ok_or(GameError::RolesNotDealt)?;
        let score = match role {
            Role::King => Role::King.points(),
            Role::Police => {
                if success {
                    Role::Police.points()
                } else {
                    0
                }
            }
            criminal => {
                if success && criminal == required_role {
                    0
                } else {
                    criminal.points()
                }
            }
        };
        scores.insert(player.id.clone(), score);
    }

    Ok(RoundOutcome {
        success,
        scores,
        message,
    })
}

impl GameService {
    /// The Police accuses a player of holding this round's hunted role.
    ///
    /// Legitimate accusers are the human Police holder, or the host acting
    /// on behalf of a bot Police. Applies the round scores to the totals
    /// exactly once, appends the history record, and moves to RESULT.
    pub async fn accuse(
        &self,
        room_id: &str,
        accuser_id: &str,
        target_id: &str,
    ) -> Result<Room, GameError> {
        let mut room = self.room(room_id).await?;

        if room.turn_state != TurnState::Guessing {
            return Err(GameError::NotGuessing);
        }
        let police = room.police().ok_or(GameError::RolesNotDealt)?;
        let authorized =
            accuser_id == police.id || (police.is_bot && accuser_id == room.host_id);
        if !authorized {
            return Err(GameError::NotPolice);
        }

        let required_role = room.round_target.ok_or(GameError::RolesNotDealt)?;
        let outcome = resolve(&room.players, required_role, target_id)?;

        for player in &mut room.players {
            let score = outcome.scores.get(&player.id).copied().unwrap_or(0);
            player.round_score = score;
            player.total_score += score;
        }

        room.round_history.push(RoundRecord {
            round: room.current_round,
            target: required_role,
            winner: if outcome.success {
                Winner::Police
            } else {
                Winner::Criminals
            },
            scores: room
                .players
                .iter()
                .filter_map(|p| {
                    p.current_role.map(|role| ScoreLine {
                        name: p.name.clone(),
                        role,
                        score: p.round_score,
                    })
                })
                .collect(),
            recorded_at: Some(chrono::Utc::now().to_rfc3339()),
        });
        room.last_round_result = Some(outcome.message.clone());
        room.turn_state = TurnState::Result;

        tracing::info!(
            %room_id,
            round = room.current_round,
            success = outcome.success,
            %target_id,
            "accusation resolved"
        );
        self.persist(room).await
    }
}
