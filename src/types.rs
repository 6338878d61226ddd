use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Opaque ID types for type safety
pub type RoomId = String;
pub type PlayerId = String;

/// A round can only start with exactly this many players.
pub const ROOM_SIZE: usize = 4;

/// Legal range for the configurable round count.
pub const MIN_ROUNDS: u32 = 5;
pub const MAX_ROUNDS: u32 = 200;
pub const DEFAULT_MAX_ROUNDS: u32 = 25;

/// Fixed pool of bot display names. `add_bot` prefers the first unused one.
pub const BOT_NAMES: &[&str] = &[
    "Terminator",
    "RoboCop",
    "Wall-E",
    "R2-D2",
    "Jarvis",
    "Ultron",
    "Hal-9000",
    "GLaDOS",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    King,
    Police,
    Robber,
    Thief,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::King, Role::Police, Role::Robber, Role::Thief];

    /// Base point value a player earns for surviving a round with this role.
    pub fn points(&self) -> u32 {
        match self {
            Role::King => 10,
            Role::Police => 8,
            Role::Robber => 6,
            Role::Thief => 4,
        }
    }

    /// Whether this role can be the hunt target of a round.
    pub fn is_criminal(&self) -> bool {
        matches!(self, Role::Robber | Role::Thief)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::King => "King",
            Role::Police => "Police",
            Role::Robber => "Robber",
            Role::Thief => "Thief",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Lobby,
    Playing,
    Finished,
}

/// Sub-phase within an active round. Only meaningful while `status = playing`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnState {
    Idle,
    Guessing,
    Result,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Winner {
    Police,
    Criminals,
}

/// Why a game reached `finished`. History entries don't record this, so the
/// room itself carries it for audit purposes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    Completed,
    Abandoned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_bot: bool,
    pub current_role: Option<Role>,
    pub round_score: u32,
    pub total_score: u32,
}

impl Player {
    pub fn human(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            is_bot: false,
            current_role: None,
            round_score: 0,
            total_score: 0,
        }
    }

    pub fn bot(name: &str) -> Self {
        Self {
            id: format!("bot-{}", ulid::Ulid::new().to_string().to_lowercase()),
            name: name.to_string(),
            is_bot: true,
            current_role: None,
            round_score: 0,
            total_score: 0,
        }
    }
}

/// One line of a resolved round's score table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreLine {
    pub name: String,
    pub role: Role,
    pub score: u32,
}

/// Append-only record of a resolved round. Never rewritten once pushed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub round: u32,
    pub target: Role,
    pub winner: Winner,
    pub scores: Vec<ScoreLine>,
    #[serde(default)]
    pub recorded_at: Option<String>,
}

/// The room document: the single shared source of truth for one game.
///
/// Serialized flat (no nested sub-documents) so any realtime document store
/// can hold it under `<app_id>/rooms/<room_id>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub host_id: PlayerId,
    /// Changes on every score reset, distinguishing "new game" from "next round".
    pub game_instance_id: String,
    pub status: RoomStatus,
    pub turn_state: TurnState,
    pub current_round: u32,
    pub max_rounds: u32,
    /// The criminal role the Police must find this round. Unset while IDLE.
    pub round_target: Option<Role>,
    pub last_round_result: Option<String>,
    pub players: Vec<Player>,
    pub round_history: Vec<RoundRecord>,
    /// Players who have voted to advance past the current RESULT phase.
    #[serde(default)]
    pub ready_players: HashSet<PlayerId>,
    #[serde(default)]
    pub finish_reason: Option<FinishReason>,
    pub created_at: String,
    #[serde(default)]
    pub finished_at: Option<String>,
}

impl Room {
    /// Fresh lobby containing only the host.
    pub fn new(id: RoomId, host_id: &str, host_name: &str, max_rounds: u32) -> Self {
        Self {
            id,
            host_id: host_id.to_string(),
            game_instance_id: ulid::Ulid::new().to_string(),
            status: RoomStatus::Lobby,
            turn_state: TurnState::Idle,
            current_round: 0,
            max_rounds,
            round_target: None,
            last_round_result: None,
            players: vec![Player::human(host_id, host_name)],
            round_history: Vec::new(),
            ready_players: HashSet::new(),
            finish_reason: None,
            created_at: chrono::Utc::now().to_rfc3339(),
            finished_at: None,
        }
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn is_host(&self, player_id: &str) -> bool {
        self.host_id == player_id
    }

    /// The player currently holding the Police role, if roles are dealt.
    pub fn police(&self) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.current_role == Some(Role::Police))
    }

    /// Ends the game. The in-flight round (if any) is voided.
    pub(crate) fn finish(&mut self, reason: FinishReason) {
        self.status = RoomStatus::Finished;
        self.turn_state = TurnState::Idle;
        self.round_target = None;
        self.ready_players.clear();
        self.finish_reason = Some(reason);
        self.finished_at = Some(chrono::Utc::now().to_rfc3339());
    }
}
