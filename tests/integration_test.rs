use chorpolice::config::GameConfig;
use chorpolice::host;
use chorpolice::state::{GameError, GameService};
use chorpolice::store::{MemoryDirectory, RoomDirectory, RoomEvent};
use chorpolice::types::*;
use std::sync::Arc;
use std::time::Duration;

fn service() -> Arc<GameService> {
    Arc::new(GameService::new(
        Arc::new(MemoryDirectory::new()),
        GameConfig::default(),
    ))
}

fn fast_service(store: Arc<MemoryDirectory>) -> Arc<GameService> {
    let config = GameConfig {
        bot_delay: Duration::from_millis(20),
        advance_delay: Duration::from_millis(10),
        ..GameConfig::default()
    };
    Arc::new(GameService::new(store, config))
}

/// A room mid-round with a known seating order, written straight to the
/// store so tests can pin who holds the Police seat.
fn seated_room(police_is_bot: bool) -> Room {
    let mut room = Room::new("GAME".to_string(), "host-1", "Babu", DEFAULT_MAX_ROUNDS);
    if police_is_bot {
        room.players.push(Player::bot("Terminator"));
    } else {
        room.players.push(Player::human("p2", "Mira"));
    }
    room.players.push(Player::human("p3", "Ravi"));
    room.players.push(Player::human("p4", "Asha"));

    room.players[0].current_role = Some(Role::King);
    room.players[1].current_role = Some(Role::Police);
    room.players[2].current_role = Some(Role::Robber);
    room.players[3].current_role = Some(Role::Thief);

    room.status = RoomStatus::Playing;
    room.turn_state = TurnState::Guessing;
    room.current_round = 1;
    room.round_target = Some(Role::Thief);
    room
}

/// End-to-end flow: lobby fills, five rounds resolve, game completes.
#[tokio::test]
async fn test_full_game_flow() {
    let service = service();

    // 1. Host opens a room, guests join.
    let room = service.create_room("host-1", "Babu").await.unwrap();
    service.set_max_rounds(&room.id, "host-1", 5).await.unwrap();
    service.join_room(&room.id, "p2", "Mira").await.unwrap();
    service.join_room(&room.id, "p3", "Ravi").await.unwrap();
    let lobby = service.join_room(&room.id, "p4", "Asha").await.unwrap();
    assert_eq!(lobby.players.len(), 4);
    assert_eq!(lobby.status, RoomStatus::Lobby);

    // 2. Five rounds: police always catches the hunted role.
    for round_no in 1..=5u32 {
        let playing = service.start_round(&room.id, "host-1").await.unwrap();
        assert_eq!(playing.current_round, round_no);
        assert_eq!(playing.turn_state, TurnState::Guessing);

        let expected_target = if round_no % 2 == 1 {
            Role::Thief
        } else {
            Role::Robber
        };
        assert_eq!(playing.round_target, Some(expected_target));

        let police = playing.police().unwrap().clone();
        let culprit = playing
            .players
            .iter()
            .find(|p| p.current_role == Some(expected_target))
            .unwrap()
            .clone();

        let resolved = service
            .accuse(&room.id, &police.id, &culprit.id)
            .await
            .unwrap();
        assert_eq!(resolved.turn_state, TurnState::Result);
        assert_eq!(resolved.round_history.len(), round_no as usize);
        assert_eq!(
            resolved.round_history.last().unwrap().winner,
            Winner::Police
        );

        // Exact per-role payout for a successful hunt.
        for p in &resolved.players {
            let expected = match p.current_role.unwrap() {
                Role::King => 10,
                Role::Police => 8,
                role if role == expected_target => 0,
                role => role.points(),
            };
            assert_eq!(p.round_score, expected);
        }

        // Everyone votes ready for the next round.
        for pid in ["host-1", "p2", "p3", "p4"] {
            service.mark_ready(&room.id, pid).await.unwrap();
        }
    }

    // 3. The sixth start finishes the game without touching the counter.
    let finished = service.start_round(&room.id, "host-1").await.unwrap();
    assert_eq!(finished.status, RoomStatus::Finished);
    assert_eq!(finished.current_round, 5);
    assert_eq!(finished.finish_reason, Some(FinishReason::Completed));

    // Per successful round: King 10, Police 8, caught criminal 0, the other
    // criminal keeps their base value. Odd rounds catch the Thief (Robber
    // keeps 6 -> 24 total), even rounds catch the Robber (Thief keeps 4 ->
    // 22 total). Three odd rounds and two even ones.
    let total: u32 = finished.players.iter().map(|p| p.total_score).sum();
    assert_eq!(total, 3 * 24 + 2 * 22);
}

/// The failed-accusation payout from the fixed rules.
#[tokio::test]
async fn test_wrong_accusation_lets_criminals_escape() {
    let store = Arc::new(MemoryDirectory::new());
    let service = Arc::new(GameService::new(store.clone(), GameConfig::default()));
    store.create(seated_room(false)).await.unwrap();

    // Round target is the Thief; police accuses the Robber instead.
    let room = service.accuse("GAME", "p2", "p3").await.unwrap();

    assert_eq!(room.round_history[0].winner, Winner::Criminals);
    let by_id: std::collections::HashMap<_, _> =
        room.players.iter().map(|p| (p.id.as_str(), p)).collect();
    assert_eq!(by_id["host-1"].round_score, 10);
    assert_eq!(by_id["p2"].round_score, 0);
    assert_eq!(by_id["p3"].round_score, 6);
    assert_eq!(by_id["p4"].round_score, 4);
    assert_eq!(
        room.last_round_result.as_deref(),
        Some("Failed! Police accused Ravi (Robber).")
    );
}

/// Abandonment ends the game for everyone, whatever the round counter says.
#[tokio::test]
async fn test_abandonment_ends_game_immediately() {
    let service = service();
    let room = service.create_room("host-1", "Babu").await.unwrap();
    service.join_room(&room.id, "p2", "Mira").await.unwrap();
    service.join_room(&room.id, "p3", "Ravi").await.unwrap();
    service.join_room(&room.id, "p4", "Asha").await.unwrap();
    service.start_round(&room.id, "host-1").await.unwrap();

    let room = service.leave(&room.id, "p2").await.unwrap().unwrap();

    assert_eq!(room.status, RoomStatus::Finished);
    assert_eq!(room.finish_reason, Some(FinishReason::Abandoned));
    assert!(room.player("p2").is_none());
    assert_eq!(room.players.len(), 3);

    // The finished game does not accept further transitions.
    assert!(matches!(
        service.start_round(&room.id, "host-1").await,
        Err(GameError::GameFinished)
    ));
    assert!(matches!(
        service.mark_ready(&room.id, "p3").await,
        Err(GameError::GameFinished)
    ));
}

/// The host coordinator resolves a bot Police seat on its own.
#[tokio::test]
async fn test_coordinator_issues_bot_accusation() {
    let store = Arc::new(MemoryDirectory::new());
    let service = fast_service(store.clone());
    store.create(seated_room(true)).await.unwrap();

    let mut events = service.subscribe("GAME").await.unwrap();
    host::spawn_host_coordinator(service.clone(), "GAME".to_string(), "host-1".to_string());

    let resolved = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let RoomEvent::Changed(room) = events.recv().await.unwrap() {
                if room.turn_state == TurnState::Result {
                    return room;
                }
            }
        }
    })
    .await
    .expect("bot police should have accused someone");

    assert_eq!(resolved.round_history.len(), 1);
    // The bot never accuses itself or the King.
    let message = resolved.last_round_result.unwrap();
    assert!(!message.contains("(King)"));
    assert!(!message.contains("(Police)"));
}

/// A decision made against a stale snapshot is discarded, not applied.
#[tokio::test]
async fn test_coordinator_discards_stale_bot_decision() {
    let store = Arc::new(MemoryDirectory::new());
    let config = GameConfig {
        bot_delay: Duration::from_millis(150),
        advance_delay: Duration::from_millis(10),
        ..GameConfig::default()
    };
    let service = Arc::new(GameService::new(store.clone(), config));
    store.create(seated_room(true)).await.unwrap();

    host::spawn_host_coordinator(service.clone(), "GAME".to_string(), "host-1".to_string());

    // Beat the bot to it: the host resolves on the bot's behalf right away.
    tokio::time::sleep(Duration::from_millis(30)).await;
    service.accuse("GAME", "host-1", "p4").await.unwrap();

    // Give the bot's timer ample time to fire and (correctly) no-op.
    tokio::time::sleep(Duration::from_millis(400)).await;

    let room = service.room("GAME").await.unwrap();
    assert_eq!(room.round_history.len(), 1, "no double resolution");
    assert_eq!(room.turn_state, TurnState::Result);
}

/// Ready votes from every human auto-advance the game to the next round.
#[tokio::test]
async fn test_coordinator_auto_advances_after_ready_votes() {
    let store = Arc::new(MemoryDirectory::new());
    let service = fast_service(store.clone());

    let mut room = seated_room(true);
    room.turn_state = TurnState::Result;
    room.last_round_result = Some("Success! Police caught the Thief.".to_string());
    for p in room.players.iter().filter(|p| !p.is_bot) {
        room.ready_players.insert(p.id.clone());
    }
    store.create(room).await.unwrap();

    let mut events = service.subscribe("GAME").await.unwrap();
    host::spawn_host_coordinator(service.clone(), "GAME".to_string(), "host-1".to_string());

    let advanced = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let RoomEvent::Changed(room) = events.recv().await.unwrap() {
                if room.turn_state == TurnState::Guessing {
                    return room;
                }
            }
        }
    })
    .await
    .expect("coordinator should have started the next round");

    assert_eq!(advanced.current_round, 2);
    assert_eq!(advanced.round_target, Some(Role::Robber));
    assert!(advanced.ready_players.is_empty());
}

/// A whole bot-vs-host game runs to completion through the coordinator,
/// with this test playing only the human side.
#[tokio::test]
async fn test_bot_game_runs_to_completion() {
    let store = Arc::new(MemoryDirectory::new());
    let service = fast_service(store);

    let room = service.create_room("host-1", "Babu").await.unwrap();
    service.set_max_rounds(&room.id, "host-1", 5).await.unwrap();
    for _ in 0..3 {
        service.add_bot(&room.id, "host-1").await.unwrap();
    }

    let mut events = service.subscribe(&room.id).await.unwrap();
    host::spawn_host_coordinator(service.clone(), room.id.clone(), "host-1".to_string());
    service.start_round(&room.id, "host-1").await.unwrap();

    let finished = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let snapshot = match events.recv().await {
                Ok(RoomEvent::Changed(room)) => room,
                Ok(RoomEvent::Deleted) => panic!("room should not be deleted"),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                Err(e) => panic!("event stream closed early: {e}"),
            };

            if snapshot.status == RoomStatus::Finished {
                return snapshot;
            }
            match snapshot.turn_state {
                TurnState::Guessing => {
                    // Only act when the human drew the Police seat.
                    if snapshot.police().map(|p| p.id.as_str()) == Some("host-1") {
                        if let Some(target) = host::choose_bot_target(&snapshot, "host-1") {
                            let _ = service.accuse(&room.id, "host-1", &target).await;
                        }
                    }
                }
                TurnState::Result => {
                    if !snapshot.ready_players.contains("host-1") {
                        let _ = service.mark_ready(&room.id, "host-1").await;
                    }
                }
                TurnState::Idle => {}
            }
        }
    })
    .await
    .expect("game should have finished");

    assert_eq!(finished.current_round, 5);
    assert_eq!(finished.finish_reason, Some(FinishReason::Completed));
    assert_eq!(finished.round_history.len(), 5);
    // Every resolved round pays the King 10.
    for entry in &finished.round_history {
        let king_line = entry
            .scores
            .iter()
            .find(|s| s.role == Role::King)
            .unwrap();
        assert_eq!(king_line.score, 10);
    }
}

/// Restart hands back a clean lobby under a new game instance id.
#[tokio::test]
async fn test_restart_after_completion() {
    let service = service();
    let room = service.create_room("host-1", "Babu").await.unwrap();
    service.set_max_rounds(&room.id, "host-1", 5).await.unwrap();
    service.join_room(&room.id, "p2", "Mira").await.unwrap();
    service.join_room(&room.id, "p3", "Ravi").await.unwrap();
    service.join_room(&room.id, "p4", "Asha").await.unwrap();

    let before = service.room(&room.id).await.unwrap();

    let playing = service.start_round(&room.id, "host-1").await.unwrap();
    let police_id = playing.police().unwrap().id.clone();
    let target = playing
        .players
        .iter()
        .find(|p| p.id != police_id)
        .unwrap()
        .id
        .clone();
    service.accuse(&room.id, &police_id, &target).await.unwrap();

    let fresh = service.restart(&room.id, "host-1").await.unwrap();
    assert_eq!(fresh.status, RoomStatus::Lobby);
    assert_eq!(fresh.current_round, 0);
    assert!(fresh.round_history.is_empty());
    assert_ne!(fresh.game_instance_id, before.game_instance_id);
    assert!(fresh.players.iter().all(|p| p.total_score == 0));
    assert_eq!(fresh.players.len(), 4, "roster survives a restart");
}
