use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chorpolice::config::GameConfig;
use chorpolice::host;
use chorpolice::state::GameService;
use chorpolice::store::{MemoryDirectory, RoomEvent};
use chorpolice::types::{RoomStatus, TurnState};

/// Demo: one human host plus three bots play a full game in-process.
/// The host coordinator resolves the bot Police rounds; this loop plays
/// the human side (accuse when holding Police, vote ready after results).
#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chorpolice=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GameConfig::from_env();
    tracing::info!(app_id = %config.app_id, "starting chorpolice demo game");

    let store = Arc::new(MemoryDirectory::new());
    let service = Arc::new(GameService::new(store, config));

    let host_id = "demo-host";
    let room = service.create_room(host_id, "Babu").await.unwrap();
    service.set_max_rounds(&room.id, host_id, 5).await.unwrap();
    for _ in 0..3 {
        service.add_bot(&room.id, host_id).await.unwrap();
    }

    let mut events = service.subscribe(&room.id).await.unwrap();
    host::spawn_host_coordinator(service.clone(), room.id.clone(), host_id.to_string());

    service.start_round(&room.id, host_id).await.unwrap();

    loop {
        let snapshot = match events.recv().await {
            Ok(RoomEvent::Changed(room)) => room,
            Ok(RoomEvent::Deleted) => break,
            Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        };

        if snapshot.status == RoomStatus::Finished {
            let mut standings = snapshot.players.clone();
            standings.sort_by(|a, b| b.total_score.cmp(&a.total_score));
            for (place, p) in standings.iter().enumerate() {
                tracing::info!(
                    place = place + 1,
                    name = %p.name,
                    total = p.total_score,
                    bot = p.is_bot,
                    "final standing"
                );
            }
            break;
        }

        match snapshot.turn_state {
            TurnState::Guessing => {
                // Our turn only when we drew Police ourselves.
                let police = match snapshot.police() {
                    Some(p) if p.id == host_id => p.clone(),
                    _ => continue,
                };
                if let Some(target) = host::choose_bot_target(&snapshot, &police.id) {
                    if let Err(e) = service.accuse(&room.id, host_id, &target).await {
                        tracing::debug!(error = %e, "accusation no-op");
                    }
                }
            }
            TurnState::Result => {
                if !snapshot.ready_players.contains(host_id) {
                    if let Err(e) = service.mark_ready(&room.id, host_id).await {
                        tracing::debug!(error = %e, "ready vote no-op");
                    }
                }
            }
            TurnState::Idle => {}
        }
    }

    tracing::info!("demo game over");
}
