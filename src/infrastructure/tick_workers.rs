//! Background tick workers
//!
//! Two independent periodic tasks drive the NPCs: the wander clock moves
//! them around the floor, the consumption clock runs drinks and departures.
//! Each tick holds the session lock only for the state transition itself.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use tokio::sync::Mutex;
use tokio::time::{interval, MissedTickBehavior};

use crate::application::services::CafeSession;
use crate::domain::events::DomainEvent;

/// The session shared between the console and the tick workers
pub type SharedSession = Arc<Mutex<CafeSession>>;

/// Worker that advances NPC wandering every `period`
pub async fn wander_worker(session: SharedSession, period: Duration, mut rng: StdRng) {
    tracing::info!("Starting wander worker ({:?})", period);
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let events = {
            let mut session = session.lock().await;
            session.wander_tick(&mut rng)
        };
        log_events(&events);
    }
}

/// Worker that advances consumption and departures every `period`
pub async fn consumption_worker(session: SharedSession, period: Duration) {
    tracing::info!("Starting consumption worker ({:?})", period);
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let events = {
            let mut session = session.lock().await;
            session.consumption_tick()
        };
        log_events(&events);
    }
}

/// Log events: lifecycle changes at info, movement at debug
pub fn log_events(events: &[DomainEvent]) {
    for event in events {
        let at = event.metadata().timestamp;
        if event.is_notable() {
            tracing::info!(event = event.event_type(), %at, "{}", event);
        } else {
            tracing::debug!(event = event.event_type(), %at, "{}", event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    use crate::domain::value_objects::{NpcId, SimulationRules};
    use crate::infrastructure::seed::build_cafe_state;

    fn shared() -> SharedSession {
        let rules = SimulationRules::default();
        let state = build_cafe_state(&rules).unwrap();
        Arc::new(Mutex::new(CafeSession::new(state, rules)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_consumption_worker_finishes_drinks() {
        let session = shared();
        {
            let mut session = session.lock().await;
            session.on_order_taken(&NpcId::from("lily"), "latte").unwrap();
            session.on_order_fulfilled(&NpcId::from("lily"), "Latte").unwrap();
        }

        let worker = tokio::spawn(consumption_worker(
            session.clone(),
            Duration::from_millis(10),
        ));
        // 40 consumption ticks plus the 5 leaving ticks
        tokio::time::sleep(Duration::from_millis(10 * 47)).await;
        worker.abort();

        let session = session.lock().await;
        assert!(session.state().find_npc(&NpcId::from("lily")).is_none());
        assert_eq!(session.state().npcs().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wander_worker_moves_wanderers_only() {
        let session = shared();
        let worker = tokio::spawn(wander_worker(
            session.clone(),
            Duration::from_millis(10),
            StdRng::seed_from_u64(7),
        ));
        tokio::time::sleep(Duration::from_millis(200)).await;
        worker.abort();

        let session = session.lock().await;
        let ben = session.state().find_npc(&NpcId::from("barista")).unwrap();
        assert_eq!(ben.position.x, 5);
        assert_eq!(ben.position.y, 2);
        assert_eq!(session.state().npcs().len(), 6);
    }
}
