//! Press-and-hold runtime: one spawned task per gesture drives the [`HoldState`] machine
//! from tokio timers and applies each tick to the store.
//!
//! A gesture only mutates the store while holding the store lock and after checking it is
//! still the gesture registered for its zone. Cancellation removes the registration under
//! the same lock, so once [`release`] returns the gesture can no longer change a counter.

use tokio::{
    sync::watch,
    time::{Instant, sleep, sleep_until},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dto::game::PlayerSummary,
    error::ServiceError,
    services::game_service,
    state::{
        HoldHandle, SharedState,
        hold::{HoldEvent, HoldKey, HoldState, HoldTuning},
    },
};

/// Start a hold gesture on a zone, replacing any gesture already running on it.
///
/// Returns the id of the new gesture, usable with [`release_gesture`].
pub async fn press(state: &SharedState, key: HoldKey) -> Result<Uuid, ServiceError> {
    let tuning = state.config().hold().clone();
    let hold = HoldState::new(key.direction, &tuning).apply(HoldEvent::Press, &tuning)?;

    let game = state.lock_game().await;
    game.player(key.player_id)?;

    if cancel_locked(state, &key) {
        debug!(?key, "replacing live hold gesture");
    }

    let gesture = Uuid::new_v4();
    let (tx, observer) = watch::channel(hold);
    let task = tokio::spawn(run_gesture(state.clone(), key, gesture, tuning, tx));
    state.holds().insert(
        key,
        HoldHandle {
            gesture,
            task,
            observer,
        },
    );
    drop(game);

    debug!(?key, %gesture, "hold gesture armed");
    Ok(gesture)
}

/// End the gesture on a zone (release, pointer-leave or touch-cancel).
///
/// Returns whether a gesture was live. Releasing an idle zone is a no-op.
pub async fn release(state: &SharedState, key: HoldKey) -> bool {
    let _game = state.lock_game().await;
    cancel_locked(state, &key)
}

/// End `gesture` only if it is still the one live on `key`.
///
/// A gesture replaced by a later press on the same zone is already gone, so this leaves
/// its replacement running.
pub async fn release_gesture(state: &SharedState, key: HoldKey, gesture: Uuid) -> bool {
    let _game = state.lock_game().await;
    match state
        .holds()
        .remove_if(&key, |_, handle| handle.gesture == gesture)
    {
        Some((_, handle)) => {
            handle.task.abort();
            debug!(?key, %gesture, "hold gesture cancelled");
            true
        }
        None => false,
    }
}

/// The zone's click handler: exactly one unit in the zone's direction.
pub async fn tap(state: &SharedState, key: HoldKey) -> Result<PlayerSummary, ServiceError> {
    let mut game = state.lock_game().await;
    game_service::apply_player_mutation(state, &mut game, |game| {
        game.change_counter(key.player_id, key.counter, key.direction.sign())
    })
}

/// Current state of the gesture on a zone, idle defaults when none is live.
pub fn snapshot(state: &SharedState, key: HoldKey) -> HoldState {
    state
        .holds()
        .get(&key)
        .map(|handle| *handle.observer.borrow())
        .unwrap_or_else(|| HoldState::new(key.direction, state.config().hold()))
}

/// Cancel every live gesture. The caller must hold the store lock.
pub(crate) fn cancel_all_locked(state: &SharedState) -> usize {
    let keys: Vec<HoldKey> = state.holds().iter().map(|entry| *entry.key()).collect();
    keys.iter().filter(|key| cancel_locked(state, key)).count()
}

/// Cancel the gesture on `key`. The caller must hold the store lock.
fn cancel_locked(state: &SharedState, key: &HoldKey) -> bool {
    let Some((_, handle)) = state.holds().remove(key) else {
        return false;
    };

    handle.task.abort();
    let last = *handle.observer.borrow();
    debug!(
        ?key,
        gesture = %handle.gesture,
        phase = ?last.phase(),
        step = last.step(),
        aggressive = last.is_aggressive(),
        "hold gesture cancelled"
    );
    true
}

async fn run_gesture(
    state: SharedState,
    key: HoldKey,
    gesture: Uuid,
    tuning: HoldTuning,
    tx: watch::Sender<HoldState>,
) {
    let mut hold = *tx.borrow();

    sleep(tuning.hold_delay).await;
    hold = match hold.apply(HoldEvent::HoldElapsed, &tuning) {
        Ok(next) => next,
        Err(err) => {
            warn!(?key, error = %err, "hold gesture could not start repeating");
            return;
        }
    };

    let entered = Instant::now();
    if apply_tick(&state, key, gesture, hold.delta()).await.is_none() {
        return;
    }
    tx.send_replace(hold);
    debug!(?key, %gesture, "hold gesture repeating");

    let aggressive_at = entered + tuning.aggressive_after;
    let mut aggressive_pending = true;
    let mut escalations = tuning.step_schedule.iter();
    let mut next_escalation = escalations.next();
    let mut next_tick = entered + hold.interval();

    loop {
        let escalation_at = next_escalation.map_or(next_tick, |escalation| entered + escalation.after);

        let event = tokio::select! {
            biased;
            _ = sleep_until(aggressive_at), if aggressive_pending => {
                aggressive_pending = false;
                HoldEvent::AggressiveElapsed
            }
            _ = sleep_until(escalation_at), if next_escalation.is_some() => {
                let step = next_escalation.map_or(hold.step(), |escalation| escalation.step);
                next_escalation = escalations.next();
                HoldEvent::StepElapsed { step }
            }
            _ = sleep_until(next_tick) => {
                let Some(value) = apply_tick(&state, key, gesture, hold.delta()).await else {
                    break;
                };
                HoldEvent::Tick { value }
            }
        };

        hold = match hold.apply(event, &tuning) {
            Ok(next) => next,
            Err(err) => {
                warn!(?key, error = %err, "hold gesture stopped on invalid transition");
                break;
            }
        };
        if matches!(event, HoldEvent::Tick { .. }) {
            next_tick = Instant::now() + hold.interval();
        }
        tx.send_replace(hold);
    }
}

/// Apply one tick if the gesture is still live, returning the counter's new value.
async fn apply_tick(state: &SharedState, key: HoldKey, gesture: Uuid, delta: i64) -> Option<i64> {
    let mut game = state.lock_game().await;
    if !state.is_current_gesture(&key, gesture) {
        return None;
    }

    let applied = game_service::apply_player_mutation(state, &mut game, |game| {
        game.change_counter(key.player_id, key.counter, delta)
    });

    match applied {
        Ok(_) => game
            .player(key.player_id)
            .ok()
            .map(|player| player.counter(key.counter)),
        Err(err) => {
            warn!(?key, error = %err, "hold tick failed; dropping gesture");
            state
                .holds()
                .remove_if(&key, |_, handle| handle.gesture == gesture);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        config::AppConfig,
        dto::game::StartGameRequest,
        state::{
            AppState,
            hold::{Counter, Direction, HoldPhase},
        },
    };

    async fn table(num_players: usize, starting_life: i64) -> SharedState {
        let state = AppState::new(AppConfig::default());
        game_service::start_game(
            &state,
            StartGameRequest {
                num_players,
                starting_life,
            },
        )
        .await
        .unwrap();
        state
    }

    async fn life(state: &SharedState, id: usize) -> i64 {
        state.read_game(|game| game.player(id).unwrap().life).await
    }

    fn zone(player_id: usize, direction: Direction) -> HoldKey {
        HoldKey::new(player_id, Counter::Life, direction)
    }

    #[tokio::test(start_paused = true)]
    async fn short_press_is_a_single_tap() {
        let state = table(4, 40).await;
        let key = zone(0, Direction::Increment);

        press(&state, key).await.unwrap();
        sleep(Duration::from_millis(150)).await;
        assert!(release(&state, key).await);
        assert_eq!(life(&state, 0).await, 40);

        tap(&state, key).await.unwrap();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(life(&state, 0).await, 41);
    }

    #[tokio::test(start_paused = true)]
    async fn hold_ticks_immediately_then_on_interval() {
        let state = table(4, 40).await;
        let key = zone(1, Direction::Decrement);

        press(&state, key).await.unwrap();
        assert_eq!(snapshot(&state, key).phase(), HoldPhase::ArmedWaiting);

        sleep(Duration::from_millis(250)).await;
        assert_eq!(life(&state, 1).await, 39);
        assert_eq!(snapshot(&state, key).phase(), HoldPhase::Repeating);

        sleep(Duration::from_millis(110)).await;
        assert_eq!(life(&state, 1).await, 38);
        assert!(snapshot(&state, key).interval_ms() < 150.0);

        release(&state, key).await;
    }

    #[tokio::test(start_paused = true)]
    async fn aggressive_after_two_seconds_and_reset_on_repress() {
        let state = table(4, 40).await;
        let key = zone(0, Direction::Increment);

        press(&state, key).await.unwrap();
        sleep(Duration::from_millis(2_100)).await;
        assert!(!snapshot(&state, key).is_aggressive());
        sleep(Duration::from_millis(200)).await;
        assert!(snapshot(&state, key).is_aggressive());

        assert!(release(&state, key).await);
        let idle = snapshot(&state, key);
        assert_eq!(idle.phase(), HoldPhase::Idle);
        assert!(!idle.is_aggressive());
        assert_eq!(idle.step(), 1);

        press(&state, key).await.unwrap();
        sleep(Duration::from_millis(300)).await;
        let hold = snapshot(&state, key);
        assert_eq!(hold.phase(), HoldPhase::Repeating);
        assert!(!hold.is_aggressive());
        release(&state, key).await;
    }

    #[tokio::test(start_paused = true)]
    async fn release_stops_all_ticks() {
        let state = table(4, 40).await;
        let key = zone(3, Direction::Decrement);

        press(&state, key).await.unwrap();
        sleep(Duration::from_secs(1)).await;
        assert!(release(&state, key).await);
        assert!(state.holds().is_empty());

        let frozen = life(&state, 3).await;
        assert!(frozen < 40);
        sleep(Duration::from_secs(30)).await;
        assert_eq!(life(&state, 3).await, frozen);
        assert!(!release(&state, key).await);
    }

    #[tokio::test(start_paused = true)]
    async fn long_hold_escalates_step() {
        let state = table(4, 40).await;
        let key = zone(2, Direction::Increment);

        press(&state, key).await.unwrap();
        sleep(Duration::from_secs(25)).await;

        let hold = snapshot(&state, key);
        assert_eq!(hold.step(), 10);
        assert!(hold.is_aggressive());

        let gained = life(&state, 2).await - 40;
        assert!(gained > 25, "gained only {gained}");
        release(&state, key).await;
    }

    #[tokio::test(start_paused = true)]
    async fn pressing_again_replaces_the_previous_gesture() {
        let state = table(2, 40).await;
        let key = zone(0, Direction::Increment);

        press(&state, key).await.unwrap();
        press(&state, key).await.unwrap();
        assert_eq!(state.holds().len(), 1);

        sleep(Duration::from_millis(250)).await;
        assert_eq!(life(&state, 0).await, 41);
        release(&state, key).await;
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_zones_are_independent() {
        let state = table(3, 40).await;
        let up = zone(0, Direction::Increment);
        let down = zone(1, Direction::Decrement);

        press(&state, up).await.unwrap();
        press(&state, down).await.unwrap();
        sleep(Duration::from_millis(250)).await;
        release(&state, up).await;

        assert_eq!(life(&state, 0).await, 41);
        assert_eq!(life(&state, 1).await, 39);
        assert_eq!(snapshot(&state, down).phase(), HoldPhase::Repeating);
        release(&state, down).await;
    }

    #[tokio::test(start_paused = true)]
    async fn holding_past_death_keeps_going() {
        let state = table(2, 1).await;
        let key = zone(0, Direction::Decrement);

        press(&state, key).await.unwrap();
        sleep(Duration::from_secs(2)).await;
        release(&state, key).await;

        assert!(life(&state, 0).await < -5);
    }

    #[tokio::test(start_paused = true)]
    async fn infect_hold_is_clamped() {
        let state = table(2, 40).await;
        let key = HoldKey::new(1, Counter::Infect, Direction::Increment);

        press(&state, key).await.unwrap();
        sleep(Duration::from_secs(30)).await;
        release(&state, key).await;

        let infect = state.read_game(|game| game.player(1).unwrap().infect).await;
        assert_eq!(infect, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn new_game_cancels_live_gestures() {
        let state = table(4, 40).await;
        press(&state, zone(0, Direction::Decrement)).await.unwrap();
        sleep(Duration::from_secs(1)).await;

        game_service::start_game(
            &state,
            StartGameRequest {
                num_players: 4,
                starting_life: 20,
            },
        )
        .await
        .unwrap();
        assert!(state.holds().is_empty());

        sleep(Duration::from_secs(5)).await;
        assert_eq!(life(&state, 0).await, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn press_requires_a_known_player() {
        let state = AppState::new(AppConfig::default());
        let err = press(&state, zone(0, Direction::Increment)).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));

        let state = table(2, 40).await;
        let err = press(&state, zone(4, Direction::Increment)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(state.holds().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_gesture_release_keeps_the_replacement() {
        let state = table(2, 40).await;
        let key = zone(0, Direction::Increment);

        let first = press(&state, key).await.unwrap();
        let second = press(&state, key).await.unwrap();
        assert_ne!(first, second);

        assert!(!release_gesture(&state, key, first).await);
        assert!(state.is_current_gesture(&key, second));

        sleep(Duration::from_millis(250)).await;
        assert_eq!(life(&state, 0).await, 41);

        assert!(release_gesture(&state, key, second).await);
        assert!(state.holds().is_empty());
        sleep(Duration::from_secs(5)).await;
        assert_eq!(life(&state, 0).await, 41);
    }
}
