pub mod game;
pub mod hold;
pub mod layout;
mod sse;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::{
    sync::{RwLock, RwLockWriteGuard, watch},
    task::JoinHandle,
};
use uuid::Uuid;

use crate::config::AppConfig;

pub use self::sse::SseHub;
use self::{
    game::GameState,
    hold::{HoldKey, HoldState},
};

/// Application state shared by every handler and gesture task.
pub type SharedState = Arc<AppState>;

const SSE_CAPACITY: usize = 64;

/// Owned handle of a live hold gesture. Dropping it from the registry cancels the gesture.
pub struct HoldHandle {
    /// Identifier of this gesture instance.
    pub gesture: Uuid,
    /// Task driving the gesture's timers.
    pub task: JoinHandle<()>,
    /// Latest state published by the task.
    pub observer: watch::Receiver<HoldState>,
}

/// Central application state: the game store, live hold gestures and the change feed.
pub struct AppState {
    config: Arc<AppConfig>,
    game: RwLock<GameState>,
    holds: DashMap<HoldKey, HoldHandle>,
    sse: SseHub,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(Self {
            config: Arc::new(config),
            game: RwLock::new(GameState::new()),
            holds: DashMap::new(),
            sse: SseHub::new(SSE_CAPACITY),
        })
    }

    /// Runtime configuration loaded at startup.
    pub fn config(&self) -> Arc<AppConfig> {
        self.config.clone()
    }

    /// Broadcast hub used for the change-notification stream.
    pub fn sse(&self) -> &SseHub {
        &self.sse
    }

    /// Registry of live hold gestures keyed by zone.
    pub fn holds(&self) -> &DashMap<HoldKey, HoldHandle> {
        &self.holds
    }

    /// Run `f` against a read-only view of the store.
    pub async fn read_game<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&GameState) -> R,
    {
        let guard = self.game.read().await;
        f(&guard)
    }

    /// Exclusive access to the store.
    ///
    /// Hold cancellation takes this lock too, so a gesture checked as current under the
    /// guard cannot be cancelled before the guard is dropped.
    pub async fn lock_game(&self) -> RwLockWriteGuard<'_, GameState> {
        self.game.write().await
    }

    /// Whether `gesture` is still the live gesture registered for `key`.
    pub fn is_current_gesture(&self, key: &HoldKey, gesture: Uuid) -> bool {
        self.holds
            .get(key)
            .is_some_and(|handle| handle.gesture == gesture)
    }
}
