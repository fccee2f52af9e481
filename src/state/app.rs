use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::config::OrbitConfig;
use crate::error::OrbitError;
use crate::progression::store as progression_store;
use crate::progression::{ProgressionState, StreakState};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

/// Application-wide state container.
/// Holds the injected store and config; records themselves are read fresh
/// on every operation and written back whole.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn KeyValueStore>,
    config: OrbitConfig,
    /// Serializes load-mutate-save cycles within this process
    write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyValueStore>, config: OrbitConfig) -> Self {
        AppState {
            store,
            config,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// State backed by JSON files in the configured data directory.
    pub fn with_file_store(config: OrbitConfig) -> Self {
        let root = config.resolved_data_dir();
        tracing::debug!(data_dir = ?root, "Using file store");
        Self::new(Arc::new(FileStore::new(root)), config)
    }

    /// Ephemeral state, nothing touches disk.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), OrbitConfig::default())
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn config(&self) -> &OrbitConfig {
        &self.config
    }

    /// Load the streak, creating and persisting the default on first run.
    /// A failed read is returned as an error and nothing is written.
    pub fn load_or_init_streak(&self, now: DateTime<Utc>) -> Result<StreakState, OrbitError> {
        if let Some(state) = progression_store::load_streak(self.store(), now)? {
            return Ok(state);
        }
        let state = StreakState::new(now);
        progression_store::save_streak(self.store(), &state)?;
        tracing::info!("Initialized streak record");
        Ok(state)
    }

    /// Load focus growth, creating and persisting the default on first run.
    pub fn load_or_init_progression(&self) -> Result<ProgressionState, OrbitError> {
        if let Some(state) = progression_store::load_progression(self.store())? {
            return Ok(state);
        }
        let state = ProgressionState::new();
        progression_store::save_progression(self.store(), &state)?;
        tracing::info!("Initialized focus growth record");
        Ok(state)
    }

    pub fn save_streak(&self, state: &StreakState) -> Result<(), OrbitError> {
        progression_store::save_streak(self.store(), state)
    }

    /// Prune weekly aggregates per the retention config, then persist.
    pub fn save_progression(&self, state: &mut ProgressionState) -> Result<(), OrbitError> {
        if let Some(weeks) = self.config.retention_weeks {
            state.prune_weeks(weeks as usize);
        }
        progression_store::save_progression(self.store(), state)
    }

    /// Apply `f` to the streak and persist the result.
    pub fn update_streak<F, R>(&self, now: DateTime<Utc>, f: F) -> Result<(StreakState, R), OrbitError>
    where
        F: FnOnce(&mut StreakState) -> R,
    {
        let _guard = self.write_lock.lock();
        let mut state = self.load_or_init_streak(now)?;
        let out = f(&mut state);
        self.save_streak(&state)?;
        Ok((state, out))
    }

    /// Apply `f` to focus growth and persist the result.
    pub fn update_progression<F, R>(&self, f: F) -> Result<(ProgressionState, R), OrbitError>
    where
        F: FnOnce(&mut ProgressionState) -> R,
    {
        let _guard = self.write_lock.lock();
        let mut state = self.load_or_init_progression()?;
        let out = f(&mut state);
        self.save_progression(&mut state)?;
        Ok((state, out))
    }

    /// Run a multi-record update under the write lock.
    /// `f` must not call `update_*` or `exclusive` again.
    pub fn exclusive<F, R>(&self, f: F) -> Result<R, OrbitError>
    where
        F: FnOnce(&AppState) -> Result<R, OrbitError>,
    {
        let _guard = self.write_lock.lock();
        f(self)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory()
    }
}
