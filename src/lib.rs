pub mod analytics;
pub mod checkins;
pub mod commands;
pub mod config;
pub mod error;
pub mod focus;
pub mod garden;
mod ids;
pub mod learn;
pub mod logging;
pub mod progression;
pub mod rescue;
pub mod state;
pub mod storage;

pub use error::OrbitError;
pub use state::AppState;

/// Start-up for a surface: structured logging first, then a file-backed
/// `AppState` with the streak migrated and default records in place.
pub fn init(config: config::OrbitConfig) -> Result<AppState, OrbitError> {
    logging::init_logging(&config.log_level, config.log_json);
    tracing::info!("Orbit starting");

    let app_state = AppState::with_file_store(config);
    let now = chrono::Utc::now();
    let streak = app_state.load_or_init_streak(now)?;
    let growth = app_state.load_or_init_progression()?;
    tracing::debug!(
        streak = streak.current,
        orbs = streak.orbs,
        level = growth.level(),
        "Records loaded"
    );
    Ok(app_state)
}
