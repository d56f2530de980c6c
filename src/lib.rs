use anyhow::Result;
use log::info;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub mod api;
pub mod api_types;
pub mod config;
pub mod database;
pub mod errors;
pub mod repositories;
pub mod services;
pub mod tag_normalizer;

use crate::config::app;
use database::Database;
pub use database::SortOrder;
pub use errors::{AppError, AppResult};

/// Application state shared by the transport layer
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
}

impl AppState {
    /// Open (or create) the database in the platform data directory
    pub fn new() -> Result<Self> {
        let app_data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(app::DATA_DIR_NAME);

        if !app_data_dir.exists() {
            std::fs::create_dir_all(&app_data_dir)?;
        }

        let db_path = app_data_dir.join(app::DATABASE_FILENAME);
        Self::open(&db_path.to_string_lossy())
    }

    /// Open (or create) the database at an explicit path
    pub fn open(db_path: &str) -> Result<Self> {
        let db = Database::new(db_path)?;
        Ok(AppState {
            db: Arc::new(Mutex::new(db)),
        })
    }
}

/// Composition root for the embedding process: logging plus state
pub fn init() -> Result<AppState> {
    let _ = env_logger::Builder::from_default_env().try_init();

    let state = AppState::new()?;
    info!("tagboard state initialized");
    Ok(state)
}
