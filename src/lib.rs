//! Faculty absence and substitution rearrangement engine
//!
//! Finds faculty free to cover a period on a date, negotiates the
//! substitution between the absent faculty and the substitute, and resolves
//! the schedule actually taught on any date by laying accepted substitutions
//! over the recurring weekly timetable.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    pub fn new(config: AppConfig, services: services::Services) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(services),
        }
    }
}
