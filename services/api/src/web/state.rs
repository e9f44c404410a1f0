//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use movie_tracker_core::agents::FactGenerator;
use movie_tracker_core::movie_cache::MovieCache;
use movie_tracker_core::ports::{ChatModelService, SessionStore};
use movie_tracker_core::toolbox::MovieToolbox;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers. Everything behind it is cheap to clone or reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub chat_model: Arc<dyn ChatModelService>,
    pub fact_generator: FactGenerator,
    pub movie_cache: MovieCache,
    pub toolbox: MovieToolbox,
    pub config: Arc<Config>,
}
