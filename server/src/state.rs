use std::sync::Arc;

use crate::booking::SessionRegistry;
use crate::config::Config;
use crate::store::BookingStore;
use crate::upstream::CinemaBackend;

/// Shared handles passed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Arc<dyn CinemaBackend>,
    pub store: Arc<dyn BookingStore>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(config: Config, backend: Arc<dyn CinemaBackend>, store: Arc<dyn BookingStore>) -> Self {
        let sessions = SessionRegistry::new(config.session_ttl);
        Self {
            config: Arc::new(config),
            backend,
            store,
            sessions,
        }
    }
}
