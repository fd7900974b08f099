use std::{sync::Arc, time::Duration};

use sea_orm::DatabaseConnection;
use service::playlist::PlaylistService;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub playlists: Arc<dyn PlaylistService>,
    pub db: DatabaseConnection,
    /// Deadline attached to every playlist operation started by a request.
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(playlists: Arc<dyn PlaylistService>, db: DatabaseConnection, request_timeout: Duration) -> Self {
        Self { playlists, db, request_timeout }
    }
}
