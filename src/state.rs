use std::sync::Arc;
use std::time::Instant;

use crate::db::Database;
use crate::services::words::WordRepository;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(db: Option<Arc<Database>>) -> Self {
        Self {
            started_at: Instant::now(),
            db,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn database(&self) -> Option<Arc<Database>> {
        self.db.clone()
    }

    pub fn repository(&self) -> Option<WordRepository> {
        self.db.as_deref().map(WordRepository::new)
    }
}
