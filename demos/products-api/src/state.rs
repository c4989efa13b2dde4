use std::time::{Duration, Instant};

use crate::errors::RepositoryError;
use crate::products::Seed;
use crate::products::repository::ProductRepository;

#[derive(Clone, axum::extract::FromRef)]
pub(crate) struct AppState {
    #[from_ref(skip)]
    started_at: Instant,
    repository: ProductRepository,
}

impl AppState {
    pub(crate) fn new(seed: Seed) -> Result<Self, RepositoryError> {
        Ok(Self {
            started_at: Instant::now(),
            repository: ProductRepository::new(seed)?,
        })
    }

    pub(crate) fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
