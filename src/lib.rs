use std::sync::Arc;

use config::Config;
use database::EntityStore;
use notify::Notifier;
use operations::{ContactOperation, RecipeOperation, ReviewOperation, UserOperation};

pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod notify;
pub mod operations;
pub mod router;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub config: Arc<Config>,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(store: Arc<dyn EntityStore>, config: Config, notifier: Notifier) -> Self {
        Self {
            store,
            config: Arc::new(config),
            notifier,
        }
    }

    pub fn recipes(&self) -> RecipeOperation {
        RecipeOperation::new(self.store.clone(), self.notifier.clone())
    }

    pub fn reviews(&self) -> ReviewOperation {
        ReviewOperation::new(self.store.clone(), self.notifier.clone())
    }

    pub fn users(&self) -> UserOperation {
        UserOperation::new(
            self.store.clone(),
            self.notifier.clone(),
            self.config.clone(),
        )
    }

    pub fn contacts(&self) -> ContactOperation {
        ContactOperation::new(self.store.clone(), self.notifier.clone())
    }
}
