use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::email::Mailer;

/// Shared application state available in all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    pub mailer: Arc<dyn Mailer>,
}

pub mod accounts;
pub mod jobs;
