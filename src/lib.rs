pub mod app;
pub mod auth;
pub mod config;
pub mod controllers;
pub mod db;
pub mod email;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod migrations;
pub mod models;
pub mod openapi;
pub mod response;
pub mod testing;

pub use app::App;
pub use config::Config;
pub use error::AppError;
pub use response::ApiResponse;
pub use testing::{TestApp, TestClient, TestResponse};
