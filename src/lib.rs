//! Restaurant manager: menu category REST backend over a small active-record layer.

pub mod case;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod models;
pub mod orm;
pub mod requests;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

pub use config::Settings;
pub use db::{connect, Connection, SharedConnection};
pub use error::{AppError, ConfigError, OrmError};
pub use migration::apply_migrations;
pub use orm::{Collection, Entity, Model, Page, Record};
pub use routes::app;
pub use state::AppState;
