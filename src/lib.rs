pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;

pub use config::Config;
pub use db::{current_epoch_ms, init_pool, run_migrations, SqliteEntryStore};
pub use error::ApiError;
pub use models::{Student, StudentSummary, UpsertEntryRequest};
pub use routes::create_router;
pub use state::AppState;
