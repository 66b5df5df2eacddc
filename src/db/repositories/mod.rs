pub mod anime;
pub mod episode;
pub mod favorite;
pub mod user;
pub mod watch_history;
pub mod watchlist;

use sea_orm::{DbErr, SqlErr};

/// Whether an insert was rejected by a UNIQUE index.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
