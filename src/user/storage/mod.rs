mod config;
mod postgres;
mod sqlite;
mod store_type;

pub use store_type::UserStore;

use crate::user::errors::UserError;

/// Maps a sqlx write failure, surfacing unique-constraint violations on the
/// email column as `DuplicateEmail`.
fn map_write_error(email: Option<&str>, e: sqlx::Error) -> UserError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return UserError::DuplicateEmail(email.unwrap_or_default().to_string());
        }
    }
    UserError::Storage(e.to_string())
}
