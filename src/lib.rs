//! userdb - User account data-access layer
//!
//! This crate owns all reads and writes to the user table: lookup by id or
//! email, credential verification, existence checks, inserts, full-record
//! replacement, and password updates. It runs on either SQLite or PostgreSQL
//! through sqlx, selected at startup via environment variables.

mod storage;
mod user;

#[cfg(test)]
mod test_utils;

pub use user::{
    DESCRIPTION_MAX_CHARS, EMAIL_MAX_CHARS, NewUser, THUMBNAIL_MAX_CHARS, USERNAME_MAX_CHARS,
    User, UserError, UserProfile, UserReplace, UserSecret, UserStore,
};

/// Initialize the data-access layer.
///
/// Connects the configured data store, creates the user table if it is
/// missing, and validates the live schema against what this crate expects.
pub async fn init() -> Result<(), UserError> {
    user::init().await
}
