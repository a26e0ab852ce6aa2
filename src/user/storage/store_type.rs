use crate::storage::USER_DATA_STORE;
use crate::user::{
    errors::UserError,
    password,
    types::{NewUser, User, UserProfile, UserReplace, UserSecret},
};

use super::postgres::*;
use super::sqlite::*;

/// The user repository: every read and write against the user table goes
/// through an associated function on this type. Each call borrows a pooled
/// connection scoped to that call; lookups report "not found" as `Ok(None)`.
pub struct UserStore;

impl UserStore {
    /// Initialize the user table
    ///
    /// Creates the table if it is missing and validates the live schema.
    /// Idempotent.
    pub async fn init() -> Result<(), UserError> {
        let store = USER_DATA_STORE.lock().await;

        match (store.as_sqlite(), store.as_postgres()) {
            (Some(pool), _) => {
                create_tables_sqlite(pool).await?;
                validate_user_tables_sqlite(pool).await?;
                Ok(())
            }
            (_, Some(pool)) => {
                create_tables_postgres(pool).await?;
                validate_user_tables_postgres(pool).await?;
                Ok(())
            }
            _ => Err(UserError::Storage("Unsupported database type".to_string())),
        }
    }

    /// Get the public profile of a user: username, description, thumbnail.
    ///
    /// Excludes email and credentials.
    pub async fn get_profile(user_id: i64) -> Result<Option<UserProfile>, UserError> {
        let store = USER_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_profile_sqlite(pool, user_id).await
        } else if let Some(pool) = store.as_postgres() {
            get_profile_postgres(pool, user_id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Get the public profile of the user registered under an email.
    pub async fn get_profile_by_email(email: &str) -> Result<Option<UserProfile>, UserError> {
        let store = USER_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_profile_by_email_sqlite(pool, email).await
        } else if let Some(pool) = store.as_postgres() {
            get_profile_by_email_postgres(pool, email).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Get the email registered for a user id.
    pub async fn get_email(user_id: i64) -> Result<Option<String>, UserError> {
        let store = USER_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_email_sqlite(pool, user_id).await
        } else if let Some(pool) = store.as_postgres() {
            get_email_postgres(pool, user_id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Get the full record of a user, minus the password hash.
    #[tracing::instrument]
    pub async fn get_user(user_id: i64) -> Result<Option<User>, UserError> {
        let store = USER_DATA_STORE.lock().await;

        let result = if let Some(pool) = store.as_sqlite() {
            get_user_sqlite(pool, user_id).await
        } else if let Some(pool) = store.as_postgres() {
            get_user_postgres(pool, user_id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(Some(_)) => {
                tracing::info!(found = true, "User lookup completed");
            }
            Ok(None) => {
                tracing::info!(found = false, "User lookup completed - not found");
            }
            Err(e) => {
                tracing::error!(error = %e, "User lookup failed");
            }
        }

        result
    }

    /// Get every user, ordered by ascending user id.
    pub async fn get_all_users() -> Result<Vec<User>, UserError> {
        let store = USER_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_all_users_sqlite(pool).await
        } else if let Some(pool) = store.as_postgres() {
            get_all_users_postgres(pool).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Get the full stored record of a user, including the password hash.
    ///
    /// Privileged read; the hash never leaves serialization anyway.
    pub async fn get_user_secret(user_id: i64) -> Result<Option<UserSecret>, UserError> {
        let store = USER_DATA_STORE.lock().await;

        if let Some(pool) = store.as_sqlite() {
            get_user_secret_sqlite(pool, user_id).await
        } else if let Some(pool) = store.as_postgres() {
            get_user_secret_postgres(pool, user_id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Authenticate by email and password.
    ///
    /// Candidates matching the email are scanned newest-account-first and
    /// the first row whose stored hash verifies is returned. A wrong
    /// password is a soft `Ok(None)`, not an error.
    #[tracing::instrument(skip(password))]
    pub async fn login(email: &str, password: &str) -> Result<Option<User>, UserError> {
        let candidates = {
            let store = USER_DATA_STORE.lock().await;

            if let Some(pool) = store.as_sqlite() {
                get_secrets_by_email_desc_sqlite(pool, email).await
            } else if let Some(pool) = store.as_postgres() {
                get_secrets_by_email_desc_postgres(pool, email).await
            } else {
                Err(UserError::Storage("Unsupported database type".to_string()))
            }
        }?;

        for secret in candidates {
            if password::verify_password(password, &secret.password_hash)? {
                tracing::info!(user_id = secret.user_id, "Login succeeded");
                return Ok(Some(secret.into()));
            }
        }

        tracing::info!("Login failed - no matching credentials");
        Ok(None)
    }

    /// True iff at least one user is registered under this email.
    pub async fn exists_by_email(email: &str) -> Result<bool, UserError> {
        let store = USER_DATA_STORE.lock().await;

        let count = if let Some(pool) = store.as_sqlite() {
            count_by_email_sqlite(pool, email).await
        } else if let Some(pool) = store.as_postgres() {
            count_by_email_postgres(pool, email).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }?;

        Ok(count > 0)
    }

    /// True iff at least one user carries this username.
    ///
    /// Usernames are not unique at the storage layer; this only reports
    /// whether any row matches.
    pub async fn exists_by_username(username: &str) -> Result<bool, UserError> {
        let store = USER_DATA_STORE.lock().await;

        let count = if let Some(pool) = store.as_sqlite() {
            count_by_username_sqlite(pool, username).await
        } else if let Some(pool) = store.as_postgres() {
            count_by_username_postgres(pool, username).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }?;

        Ok(count > 0)
    }

    /// Create a user
    ///
    /// Length validation runs first and aborts the whole operation on any
    /// violation; the password is hashed before the insert; the store
    /// assigns `user_id`. Returns the persisted record.
    #[tracing::instrument(skip(new_user), fields(email = %new_user.email))]
    pub async fn create_user(new_user: NewUser) -> Result<User, UserError> {
        new_user.validate()?;

        let password_hash = password::hash_password(&new_user.password)?;

        let store = USER_DATA_STORE.lock().await;

        let result = if let Some(pool) = store.as_sqlite() {
            insert_user_sqlite(pool, &new_user, &password_hash).await
        } else if let Some(pool) = store.as_postgres() {
            insert_user_postgres(pool, &new_user, &password_hash).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(user) => {
                tracing::info!(user_id = user.user_id, "User created");
            }
            Err(e) => {
                tracing::error!(error = %e, "User creation failed");
            }
        }

        result
    }

    /// Replace the mutable fields of a user record
    ///
    /// This writes a full replacement keyed by `user_id`: a field omitted
    /// from `replace` is overwritten with NULL, not left unchanged (see
    /// `UserReplace`). The password is not part of this operation. Length
    /// validation runs first and aborts the write on any violation.
    #[tracing::instrument(skip(replace))]
    pub async fn replace_user(user_id: i64, replace: UserReplace) -> Result<(), UserError> {
        replace.validate()?;

        let store = USER_DATA_STORE.lock().await;

        let result = if let Some(pool) = store.as_sqlite() {
            replace_user_sqlite(pool, user_id, &replace).await
        } else if let Some(pool) = store.as_postgres() {
            replace_user_postgres(pool, user_id, &replace).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(()) => {
                tracing::info!("User record replaced");
            }
            Err(e) => {
                tracing::error!(error = %e, "User record replacement failed");
            }
        }

        result
    }

    /// Update a user's password
    ///
    /// Verifies the current password against the stored hash before writing
    /// anything; a mismatch is `InvalidPassword` and a missing user is
    /// `NotFound`. Only the password column is written, every other field
    /// is unaffected.
    #[tracing::instrument(skip(old_password, new_password))]
    pub async fn update_password(
        user_id: i64,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), UserError> {
        let secret = Self::get_user_secret(user_id)
            .await?
            .ok_or(UserError::NotFound)?;

        if !password::verify_password(old_password, &secret.password_hash)? {
            tracing::info!("Password update rejected - current password mismatch");
            return Err(UserError::InvalidPassword);
        }

        let password_hash = password::hash_password(new_password)?;

        let store = USER_DATA_STORE.lock().await;

        let result = if let Some(pool) = store.as_sqlite() {
            update_password_sqlite(pool, user_id, &password_hash).await
        } else if let Some(pool) = store.as_postgres() {
            update_password_postgres(pool, user_id, &password_hash).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(()) => {
                tracing::info!("Password updated");
            }
            Err(e) => {
                tracing::error!(error = %e, "Password update failed");
            }
        }

        result
    }
}
