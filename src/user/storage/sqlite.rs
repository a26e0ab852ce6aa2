use sqlx::{Pool, Sqlite};

use crate::storage::validate_sqlite_table_schema;
use crate::user::{
    errors::UserError,
    types::{NewUser, User, UserProfile, UserReplace, UserSecret},
};

use super::config::DB_TABLE_USERS;
use super::map_write_error;

// SQLite implementations
pub(super) async fn create_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table_name} (
            user_id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            username TEXT,
            password_hash TEXT NOT NULL,
            description TEXT,
            thumbnail TEXT NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}

/// Validates that the user table schema matches what we expect
pub(super) async fn validate_user_tables_sqlite(pool: &Pool<Sqlite>) -> Result<(), UserError> {
    let users_table = DB_TABLE_USERS.as_str();

    // Expected schema (column name, data type)
    let expected_columns = vec![
        ("user_id", "INTEGER"),
        ("email", "TEXT"),
        ("username", "TEXT"),
        ("password_hash", "TEXT"),
        ("description", "TEXT"),
        ("thumbnail", "TEXT"),
    ];

    validate_sqlite_table_schema(pool, users_table, &expected_columns, UserError::Storage).await
}

pub(super) async fn get_profile_sqlite(
    pool: &Pool<Sqlite>,
    user_id: i64,
) -> Result<Option<UserProfile>, UserError> {
    // Ensure the table exists before any operation - this matters for fresh
    // test databases
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, UserProfile>(&format!(
        r#"
        SELECT username, description, thumbnail FROM {table_name} WHERE user_id = ?
        "#
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn get_profile_by_email_sqlite(
    pool: &Pool<Sqlite>,
    email: &str,
) -> Result<Option<UserProfile>, UserError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, UserProfile>(&format!(
        r#"
        SELECT username, description, thumbnail FROM {table_name} WHERE email = ?
        "#
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn get_email_sqlite(
    pool: &Pool<Sqlite>,
    user_id: i64,
) -> Result<Option<String>, UserError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_scalar::<_, String>(&format!(
        r#"
        SELECT email FROM {table_name} WHERE user_id = ?
        "#
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn get_user_sqlite(
    pool: &Pool<Sqlite>,
    user_id: i64,
) -> Result<Option<User>, UserError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT user_id, email, username, description, thumbnail
        FROM {table_name} WHERE user_id = ?
        "#
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn get_all_users_sqlite(pool: &Pool<Sqlite>) -> Result<Vec<User>, UserError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT user_id, email, username, description, thumbnail
        FROM {table_name} ORDER BY user_id ASC
        "#
    ))
    .fetch_all(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn get_user_secret_sqlite(
    pool: &Pool<Sqlite>,
    user_id: i64,
) -> Result<Option<UserSecret>, UserError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, UserSecret>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE user_id = ?
        "#
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

/// Fetches all rows matching an email, newest account first.
pub(super) async fn get_secrets_by_email_desc_sqlite(
    pool: &Pool<Sqlite>,
    email: &str,
) -> Result<Vec<UserSecret>, UserError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_as::<_, UserSecret>(&format!(
        r#"
        SELECT * FROM {table_name} WHERE email = ? ORDER BY user_id DESC
        "#
    ))
    .bind(email)
    .fetch_all(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn count_by_email_sqlite(
    pool: &Pool<Sqlite>,
    email: &str,
) -> Result<i64, UserError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_scalar::<_, i64>(&format!(
        r#"
        SELECT COUNT(*) FROM {table_name} WHERE email = ?
        "#
    ))
    .bind(email)
    .fetch_one(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn count_by_username_sqlite(
    pool: &Pool<Sqlite>,
    username: &str,
) -> Result<i64, UserError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query_scalar::<_, i64>(&format!(
        r#"
        SELECT COUNT(*) FROM {table_name} WHERE username = ?
        "#
    ))
    .bind(username)
    .fetch_one(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

pub(super) async fn insert_user_sqlite(
    pool: &Pool<Sqlite>,
    new_user: &NewUser,
    password_hash: &str,
) -> Result<User, UserError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        INSERT INTO {table_name} (email, username, password_hash, description, thumbnail)
        VALUES (?, ?, ?, ?, ?)
        "#
    ))
    .bind(&new_user.email)
    .bind(&new_user.username)
    .bind(password_hash)
    .bind(&new_user.description)
    .bind(&new_user.thumbnail)
    .execute(pool)
    .await
    .map_err(|e| map_write_error(Some(&new_user.email), e))?;

    let user_id = result.last_insert_rowid();

    // Fetch the row back to return the store-assigned record
    sqlx::query_as::<_, User>(&format!(
        r#"
        SELECT user_id, email, username, description, thumbnail
        FROM {table_name} WHERE user_id = ?
        "#
    ))
    .bind(user_id)
    .fetch_one(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))
}

/// Writes a full replacement row keyed by `user_id`.
///
/// Every mutable column is overwritten: absent fields are written as NULL,
/// which the store rejects for NOT NULL columns. Only `password_hash` is
/// left untouched.
pub(super) async fn replace_user_sqlite(
    pool: &Pool<Sqlite>,
    user_id: i64,
    replace: &UserReplace,
) -> Result<(), UserError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_USERS.as_str();

    let result = sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET
            email = ?,
            username = ?,
            description = ?,
            thumbnail = ?
        WHERE user_id = ?
        "#
    ))
    .bind(&replace.email)
    .bind(&replace.username)
    .bind(&replace.description)
    .bind(&replace.thumbnail)
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| map_write_error(replace.email.as_deref(), e))?;

    if result.rows_affected() == 0 {
        return Err(UserError::NotFound);
    }

    Ok(())
}

pub(super) async fn update_password_sqlite(
    pool: &Pool<Sqlite>,
    user_id: i64,
    password_hash: &str,
) -> Result<(), UserError> {
    create_tables_sqlite(pool).await?;

    let table_name = DB_TABLE_USERS.as_str();

    sqlx::query(&format!(
        r#"
        UPDATE {table_name} SET password_hash = ? WHERE user_id = ?
        "#
    ))
    .bind(password_hash)
    .bind(user_id)
    .execute(pool)
    .await
    .map_err(|e| UserError::Storage(e.to_string()))?;

    Ok(())
}
