//! Shared test initialization
//!
//! Loads the test environment and initializes the user table once per test
//! process. The SQLite test database file is removed at startup so every
//! run begins from an empty table; individual tests still use unique emails
//! because they share the database within a run.

use std::sync::Once;

/// Centralized test setup for all tests that touch the database.
pub async fn init_test_environment() {
    static ENV_INIT: Once = Once::new();
    ENV_INIT.call_once(|| {
        if dotenvy::from_filename(".env_test").is_err() {
            dotenvy::dotenv().ok();
        }

        // Start from an empty database file, if the configured store is a
        // file-backed SQLite database
        if let Some(db_path) = sqlite_file_path() {
            let _ = std::fs::remove_file(&db_path);
        }
    });

    if let Err(e) = crate::user::UserStore::init().await {
        eprintln!("Warning: Failed to initialize UserStore: {e}");
    }
}

/// Extract the file path from a SQLite database URL.
///
/// Supports `sqlite:/path/to/file.db`, `sqlite:./relative.db`, and
/// `sqlite:file:path?options`. Returns None for non-SQLite URLs and
/// in-memory databases.
fn sqlite_file_path_from_url(url: &str) -> Option<String> {
    let path = url.strip_prefix("sqlite:")?;

    let path = if let Some(file_path) = path.strip_prefix("file:") {
        file_path.split('?').next()?
    } else {
        path.strip_prefix("//").unwrap_or(path)
    };

    if path.contains(":memory:") || path.is_empty() {
        return None;
    }

    Some(path.to_string())
}

fn sqlite_file_path() -> Option<String> {
    let url = std::env::var("USER_DB_URL").ok()?;
    sqlite_file_path_from_url(&url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_file_path_from_url() {
        assert_eq!(
            sqlite_file_path_from_url("sqlite:/tmp/test.db"),
            Some("/tmp/test.db".to_string())
        );
        assert_eq!(
            sqlite_file_path_from_url("sqlite:./test.db"),
            Some("./test.db".to_string())
        );
        assert_eq!(
            sqlite_file_path_from_url("sqlite:file:/tmp/test.db?mode=rwc"),
            Some("/tmp/test.db".to_string())
        );
        assert_eq!(sqlite_file_path_from_url("sqlite::memory:"), None);
        assert_eq!(
            sqlite_file_path_from_url("postgres://localhost/test"),
            None
        );
    }
}
