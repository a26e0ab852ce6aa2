//! Data store configuration

use std::{env, str::FromStr, sync::LazyLock};
use tokio::sync::Mutex;

use super::types::{DataStore, PostgresDataStore, SqliteDataStore};

static USER_DB_TYPE: LazyLock<String> =
    LazyLock::new(|| env::var("USER_DB_TYPE").expect("USER_DB_TYPE must be set"));

static USER_DB_URL: LazyLock<String> =
    LazyLock::new(|| env::var("USER_DB_URL").expect("USER_DB_URL must be set"));

pub(crate) static USER_DATA_STORE: LazyLock<Mutex<Box<dyn DataStore>>> = LazyLock::new(|| {
    let store_type = USER_DB_TYPE.as_str();
    let store_url = USER_DB_URL.as_str();

    tracing::info!(
        "Initializing user data store with type: {}, url: {}",
        store_type,
        store_url
    );

    let store = match store_type {
        "sqlite" => {
            let opts = sqlx::sqlite::SqliteConnectOptions::from_str(store_url)
                .expect("Failed to parse SQLite connection string")
                .create_if_missing(true);

            Box::new(SqliteDataStore {
                pool: sqlx::sqlite::SqlitePool::connect_lazy_with(opts),
            }) as Box<dyn DataStore>
        }
        "postgres" => Box::new(PostgresDataStore {
            pool: sqlx::PgPool::connect_lazy(store_url).expect("Failed to create Postgres pool"),
        }) as Box<dyn DataStore>,
        t => panic!(
            "Unsupported store type: {}. Supported types are 'sqlite' and 'postgres'",
            t
        ),
    };

    Mutex::new(store)
});

#[cfg(test)]
mod tests {
    use std::env;

    // Helper struct to safely manage environment variables during tests
    struct EnvVarGuard {
        key: String,
        original_value: Option<String>,
    }

    impl EnvVarGuard {
        fn new(key: &str, value: &str) -> Self {
            let original_value = env::var(key).ok();

            // Use unsafe block for env var manipulation as it affects global state
            unsafe {
                env::set_var(key, value);
            }

            Self {
                key: key.to_string(),
                original_value,
            }
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            unsafe {
                match &self.original_value {
                    Some(value) => env::set_var(&self.key, value),
                    None => env::remove_var(&self.key),
                }
            }
        }
    }

    #[test]
    fn test_env_var_parsing() {
        // This test only verifies that the environment variables are parsed
        // correctly; we don't initialize the LazyLock to avoid side effects.
        let _type_guard = EnvVarGuard::new("USER_DB_TYPE", "sqlite");
        let _url_guard = EnvVarGuard::new("USER_DB_URL", "sqlite::memory:");

        let store_type = env::var("USER_DB_TYPE").unwrap();
        let store_url = env::var("USER_DB_URL").unwrap();

        assert_eq!(store_type, "sqlite");
        assert_eq!(store_url, "sqlite::memory:");
    }
}
