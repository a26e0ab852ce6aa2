mod config;
mod schema_validation;
mod types;

pub(crate) use config::USER_DATA_STORE;
pub(crate) use schema_validation::{
    validate_postgres_table_schema, validate_sqlite_table_schema,
};
