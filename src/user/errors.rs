use thiserror::Error;

/// Errors reported by the user repository.
///
/// "Not found" on a lookup is not represented here: every lookup returns
/// `Ok(None)` for a missing row. `NotFound` is only raised by writes that
/// require an existing row.
#[derive(Clone, Error, Debug, PartialEq)]
pub enum UserError {
    #[error("User not found")]
    NotFound,

    #[error("Field '{field}' exceeds maximum length of {max} characters")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("Invalid password")]
    InvalidPassword,

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Crypto error: {0}")]
    Crypto(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_too_long_display() {
        let error = UserError::FieldTooLong {
            field: "email",
            max: 50,
        };

        assert_eq!(
            error.to_string(),
            "Field 'email' exceeds maximum length of 50 characters"
        );
    }

    #[test]
    fn test_duplicate_email_display() {
        let error = UserError::DuplicateEmail("a@x.edu".to_string());

        assert_eq!(error.to_string(), "Email already registered: a@x.edu");
    }

    #[test]
    fn test_storage_error_display() {
        let error = UserError::Storage("Connection failed".to_string());

        assert_eq!(error.to_string(), "Storage error: Connection failed");
    }

    /// Test error propagation through the ? operator
    #[test]
    fn test_error_propagation() {
        fn require_password(password: &str) -> Result<(), UserError> {
            if password.is_empty() {
                return Err(UserError::InvalidPassword);
            }
            Ok(())
        }

        fn authenticate(password: &str) -> Result<String, UserError> {
            require_password(password)?;
            Ok("authenticated".to_string())
        }

        assert!(authenticate("secret").is_ok());
        assert_eq!(authenticate(""), Err(UserError::InvalidPassword));
    }

    #[test]
    fn test_error_is_sync_and_send() {
        fn assert_sync_send<T: Sync + Send>() {}
        assert_sync_send::<UserError>();
    }
}
