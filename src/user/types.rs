use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::errors::UserError;

/// Maximum length of `username`, in characters
pub const USERNAME_MAX_CHARS: usize = 20;
/// Maximum length of `email`, in characters
pub const EMAIL_MAX_CHARS: usize = 50;
/// Maximum length of `description`, in characters
pub const DESCRIPTION_MAX_CHARS: usize = 200;
/// Maximum length of `thumbnail`, in characters
pub const THUMBNAIL_MAX_CHARS: usize = 15;

/// A stored user, minus the password hash
///
/// This is the shape returned by full-record lookups and by `login`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    /// Store-assigned primary key, immutable once assigned
    pub user_id: i64,
    /// Unique across all live rows
    pub email: String,
    pub username: Option<String>,
    /// Free-text profile text
    pub description: Option<String>,
    /// Reference to an avatar asset
    pub thumbnail: String,
}

/// Public profile view of a user (no id, email, or credentials)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct UserProfile {
    pub username: Option<String>,
    pub description: Option<String>,
    pub thumbnail: String,
}

/// Full stored row including the password hash
///
/// Privileged read. The hash is never serialized.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct UserSecret {
    pub user_id: i64,
    pub email: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub description: Option<String>,
    pub thumbnail: String,
}

impl From<UserSecret> for User {
    fn from(secret: UserSecret) -> Self {
        User {
            user_id: secret.user_id,
            email: secret.email,
            username: secret.username,
            description: secret.description,
            thumbnail: secret.thumbnail,
        }
    }
}

/// Input for creating a user
///
/// `password` is the plaintext credential supplied by the caller; it is
/// hashed before anything touches the store. The store assigns `user_id`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub username: Option<String>,
    pub description: Option<String>,
    pub thumbnail: String,
}

impl NewUser {
    pub(crate) fn validate(&self) -> Result<(), UserError> {
        check_length("username", self.username.as_deref(), USERNAME_MAX_CHARS)?;
        check_length("email", Some(&self.email), EMAIL_MAX_CHARS)?;
        check_length(
            "description",
            self.description.as_deref(),
            DESCRIPTION_MAX_CHARS,
        )?;
        check_length("thumbnail", Some(&self.thumbnail), THUMBNAIL_MAX_CHARS)?;
        Ok(())
    }
}

/// Full-record replacement input for `UserStore::replace_user`
///
/// This is a replacement, not a patch: `None` writes NULL (or fails on a
/// NOT NULL column), it does not preserve the previous value. `Some("")`
/// writes an empty string. Only the password hash survives a replace
/// untouched.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UserReplace {
    pub email: Option<String>,
    pub username: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

impl UserReplace {
    pub(crate) fn validate(&self) -> Result<(), UserError> {
        check_length("username", self.username.as_deref(), USERNAME_MAX_CHARS)?;
        check_length("email", self.email.as_deref(), EMAIL_MAX_CHARS)?;
        check_length(
            "description",
            self.description.as_deref(),
            DESCRIPTION_MAX_CHARS,
        )?;
        check_length("thumbnail", self.thumbnail.as_deref(), THUMBNAIL_MAX_CHARS)?;
        Ok(())
    }
}

/// Rejects a present field longer than `max` characters; absent fields are
/// not checked (absence is not the same as empty).
fn check_length(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), UserError> {
    if let Some(value) = value {
        if value.chars().count() > max {
            return Err(UserError::FieldTooLong { field, max });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn valid_new_user() -> NewUser {
        NewUser {
            email: "a@x.edu".to_string(),
            password: "p1".to_string(),
            username: Some("alice".to_string()),
            description: None,
            thumbnail: "t1".to_string(),
        }
    }

    #[test]
    fn test_new_user_within_bounds_validates() {
        assert!(valid_new_user().validate().is_ok());
    }

    #[test]
    fn test_new_user_at_exact_bounds_validates() {
        let user = NewUser {
            email: format!("{}@x.edu", "a".repeat(EMAIL_MAX_CHARS - 6)),
            password: "p1".to_string(),
            username: Some("u".repeat(USERNAME_MAX_CHARS)),
            description: Some("d".repeat(DESCRIPTION_MAX_CHARS)),
            thumbnail: "t".repeat(THUMBNAIL_MAX_CHARS),
        };

        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_new_user_username_over_bound_rejected() {
        let mut user = valid_new_user();
        user.username = Some("u".repeat(USERNAME_MAX_CHARS + 1));

        assert_eq!(
            user.validate(),
            Err(UserError::FieldTooLong {
                field: "username",
                max: USERNAME_MAX_CHARS
            })
        );
    }

    #[test]
    fn test_new_user_email_over_bound_rejected() {
        let mut user = valid_new_user();
        user.email = "e".repeat(EMAIL_MAX_CHARS + 1);

        assert_eq!(
            user.validate(),
            Err(UserError::FieldTooLong {
                field: "email",
                max: EMAIL_MAX_CHARS
            })
        );
    }

    #[test]
    fn test_new_user_description_over_bound_rejected() {
        let mut user = valid_new_user();
        user.description = Some("d".repeat(DESCRIPTION_MAX_CHARS + 1));

        assert_eq!(
            user.validate(),
            Err(UserError::FieldTooLong {
                field: "description",
                max: DESCRIPTION_MAX_CHARS
            })
        );
    }

    #[test]
    fn test_new_user_thumbnail_over_bound_rejected() {
        let mut user = valid_new_user();
        user.thumbnail = "t".repeat(THUMBNAIL_MAX_CHARS + 1);

        assert_eq!(
            user.validate(),
            Err(UserError::FieldTooLong {
                field: "thumbnail",
                max: THUMBNAIL_MAX_CHARS
            })
        );
    }

    #[test]
    fn test_replace_with_all_fields_absent_validates() {
        // Absent fields are not length-checked
        assert!(UserReplace::default().validate().is_ok());
    }

    #[test]
    fn test_replace_over_bound_field_rejected() {
        let replace = UserReplace {
            thumbnail: Some("t".repeat(THUMBNAIL_MAX_CHARS + 1)),
            ..UserReplace::default()
        };

        assert_eq!(
            replace.validate(),
            Err(UserError::FieldTooLong {
                field: "thumbnail",
                max: THUMBNAIL_MAX_CHARS
            })
        );
    }

    #[test]
    fn test_bounds_count_characters_not_bytes() {
        // 15 multibyte characters are within the thumbnail bound even though
        // they exceed 15 bytes
        let mut user = valid_new_user();
        user.thumbnail = "あ".repeat(THUMBNAIL_MAX_CHARS);

        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_user_serialization_excludes_nothing() {
        let user = User {
            user_id: 1,
            email: "a@x.edu".to_string(),
            username: Some("alice".to_string()),
            description: None,
            thumbnail: "t1".to_string(),
        };

        let json = serde_json::to_value(&user).expect("Failed to serialize User");
        assert_eq!(json["user_id"], 1);
        assert_eq!(json["email"], "a@x.edu");
        assert_eq!(json["description"], serde_json::Value::Null);
    }

    #[test]
    fn test_user_secret_serialization_skips_password_hash() {
        let secret = UserSecret {
            user_id: 1,
            email: "a@x.edu".to_string(),
            username: None,
            password_hash: "pbkdf2-sha256$100000$salt$hash".to_string(),
            description: None,
            thumbnail: "t1".to_string(),
        };

        let json = serde_json::to_string(&secret).expect("Failed to serialize UserSecret");
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("pbkdf2-sha256"));
    }

    proptest! {
        /// Any username within the bound passes validation
        #[test]
        fn test_username_within_bound_always_validates(
            username in proptest::collection::vec(any::<char>(), 0..=USERNAME_MAX_CHARS)
        ) {
            let mut user = valid_new_user();
            user.username = Some(username.into_iter().collect());

            prop_assert!(user.validate().is_ok());
        }

        /// Any username over the bound fails validation
        #[test]
        fn test_username_over_bound_always_rejected(
            username in proptest::collection::vec(
                any::<char>(),
                USERNAME_MAX_CHARS + 1..=USERNAME_MAX_CHARS + 40
            )
        ) {
            let mut user = valid_new_user();
            user.username = Some(username.into_iter().collect());

            prop_assert_eq!(
                user.validate(),
                Err(UserError::FieldTooLong { field: "username", max: USERNAME_MAX_CHARS })
            );
        }

        /// User serde round-trip preserves every field
        #[test]
        fn test_user_serde_roundtrip(
            user_id in 1..1_000_000i64,
            email in "[a-z0-9]{1,20}@[a-z]{1,10}\\.edu",
            username in proptest::option::of("[a-zA-Z0-9 ]{1,20}"),
            description in proptest::option::of("[a-zA-Z0-9 ]{0,200}"),
            thumbnail in "[a-zA-Z0-9_]{1,15}"
        ) {
            let user = User { user_id, email, username, description, thumbnail };

            let serialized = serde_json::to_string(&user).expect("Failed to serialize");
            let deserialized: User =
                serde_json::from_str(&serialized).expect("Failed to deserialize");

            prop_assert_eq!(user, deserialized);
        }
    }
}
