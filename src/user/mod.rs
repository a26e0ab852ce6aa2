mod errors;
mod password;
mod storage;
mod types;

pub use errors::UserError;
pub use storage::UserStore;
pub use types::{
    DESCRIPTION_MAX_CHARS, EMAIL_MAX_CHARS, NewUser, THUMBNAIL_MAX_CHARS, USERNAME_MAX_CHARS,
    User, UserProfile, UserReplace, UserSecret,
};

pub(crate) async fn init() -> Result<(), UserError> {
    UserStore::init().await
}
