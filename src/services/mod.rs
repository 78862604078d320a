pub use auth::PasswordManager;
pub use storage::Storage;

pub mod auth;
pub mod storage;
