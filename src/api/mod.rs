pub mod account;
pub mod auth;
pub mod models;

pub use account::AccountApi;
pub use auth::AuthApi;
pub use models::*;
