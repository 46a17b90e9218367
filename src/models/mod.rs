pub mod claims;
pub mod envelope;
pub mod session;
pub mod user;

pub use claims::Claims;
pub use envelope::unwrap_envelope;
pub use session::SessionState;
pub use user::{CachedUser, LoginRequest, LoginResponse};
