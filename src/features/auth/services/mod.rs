mod auth_service;
mod session_service;

pub use auth_service::{AuthService, INVALID_CREDENTIALS};
pub use session_service::{IssuedSession, SessionService};
