mod user_service;

pub use user_service::{UserService, EMAIL_TAKEN, USERNAME_TAKEN};
