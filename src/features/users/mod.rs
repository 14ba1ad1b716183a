//! Account persistence shared by authentication, seeding and administration.

pub mod models;
pub mod services;

pub use services::UserService;
