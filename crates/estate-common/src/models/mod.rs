pub mod auth;
pub mod property;
