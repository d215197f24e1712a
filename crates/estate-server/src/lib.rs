pub mod auth;
pub mod config;
pub mod error;
pub mod media;
pub mod state;
pub mod web;
