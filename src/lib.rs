pub mod app;
pub mod auth;
pub mod calc;
pub mod config;
pub mod error;
pub mod notes;
pub mod state;
pub mod store;
pub mod todos;
