pub mod auth;
pub mod config;
pub mod export;
pub mod form;
pub mod session;
pub mod stat;
pub mod tui;
pub mod utils;
