pub mod app;
pub mod calendar_handler;
pub mod config;
pub mod error;
