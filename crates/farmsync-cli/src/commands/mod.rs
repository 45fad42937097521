pub mod auth;
pub mod common;
pub mod completions;
pub mod config;
pub mod resources;
pub mod status;
