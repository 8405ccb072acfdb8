pub mod client;
pub mod config;
pub mod federation;
pub mod templates;
