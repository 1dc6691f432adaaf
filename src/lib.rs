pub mod authentication;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod masking;
pub mod placeholders;
pub mod registry;
pub mod schema;
pub mod server;
