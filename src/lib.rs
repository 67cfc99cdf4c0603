pub mod api;
pub mod config;
pub mod error;
pub mod media;
pub mod prompt;
pub mod routes;
pub mod schema;
pub mod storage;
