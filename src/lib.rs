//! Bookshelf Server
//!
//! A book library backend: EPUB upload with metadata and cover extraction,
//! cached book listings, statistics and static file serving.

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod epub;
pub mod error;
pub mod library;
pub mod routes;
pub mod state;
pub mod storage;
pub mod upload;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
