//! Library module for book management
//!
//! Book records, categories and the cache-aside service in front of the
//! repository.

mod book;
mod service;

pub use book::*;
pub use service::BookService;
