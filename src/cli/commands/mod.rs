//! Command implementations

mod cache;
mod config;
mod download;

pub use cache::cache;
pub use config::config;
pub use download::download;
