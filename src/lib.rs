pub mod cache;
pub mod catalog;
pub mod config;
pub mod filter;
pub mod format;
pub mod render;
pub mod tui;
