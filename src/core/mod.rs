pub mod bot;
pub mod config;
pub mod error;
pub mod shared;
