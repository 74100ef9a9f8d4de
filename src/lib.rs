pub mod core;
pub mod feedback;
pub mod line;
pub mod main_module;
pub mod recognition;
pub mod recognizer;
pub mod reply;
pub mod security;
pub mod thumbnail;

pub use crate::core::config::AppConfig;
pub use crate::core::error::{BotError, BotResult};
pub use crate::core::shared::state::AppState;
