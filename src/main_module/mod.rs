//! HTTP surface: router assembly, health check and graceful shutdown.

mod health;
mod server;
mod shutdown;

pub use health::*;
pub use server::*;
pub use shutdown::*;
