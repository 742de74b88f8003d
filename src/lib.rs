pub mod config;
pub mod directory;
pub mod error;
pub mod logging;
pub mod lookup;
pub mod slack;

pub use error::{EmailBotError, Result};
