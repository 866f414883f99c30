pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod logger;
pub mod orders;
pub mod validators;

pub use error::{BotError, BotResult};
pub use orders::OrderManager;
pub use validators::{validate_order_params, ValidationError};
