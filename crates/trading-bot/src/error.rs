use thiserror::Error;

use interface::ExchangeError;

use crate::validators::ValidationError;

#[derive(Debug, Error)]
pub enum BotError {
    /// Missing or malformed command-line input, including absent credentials
    #[error("{0}")]
    Argument(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] ExchangeError),
}

pub type BotResult<T> = Result<T, BotError>;

impl BotError {
    /// Prefix shown in front of the message on the console
    pub fn console_prefix(&self) -> &'static str {
        match self {
            BotError::Argument(_) => "Error",
            BotError::Validation(_) => "Validation error",
            BotError::Remote(_) => "Binance API error",
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, BotError::Remote(e) if e.is_auth_error())
    }

    /// Process exit status for a failed run
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Follow-up line printed under the error, if any
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            BotError::Argument(_) => Some("Use --help to see usage information"),
            _ if self.is_auth_error() => Some("Please check your API credentials"),
            _ => None,
        }
    }
}
