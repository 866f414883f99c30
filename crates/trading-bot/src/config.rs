use std::env;
use std::fmt;
use std::path::PathBuf;

use exchanges::binance::{DEFAULT_RECV_WINDOW, TESTNET_BASE_URL};
use exchanges::BinanceClient;

use crate::error::{BotError, BotResult};

pub const API_KEY_VAR: &str = "BINANCE_API_KEY";
pub const API_SECRET_VAR: &str = "BINANCE_API_SECRET";
pub const BASE_URL_VAR: &str = "BINANCE_FUTURES_URL";
pub const RECV_WINDOW_VAR: &str = "BINANCE_RECV_WINDOW";
pub const LOG_DIR_VAR: &str = "TRADING_BOT_LOG_DIR";

const DEFAULT_LOG_DIR: &str = "logs";

/// Credentials given on the command line; they win over the environment.
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

#[derive(Clone)]
pub struct Settings {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub recv_window: u64,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("recv_window", &self.recv_window)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Settings {
    /// Reads the process environment (after `.env` has been loaded).
    pub fn load(overrides: &CredentialOverrides) -> BotResult<Self> {
        Self::from_lookup(overrides, |key| env::var(key).ok())
    }

    pub fn from_lookup(
        overrides: &CredentialOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> BotResult<Self> {
        let api_key =
            non_empty(overrides.api_key.clone()).or_else(|| non_empty(lookup(API_KEY_VAR)));
        let api_secret =
            non_empty(overrides.api_secret.clone()).or_else(|| non_empty(lookup(API_SECRET_VAR)));

        let (Some(api_key), Some(api_secret)) = (api_key, api_secret) else {
            return Err(BotError::Argument(format!(
                "API credentials not found. Set {API_KEY_VAR} and {API_SECRET_VAR} \
                 or pass --api-key and --api-secret"
            )));
        };

        let base_url =
            non_empty(lookup(BASE_URL_VAR)).unwrap_or_else(|| TESTNET_BASE_URL.to_string());

        let recv_window = match non_empty(lookup(RECV_WINDOW_VAR)) {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                BotError::Argument(format!("{RECV_WINDOW_VAR} must be milliseconds: {e}"))
            })?,
            None => DEFAULT_RECV_WINDOW,
        };

        Ok(Self {
            api_key,
            api_secret,
            base_url,
            recv_window,
        })
    }

    pub fn client(&self) -> BotResult<BinanceClient> {
        Ok(BinanceClient::new(&self.api_key, &self.api_secret)?
            .with_base_url(&self.base_url)
            .with_recv_window(self.recv_window))
    }
}

/// Log directory: command line, then environment, then `logs`
pub fn log_dir(cli: Option<PathBuf>) -> PathBuf {
    cli.or_else(|| non_empty(env::var(LOG_DIR_VAR).ok()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
}
