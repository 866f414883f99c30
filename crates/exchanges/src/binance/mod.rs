use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use interface::ExchangeError;

pub mod futures;

pub use futures::order_query;

pub const TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";
pub const MAINNET_BASE_URL: &str = "https://fapi.binance.com";
pub const DEFAULT_RECV_WINDOW: u64 = 50000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Binance USDⓈ-M futures client holding the credentials for the process lifetime
#[derive(Clone)]
pub struct BinanceClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) api_secret: String,
    pub(crate) recv_window: u64,
}

impl BinanceClient {
    /// Client pointed at the futures testnet
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Result<Self, ExchangeError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: TESTNET_BASE_URL.to_string(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            recv_window: DEFAULT_RECV_WINDOW,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_recv_window(mut self, recv_window: u64) -> Self {
        self.recv_window = recv_window;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_testnet(&self) -> bool {
        self.base_url == TESTNET_BASE_URL
    }
}

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of the query string (e.g. "symbol=BTCUSDT&timestamp=1234567890")
pub fn generate_signature(query_string: &str, api_secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(api_secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(query_string.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Milliseconds since the epoch
pub fn get_timestamp() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
