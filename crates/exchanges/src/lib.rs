use async_trait::async_trait;
use chrono::{DateTime, Utc};

use interface::{
    AccountBalance, ConnectivityReport, ExchangeError, OrderRequest, OrderResponse, SymbolInfo,
};

pub mod binance;

/// What the order tooling needs from a futures venue.
///
/// Every call is a single round-trip; failures are returned as-is and never retried.
#[async_trait]
pub trait FuturesExchange: Send + Sync {
    /// Exchange clock, also used as an unauthenticated reachability probe.
    async fn server_time(&self) -> Result<DateTime<Utc>, ExchangeError>;

    /// Reachability plus a signed read to prove the credentials work.
    async fn check_connectivity(&self) -> Result<ConnectivityReport, ExchangeError>;

    async fn account_balance(&self) -> Result<AccountBalance, ExchangeError>;

    /// Trading rules for `symbol`, or `None` if the exchange does not list it.
    async fn symbol_info(&self, symbol: &str) -> Result<Option<SymbolInfo>, ExchangeError>;

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderResponse, ExchangeError>;

    async fn order_status(
        &self,
        symbol: &str,
        order_id: u64,
    ) -> Result<OrderResponse, ExchangeError>;
}

pub use binance::BinanceClient;
