mod account;
mod error;
mod order;

pub use account::{AccountBalance, ConnectivityReport, LotSizeFilter, SymbolInfo};
pub use error::ExchangeError;
pub use order::{OrderRequest, OrderResponse, OrderType, Side, TimeInForce};
