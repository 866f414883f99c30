use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// USDⓈ-M futures wallet totals, quoted in USDT
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    pub total_wallet_balance: Decimal,
    pub available_balance: Decimal,
    pub total_unrealized_profit: Decimal,
}

/// Result of a successful connectivity check: the exchange clock and a
/// signed account read that proves the credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityReport {
    pub server_time: DateTime<Utc>,
    pub total_wallet_balance: Decimal,
}

/// Binance LOT_SIZE filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotSizeFilter {
    pub min_qty: Decimal,
    pub max_qty: Decimal,
    pub step_size: Decimal,
}

/// Trading rules for one futures symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    pub status: String,
    pub base_asset: String,
    pub quote_asset: String,
    pub price_precision: u32,
    pub quantity_precision: u32,
    pub lot_size: Option<LotSizeFilter>,
    pub tick_size: Option<Decimal>,
}

impl SymbolInfo {
    pub fn is_trading(&self) -> bool {
        self.status == "TRADING"
    }
}
