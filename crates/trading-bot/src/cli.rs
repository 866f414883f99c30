use std::path::PathBuf;

use structopt::StructOpt;

use crate::config::CredentialOverrides;
use crate::error::{BotError, BotResult};

const EXAMPLES: &str = "EXAMPLES:
    # Place a market buy order
    trading-bot --symbol BTCUSDT --side BUY --type MARKET --quantity 0.001

    # Place a limit sell order
    trading-bot --symbol ETHUSDT --side SELL --type LIMIT --quantity 0.01 --price 2500

    # Test connection
    trading-bot --test";

#[derive(Debug, StructOpt)]
#[structopt(
    name = "trading-bot",
    about = "Places orders on the Binance Futures testnet",
    after_help = EXAMPLES
)]
pub struct Opt {
    /// Trading pair symbol (e.g. BTCUSDT, ETHUSDT)
    #[structopt(long)]
    pub symbol: Option<String>,

    /// Order side (BUY or SELL)
    #[structopt(long)]
    pub side: Option<String>,

    /// Order type (MARKET or LIMIT)
    #[structopt(long = "type")]
    pub order_type: Option<String>,

    /// Order quantity
    #[structopt(long)]
    pub quantity: Option<String>,

    /// Order price (required for LIMIT orders)
    #[structopt(long)]
    pub price: Option<String>,

    /// Test API connection and credentials
    #[structopt(long)]
    pub test: bool,

    /// Show account balance
    #[structopt(long)]
    pub balance: bool,

    /// Look up an existing order (needs --symbol)
    #[structopt(long)]
    pub order_id: Option<u64>,

    /// Show trading rules for --symbol
    #[structopt(long)]
    pub info: bool,

    /// Binance API key (or set BINANCE_API_KEY)
    #[structopt(long)]
    pub api_key: Option<String>,

    /// Binance API secret (or set BINANCE_API_SECRET)
    #[structopt(long)]
    pub api_secret: Option<String>,

    /// Directory for log files (or set TRADING_BOT_LOG_DIR, default ./logs)
    #[structopt(long, parse(from_os_str))]
    pub log_dir: Option<PathBuf>,
}

/// Raw order fields, checked only for presence here
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderArgs {
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub quantity: String,
    pub price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    TestConnection,
    Balance,
    OrderStatus { symbol: String, order_id: u64 },
    SymbolInfo { symbol: String },
    PlaceOrder(OrderArgs),
}

fn required(value: &Option<String>, flag: &str) -> BotResult<String> {
    value
        .as_ref()
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or_else(|| BotError::Argument(format!("{flag} is required")))
}

impl Opt {
    pub fn credential_overrides(&self) -> CredentialOverrides {
        CredentialOverrides {
            api_key: self.api_key.clone(),
            api_secret: self.api_secret.clone(),
        }
    }

    /// Picks the single thing this invocation does; test, balance, order lookup
    /// and symbol info take precedence over placing an order.
    pub fn action(&self) -> BotResult<Action> {
        if self.test {
            return Ok(Action::TestConnection);
        }
        if self.balance {
            return Ok(Action::Balance);
        }
        if let Some(order_id) = self.order_id {
            return Ok(Action::OrderStatus {
                symbol: required(&self.symbol, "--symbol")?,
                order_id,
            });
        }
        if self.info {
            return Ok(Action::SymbolInfo {
                symbol: required(&self.symbol, "--symbol")?,
            });
        }

        Ok(Action::PlaceOrder(OrderArgs {
            symbol: required(&self.symbol, "--symbol")?,
            side: required(&self.side, "--side")?,
            order_type: required(&self.order_type, "--type")?,
            quantity: required(&self.quantity, "--quantity")?,
            price: self.price.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Opt {
        Opt::from_iter(std::iter::once("trading-bot").chain(args.iter().copied()))
    }

    #[test]
    fn order_flags_become_place_order() {
        let opt = parse(&[
            "--symbol", "ethusdt", "--side", "SELL", "--type", "LIMIT", "--quantity", "0.01",
            "--price", "2500",
        ]);

        assert_eq!(
            opt.action().unwrap(),
            Action::PlaceOrder(OrderArgs {
                symbol: "ethusdt".to_string(),
                side: "SELL".to_string(),
                order_type: "LIMIT".to_string(),
                quantity: "0.01".to_string(),
                price: Some("2500".to_string()),
            })
        );
    }

    #[test]
    fn missing_order_flags_are_argument_errors() {
        let err = parse(&["--side", "BUY", "--type", "MARKET", "--quantity", "1"])
            .action()
            .unwrap_err();
        assert!(matches!(&err, BotError::Argument(msg) if msg == "--symbol is required"));

        let err = parse(&["--symbol", "BTCUSDT", "--side", "BUY", "--type", "MARKET"])
            .action()
            .unwrap_err();
        assert!(matches!(&err, BotError::Argument(msg) if msg == "--quantity is required"));
    }

    #[test]
    fn limit_price_is_left_to_the_validator() {
        let action = parse(&[
            "--symbol", "BTCUSDT", "--side", "BUY", "--type", "LIMIT", "--quantity", "1",
        ])
        .action()
        .unwrap();
        assert!(matches!(action, Action::PlaceOrder(OrderArgs { price: None, .. })));
    }

    #[test]
    fn test_and_balance_take_precedence() {
        assert_eq!(
            parse(&["--test", "--balance", "--symbol", "X"]).action().unwrap(),
            Action::TestConnection
        );
        assert_eq!(parse(&["--balance"]).action().unwrap(), Action::Balance);
    }

    #[test]
    fn order_lookup_needs_symbol() {
        assert_eq!(
            parse(&["--order-id", "42", "--symbol", "BTCUSDT"]).action().unwrap(),
            Action::OrderStatus {
                symbol: "BTCUSDT".to_string(),
                order_id: 42,
            }
        );
        assert!(parse(&["--order-id", "42"]).action().is_err());
    }

    #[test]
    fn info_needs_symbol() {
        assert_eq!(
            parse(&["--info", "--symbol", "BTCUSDT"]).action().unwrap(),
            Action::SymbolInfo {
                symbol: "BTCUSDT".to_string()
            }
        );
        assert!(parse(&["--info"]).action().is_err());
    }

    #[test]
    fn credential_overrides_come_from_flags() {
        let opt = parse(&["--test", "--api-key", "k", "--api-secret", "s"]);
        let overrides = opt.credential_overrides();
        assert_eq!(overrides.api_key.as_deref(), Some("k"));
        assert_eq!(overrides.api_secret.as_deref(), Some("s"));
    }
}
