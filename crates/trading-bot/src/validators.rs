//! Field-level checks that turn raw command-line input into an [`OrderRequest`].
//!
//! Each check normalizes its field (trimmed, uppercased, decimals without
//! trailing zeros) and fails with a [`ValidationError`] naming the field.
//! [`validate_order_params`] runs them in a fixed order and stops at the
//! first failure.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use interface::{OrderRequest, OrderType, Side};

static SYMBOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]+$").expect("symbol pattern is valid"));

/// Quote currencies of the USDⓈ-M contracts
const QUOTE_SUFFIXES: [&str; 3] = ["USDT", "BUSD", "USDC"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid symbol: {0}")]
    Symbol(String),

    #[error("invalid side: {0}")]
    Side(String),

    #[error("invalid order type: {0}")]
    OrderType(String),

    #[error("invalid quantity: {0}")]
    Quantity(String),

    #[error("invalid price: {0}")]
    Price(String),
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Symbol(_) => "symbol",
            ValidationError::Side(_) => "side",
            ValidationError::OrderType(_) => "type",
            ValidationError::Quantity(_) => "quantity",
            ValidationError::Price(_) => "price",
        }
    }
}

pub fn validate_symbol(symbol: &str) -> Result<String, ValidationError> {
    let symbol = symbol.trim().to_uppercase();

    if symbol.is_empty() {
        return Err(ValidationError::Symbol("symbol cannot be empty".to_string()));
    }
    if !SYMBOL_PATTERN.is_match(&symbol) {
        return Err(ValidationError::Symbol(format!(
            "{symbol} must contain only letters and digits"
        )));
    }

    if !QUOTE_SUFFIXES.iter().any(|quote| symbol.ends_with(quote)) {
        warn!(
            "Symbol {} doesn't end with {} - may be invalid",
            symbol,
            QUOTE_SUFFIXES.join(", ")
        );
    }

    debug!("Symbol validated: {}", symbol);
    Ok(symbol)
}

pub fn validate_side(side: &str) -> Result<Side, ValidationError> {
    let side = side.trim().to_uppercase();

    let parsed = match side.as_str() {
        "" => return Err(ValidationError::Side("side cannot be empty".to_string())),
        "BUY" => Side::Buy,
        "SELL" => Side::Sell,
        _ => {
            return Err(ValidationError::Side(format!(
                "{side}, must be BUY or SELL"
            )))
        }
    };

    debug!("Side validated: {}", parsed);
    Ok(parsed)
}

pub fn validate_order_type(order_type: &str) -> Result<OrderType, ValidationError> {
    let order_type = order_type.trim().to_uppercase();

    let parsed = match order_type.as_str() {
        "" => {
            return Err(ValidationError::OrderType(
                "order type cannot be empty".to_string(),
            ))
        }
        "MARKET" => OrderType::Market,
        "LIMIT" => OrderType::Limit,
        _ => {
            return Err(ValidationError::OrderType(format!(
                "{order_type}, must be MARKET or LIMIT"
            )))
        }
    };

    debug!("Order type validated: {}", parsed);
    Ok(parsed)
}

static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("number pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberError {
    NotANumber,
    OutOfRange,
}

/// Plain (`0.001`) or scientific (`1e-3`) notation, without silent rounding.
///
/// Well-formed numbers that `Decimal` cannot hold exactly (more than 28
/// fractional digits, or beyond `Decimal::MAX`) are `OutOfRange`.
fn parse_number(raw: &str) -> Result<Decimal, NumberError> {
    let raw = raw.trim();
    let parsed = if raw.contains(['e', 'E']) {
        Decimal::from_scientific(raw)
    } else {
        Decimal::from_str_exact(raw)
    };

    match parsed {
        // the mantissa of a scientific value is parsed with rounding
        Ok(value) if value.is_zero() && has_nonzero_digit(raw) => Err(NumberError::OutOfRange),
        Ok(value) => Ok(value),
        Err(_) if NUMBER_PATTERN.is_match(raw) => Err(NumberError::OutOfRange),
        Err(_) => Err(NumberError::NotANumber),
    }
}

fn has_nonzero_digit(raw: &str) -> bool {
    raw.split(['e', 'E'])
        .next()
        .is_some_and(|mantissa| mantissa.bytes().any(|b| matches!(b, b'1'..=b'9')))
}

fn number_message(raw: &str, err: NumberError) -> String {
    match err {
        NumberError::NotANumber => format!("{raw}, must be a number"),
        NumberError::OutOfRange => format!("{raw} is outside the supported range"),
    }
}

pub fn validate_quantity(quantity: &str) -> Result<Decimal, ValidationError> {
    let qty = parse_number(quantity)
        .map_err(|e| ValidationError::Quantity(number_message(quantity.trim(), e)))?;

    if qty <= Decimal::ZERO {
        return Err(ValidationError::Quantity(format!(
            "quantity must be positive, got {qty}"
        )));
    }

    let qty = qty.normalize();
    debug!("Quantity validated: {}", qty);
    Ok(qty)
}

/// MARKET orders drop any supplied price; LIMIT orders require a positive one.
pub fn validate_price(
    price: Option<&str>,
    order_type: OrderType,
) -> Result<Option<Decimal>, ValidationError> {
    let price = price.map(str::trim).filter(|p| !p.is_empty());

    match order_type {
        OrderType::Market => {
            if price.is_some() {
                warn!("Price provided for MARKET order - will be ignored");
            }
            Ok(None)
        }
        OrderType::Limit => {
            let raw = price.ok_or_else(|| {
                ValidationError::Price("price is required for LIMIT orders".to_string())
            })?;
            let prc =
                parse_number(raw).map_err(|e| ValidationError::Price(number_message(raw, e)))?;

            if prc <= Decimal::ZERO {
                return Err(ValidationError::Price(format!(
                    "price must be positive, got {prc}"
                )));
            }

            let prc = prc.normalize();
            debug!("Price validated: {}", prc);
            Ok(Some(prc))
        }
    }
}

fn build_order(
    symbol: &str,
    side: &str,
    order_type: &str,
    quantity: &str,
    price: Option<&str>,
) -> Result<OrderRequest, ValidationError> {
    let symbol = validate_symbol(symbol)?;
    let side = validate_side(side)?;
    let order_type = validate_order_type(order_type)?;
    let quantity = validate_quantity(quantity)?;

    Ok(match validate_price(price, order_type)? {
        Some(price) => OrderRequest::limit(symbol, side, quantity, price),
        None => OrderRequest::market(symbol, side, quantity),
    })
}

/// Validates every field, in order, and builds the normalized request.
pub fn validate_order_params(
    symbol: &str,
    side: &str,
    order_type: &str,
    quantity: &str,
    price: Option<&str>,
) -> Result<OrderRequest, ValidationError> {
    info!("Validating order parameters...");

    match build_order(symbol, side, order_type, quantity, price) {
        Ok(order) => {
            info!("All parameters validated successfully");
            Ok(order)
        }
        Err(e) => {
            error!("Validation failed: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn alphanumeric_symbols_pass() {
        for symbol in ["BTCUSDT", "ETHUSDT", "1000PEPEUSDT", "BTCUSDC", "ABC", "X1"] {
            assert_eq!(validate_symbol(symbol).unwrap(), symbol);
        }
    }

    #[test]
    fn symbols_are_trimmed_and_uppercased() {
        assert_eq!(validate_symbol("  ethusdt ").unwrap(), "ETHUSDT");
    }

    #[test]
    fn malformed_symbols_fail() {
        for symbol in ["", "   ", "BTC-USDT", "BTC/USDT", "BTC USDT", "BTC_USDT", "ÉTHUSDT"] {
            let err = validate_symbol(symbol).unwrap_err();
            assert_eq!(err.field(), "symbol", "{symbol:?} should be rejected");
        }
    }

    #[test]
    fn unusual_quote_is_only_a_warning() {
        assert_eq!(validate_symbol("ETHBTC").unwrap(), "ETHBTC");
    }

    #[test]
    fn side_is_case_insensitive() {
        assert_eq!(validate_side("buy").unwrap(), Side::Buy);
        assert_eq!(validate_side("Sell").unwrap(), Side::Sell);
        assert_eq!(validate_side("HOLD").unwrap_err().field(), "side");
        assert_eq!(validate_side("").unwrap_err().field(), "side");
    }

    #[test]
    fn order_type_is_case_insensitive() {
        assert_eq!(validate_order_type("market").unwrap(), OrderType::Market);
        assert_eq!(validate_order_type("LIMIT").unwrap(), OrderType::Limit);
        assert_eq!(validate_order_type("STOP").unwrap_err().field(), "type");
        assert_eq!(validate_order_type(" ").unwrap_err().field(), "type");
    }

    #[test]
    fn positive_quantities_pass() {
        assert_eq!(validate_quantity("0.001").unwrap(), dec!(0.001));
        assert_eq!(validate_quantity("2.500").unwrap(), dec!(2.5));
        assert_eq!(validate_quantity("1e-3").unwrap(), dec!(0.001));
        assert_eq!(validate_quantity(" 10 ").unwrap(), dec!(10));
    }

    #[test]
    fn zero_negative_and_non_numeric_quantities_fail() {
        for qty in ["0", "0.000", "-1", "-0.5", "abc", "", "1.2.3", "NaN"] {
            let err = validate_quantity(qty).unwrap_err();
            assert_eq!(err.field(), "quantity", "{qty:?} should be rejected");
        }
    }

    #[test]
    fn loose_numeric_spellings_pass() {
        assert_eq!(validate_quantity(".5").unwrap(), dec!(0.5));
        assert_eq!(validate_quantity("5.").unwrap(), dec!(5));
        assert_eq!(validate_quantity("+2").unwrap(), dec!(2));
        assert_eq!(validate_quantity("1E3").unwrap(), dec!(1000));
    }

    #[test]
    fn unrepresentable_quantities_are_out_of_range() {
        let tiny = "0.00000000000000000000000000001";
        for qty in [tiny, "1e-30", "1e30", "100000000000000000000000000000"] {
            match validate_quantity(qty).unwrap_err() {
                ValidationError::Quantity(msg) => {
                    assert_eq!(msg, format!("{qty} is outside the supported range"))
                }
                other => panic!("unexpected error for {qty}: {other:?}"),
            }
        }
    }

    #[test]
    fn unrepresentable_prices_are_out_of_range() {
        for price in ["0.00000000000000000000000000001", "1e-30", "1e30"] {
            match validate_price(Some(price), OrderType::Limit).unwrap_err() {
                ValidationError::Price(msg) => {
                    assert_eq!(msg, format!("{price} is outside the supported range"))
                }
                other => panic!("unexpected error for {price}: {other:?}"),
            }
        }
        assert_eq!(
            validate_price(Some("cheap"), OrderType::Limit).unwrap_err(),
            ValidationError::Price("cheap, must be a number".to_string())
        );
    }

    #[test]
    fn market_price_is_ignored() {
        assert_eq!(validate_price(Some("2500"), OrderType::Market).unwrap(), None);
        assert_eq!(validate_price(Some("-1"), OrderType::Market).unwrap(), None);
        assert_eq!(validate_price(None, OrderType::Market).unwrap(), None);
    }

    #[test]
    fn limit_price_must_be_present_and_positive() {
        assert_eq!(
            validate_price(Some("2500.0"), OrderType::Limit).unwrap(),
            Some(dec!(2500))
        );
        for price in [None, Some(""), Some("0"), Some("-10"), Some("cheap")] {
            let err = validate_price(price, OrderType::Limit).unwrap_err();
            assert_eq!(err.field(), "price", "{price:?} should be rejected");
        }
    }

    #[test]
    fn market_buy_scenario() {
        let order = validate_order_params("BTCUSDT", "buy", "market", "0.001", None).unwrap();
        assert_eq!(order, OrderRequest::market("BTCUSDT", Side::Buy, dec!(0.001)));
    }

    #[test]
    fn market_order_drops_supplied_price() {
        let order =
            validate_order_params("BTCUSDT", "BUY", "MARKET", "0.001", Some("50000")).unwrap();
        assert_eq!(order.price(), None);
    }

    #[test]
    fn limit_sell_scenario() {
        let order =
            validate_order_params("ethusdt", "SELL", "LIMIT", "0.01", Some("2500")).unwrap();

        assert_eq!(order.symbol(), "ETHUSDT");
        assert_eq!(order.side(), Side::Sell);
        assert_eq!(order.order_type(), OrderType::Limit);
        assert_eq!(order.quantity(), dec!(0.01));
        assert_eq!(order.price(), Some(dec!(2500)));
    }

    #[test]
    fn limit_without_price_names_price() {
        let err = validate_order_params("BTCUSDT", "BUY", "LIMIT", "1", None).unwrap_err();
        assert_eq!(err.field(), "price");
        assert!(err.to_string().contains("price"));
    }

    #[test]
    fn first_invalid_field_is_reported() {
        let err = validate_order_params("BTC-USDT", "HOLD", "STOP", "-1", None).unwrap_err();
        assert_eq!(err.field(), "symbol");

        let err = validate_order_params("BTCUSDT", "BUY", "STOP", "-1", None).unwrap_err();
        assert_eq!(err.field(), "type");
    }

    #[test]
    fn normalized_fields_round_trip() {
        let order = validate_order_params("solusdt", "sell", "limit", "3", Some("150.25")).unwrap();
        let again = validate_order_params(
            order.symbol(),
            order.side().as_str(),
            order.order_type().as_str(),
            &order.quantity().to_string(),
            order.price().map(|p| p.to_string()).as_deref(),
        )
        .unwrap();
        assert_eq!(order, again);
    }
}
