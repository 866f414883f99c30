use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use interface::{
    AccountBalance, ConnectivityReport, ExchangeError, LotSizeFilter, OrderRequest, OrderResponse,
    SymbolInfo,
};

use super::{generate_signature, get_timestamp, BinanceClient};
use crate::FuturesExchange;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerTime {
    server_time: i64,
}

#[derive(Debug, Deserialize)]
struct BinanceErrorBody {
    code: i64,
    msg: String,
}

#[derive(Debug, Deserialize)]
struct ExchangeInfo {
    symbols: Vec<RawSymbol>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSymbol {
    symbol: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    base_asset: String,
    #[serde(default)]
    quote_asset: String,
    #[serde(default)]
    price_precision: u32,
    #[serde(default)]
    quantity_precision: u32,
    #[serde(default)]
    filters: Vec<serde_json::Value>,
}

/// Query parameters for `POST /fapi/v1/order`, before timestamp and signature.
///
/// LIMIT orders get `price` and the good-till-cancelled default; MARKET orders get neither.
pub fn order_query(order: &OrderRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("symbol", order.symbol().to_string()),
        ("side", order.side().to_string()),
        ("type", order.order_type().to_string()),
        ("quantity", order.quantity().to_string()),
    ];

    if let Some(price) = order.price() {
        params.push(("price", price.to_string()));
    }
    if let Some(tif) = order.time_in_force() {
        params.push(("timeInForce", tif.to_string()));
    }

    params
}

fn encode_params(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Maps a non-2xx body to an API error, keeping the exchange's code when it sent one.
pub(crate) fn api_error(status: u16, body: &str) -> ExchangeError {
    match serde_json::from_str::<BinanceErrorBody>(body) {
        Ok(err) => ExchangeError::Api {
            status,
            code: Some(err.code),
            message: err.msg,
        },
        Err(_) => ExchangeError::Api {
            status,
            code: None,
            message: body.chars().take(200).collect(),
        },
    }
}

fn decode<T: DeserializeOwned>(what: &str, body: &str) -> Result<T, ExchangeError> {
    serde_json::from_str(body).map_err(|e| {
        ExchangeError::Decode(format!(
            "{what}: {e}, response: {}",
            body.chars().take(200).collect::<String>()
        ))
    })
}

fn parse_decimal(filter: &serde_json::Value, key: &str) -> Option<Decimal> {
    filter
        .get(key)
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse::<Decimal>().ok())
}

impl RawSymbol {
    fn into_symbol_info(self) -> SymbolInfo {
        let mut lot_size = None;
        let mut tick_size = None;

        for filter in &self.filters {
            match filter.get("filterType").and_then(|v| v.as_str()) {
                Some("LOT_SIZE") => {
                    lot_size = Some(LotSizeFilter {
                        min_qty: parse_decimal(filter, "minQty").unwrap_or(Decimal::ZERO),
                        max_qty: parse_decimal(filter, "maxQty").unwrap_or(Decimal::MAX),
                        step_size: parse_decimal(filter, "stepSize").unwrap_or(Decimal::ONE),
                    });
                }
                Some("PRICE_FILTER") => {
                    tick_size = parse_decimal(filter, "tickSize");
                }
                _ => {}
            }
        }

        SymbolInfo {
            symbol: self.symbol,
            status: self.status,
            base_asset: self.base_asset,
            quote_asset: self.quote_asset,
            price_precision: self.price_precision,
            quantity_precision: self.quantity_precision,
            lot_size,
            tick_size,
        }
    }
}

impl BinanceClient {
    /// Signed query string: params, then `timestamp`, `recvWindow` and `signature`.
    fn signed_query(&self, params: &[(&str, String)]) -> String {
        let mut query = encode_params(params);
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(&format!(
            "timestamp={}&recvWindow={}",
            get_timestamp(),
            self.recv_window
        ));

        let signature = generate_signature(&query, &self.api_secret);
        format!("{query}&signature={signature}")
    }

    async fn send_public(&self, endpoint: &str) -> Result<String, ExchangeError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.http.get(&url).send().await?;
        read_body(response).await
    }

    async fn send_signed(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<String, ExchangeError> {
        let url = format!("{}{}?{}", self.base_url, endpoint, self.signed_query(params));

        let response = self
            .http
            .request(method, &url)
            .header("X-MBX-APIKEY", self.api_key.as_str())
            .send()
            .await?;

        read_body(response).await
    }
}

async fn read_body(response: reqwest::Response) -> Result<String, ExchangeError> {
    let status = response.status();
    let response_text = response.text().await?;

    if !status.is_success() {
        return Err(api_error(status.as_u16(), &response_text));
    }

    Ok(response_text)
}

#[async_trait]
impl FuturesExchange for BinanceClient {
    async fn server_time(&self) -> Result<DateTime<Utc>, ExchangeError> {
        let body = self.send_public("/fapi/v1/time").await?;
        let time: ServerTime = decode("server time", &body)?;

        DateTime::from_timestamp_millis(time.server_time).ok_or_else(|| {
            ExchangeError::Decode(format!("server time out of range: {}", time.server_time))
        })
    }

    async fn check_connectivity(&self) -> Result<ConnectivityReport, ExchangeError> {
        info!("Testing API connection...");
        let server_time = self.server_time().await?;
        info!("Server time: {}", server_time);

        let balance = self.account_balance().await?;
        info!("API authentication successful");

        Ok(ConnectivityReport {
            server_time,
            total_wallet_balance: balance.total_wallet_balance,
        })
    }

    async fn account_balance(&self) -> Result<AccountBalance, ExchangeError> {
        debug!("Fetching account balance");
        let body = self
            .send_signed(Method::GET, "/fapi/v2/account", &[])
            .await?;
        let balance: AccountBalance = decode("account", &body)?;

        debug!("Account balance: {:?}", balance);
        Ok(balance)
    }

    async fn symbol_info(&self, symbol: &str) -> Result<Option<SymbolInfo>, ExchangeError> {
        debug!("Fetching symbol info for {}", symbol);
        let body = self.send_public("/fapi/v1/exchangeInfo").await?;
        let info: ExchangeInfo = decode("exchangeInfo", &body)?;

        let found = info
            .symbols
            .into_iter()
            .find(|s| s.symbol == symbol)
            .map(RawSymbol::into_symbol_info);

        match &found {
            Some(s) => debug!("Symbol {} found: {}", s.symbol, s.status),
            None => warn!("Symbol {} not found in exchange info", symbol),
        }
        Ok(found)
    }

    async fn place_order(&self, order: &OrderRequest) -> Result<OrderResponse, ExchangeError> {
        let params = order_query(order);
        info!(
            "Placing {} {} order for {}",
            order.order_type(),
            order.side(),
            order.symbol()
        );
        debug!("Final order parameters: {}", encode_params(&params));

        let body = match self
            .send_signed(Method::POST, "/fapi/v1/order", &params)
            .await
        {
            Ok(body) => body,
            Err(e) => {
                error!("Failed order params: {}", encode_params(&params));
                return Err(e);
            }
        };

        let response: OrderResponse = decode("order response", &body)?;
        info!(
            "Order placed successfully: Order ID {}",
            response
                .order_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "N/A".to_string())
        );
        debug!("Order response: {}", body);

        Ok(response)
    }

    async fn order_status(
        &self,
        symbol: &str,
        order_id: u64,
    ) -> Result<OrderResponse, ExchangeError> {
        debug!("Fetching order status: {}", order_id);
        let params = [("symbol", symbol.to_string()), ("orderId", order_id.to_string())];
        let body = self
            .send_signed(Method::GET, "/fapi/v1/order", &params)
            .await?;

        let order: OrderResponse = decode("order status", &body)?;
        debug!("Order status: {:?}", order.status);
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interface::Side;
    use rust_decimal_macros::dec;

    #[test]
    fn market_query_has_no_price_or_time_in_force() {
        let order = OrderRequest::market("BTCUSDT", Side::Buy, dec!(0.001));
        assert_eq!(
            encode_params(&order_query(&order)),
            "symbol=BTCUSDT&side=BUY&type=MARKET&quantity=0.001"
        );
    }

    #[test]
    fn limit_query_carries_price_and_gtc() {
        let order = OrderRequest::limit("ETHUSDT", Side::Sell, dec!(0.01), dec!(2500));
        assert_eq!(
            encode_params(&order_query(&order)),
            "symbol=ETHUSDT&side=SELL&type=LIMIT&quantity=0.01&price=2500&timeInForce=GTC"
        );
    }

    #[test]
    fn signed_query_appends_timestamp_window_and_signature() {
        let client = BinanceClient::new("key", "secret")
            .unwrap()
            .with_recv_window(5000);
        let query = client.signed_query(&[("symbol", "BTCUSDT".to_string())]);

        let (unsigned, signature) = query.rsplit_once("&signature=").unwrap();
        assert!(unsigned.starts_with("symbol=BTCUSDT&timestamp="));
        assert!(unsigned.ends_with("&recvWindow=5000"));
        assert_eq!(signature, generate_signature(unsigned, "secret"));

        let bare = client.signed_query(&[]);
        assert!(bare.starts_with("timestamp="));
    }

    #[test]
    fn api_error_keeps_exchange_code() {
        match api_error(400, r#"{"code":-1121,"msg":"Invalid symbol."}"#) {
            ExchangeError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, Some(-1121));
                assert_eq!(message, "Invalid symbol.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn api_error_falls_back_to_truncated_body() {
        let body = "x".repeat(500);
        match api_error(503, &body) {
            ExchangeError::Api { code, message, .. } => {
                assert_eq!(code, None);
                assert_eq!(message.len(), 200);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn symbol_filters_are_extracted() {
        let raw: RawSymbol = serde_json::from_str(
            r#"{
                "symbol": "BTCUSDT",
                "status": "TRADING",
                "baseAsset": "BTC",
                "quoteAsset": "USDT",
                "pricePrecision": 2,
                "quantityPrecision": 3,
                "filters": [
                    {"filterType": "PRICE_FILTER", "minPrice": "556.80", "maxPrice": "4529764", "tickSize": "0.10"},
                    {"filterType": "LOT_SIZE", "minQty": "0.001", "maxQty": "1000", "stepSize": "0.001"},
                    {"filterType": "MIN_NOTIONAL", "notional": "100"}
                ]
            }"#,
        )
        .unwrap();

        let info = raw.into_symbol_info();
        assert!(info.is_trading());
        assert_eq!(info.quote_asset, "USDT");
        assert_eq!(info.tick_size, Some(dec!(0.10)));
        assert_eq!(
            info.lot_size,
            Some(LotSizeFilter {
                min_qty: dec!(0.001),
                max_qty: dec!(1000),
                step_size: dec!(0.001),
            })
        );
    }
}
