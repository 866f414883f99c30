use tracing::{error, info};

use exchanges::FuturesExchange;
use interface::{AccountBalance, ConnectivityReport, OrderRequest, OrderResponse, SymbolInfo};

use crate::display;
use crate::error::{BotError, BotResult};
use crate::validators::{self, ValidationError};

/// Validates, submits and reports orders through any [`FuturesExchange`].
pub struct OrderManager<E> {
    exchange: E,
}

impl<E: FuturesExchange> OrderManager<E> {
    pub fn new(exchange: E) -> Self {
        info!("OrderManager initialized");
        Self { exchange }
    }

    pub fn exchange(&self) -> &E {
        &self.exchange
    }

    pub async fn place_market_order(
        &self,
        symbol: &str,
        side: &str,
        quantity: &str,
    ) -> BotResult<OrderResponse> {
        info!("=== Placing MARKET Order ===");
        let order = validators::validate_order_params(symbol, side, "MARKET", quantity, None)?;
        self.submit(&order).await
    }

    pub async fn place_limit_order(
        &self,
        symbol: &str,
        side: &str,
        quantity: &str,
        price: &str,
    ) -> BotResult<OrderResponse> {
        info!("=== Placing LIMIT Order ===");
        let order =
            validators::validate_order_params(symbol, side, "LIMIT", quantity, Some(price))?;
        self.submit(&order).await
    }

    /// Validates all fields, then routes on the normalized order type.
    pub async fn place_order(
        &self,
        symbol: &str,
        side: &str,
        order_type: &str,
        quantity: &str,
        price: Option<&str>,
    ) -> BotResult<OrderResponse> {
        let order = validators::validate_order_params(symbol, side, order_type, quantity, price)?;
        info!("=== Placing {} Order ===", order.order_type());
        self.submit(&order).await
    }

    /// Prints the request, makes the single remote call, prints the outcome.
    pub async fn submit(&self, order: &OrderRequest) -> BotResult<OrderResponse> {
        println!("\n{}", display::format_order_summary(order));
        info!("Order summary: {:?}", order);

        let response = self.exchange.place_order(order).await.map_err(|e| {
            error!("Failed to place {} order: {}", order.order_type(), e);
            BotError::from(e)
        })?;

        println!("\n{}", display::format_order_response(&response));
        info!(
            "Order response printed: Order ID {}",
            response
                .order_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "N/A".to_string())
        );
        Ok(response)
    }

    pub async fn test_connection(&self) -> BotResult<ConnectivityReport> {
        self.exchange.check_connectivity().await.map_err(|e| {
            error!("Connection test failed: {}", e);
            e.into()
        })
    }

    pub async fn account_balance(&self) -> BotResult<AccountBalance> {
        self.exchange.account_balance().await.map_err(|e| {
            error!("Failed to get account balance: {}", e);
            e.into()
        })
    }

    /// Trading rules for a listed symbol; an unlisted one is a validation failure.
    pub async fn symbol_info(&self, symbol: &str) -> BotResult<SymbolInfo> {
        let symbol = validators::validate_symbol(symbol)?;
        let info = self.exchange.symbol_info(&symbol).await.map_err(|e| {
            error!("Failed to get symbol info: {}", e);
            BotError::from(e)
        })?;

        info.ok_or_else(|| {
            ValidationError::Symbol(format!("{symbol} is not listed on the exchange")).into()
        })
    }

    pub async fn order_status(&self, symbol: &str, order_id: u64) -> BotResult<OrderResponse> {
        let symbol = validators::validate_symbol(symbol)?;
        self.exchange
            .order_status(&symbol, order_id)
            .await
            .map_err(|e| {
                error!("Failed to get order status: {}", e);
                e.into()
            })
    }
}
