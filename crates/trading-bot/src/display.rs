use std::fmt::{Display, Write};

use rust_decimal::Decimal;

use interface::{AccountBalance, ConnectivityReport, OrderRequest, OrderResponse, SymbolInfo};

const RULE_WIDTH: usize = 50;
const KEY_WIDTH: usize = 14;

/// Statuses that mean the exchange accepted the order
const ACCEPTED_STATUSES: [&str; 3] = ["NEW", "FILLED", "PARTIALLY_FILLED"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Warning(String),
}

pub fn classify(response: &OrderResponse) -> Outcome {
    match response.status.as_deref() {
        Some(status) if ACCEPTED_STATUSES.contains(&status) => Outcome::Success,
        Some(status) => Outcome::Warning(status.to_string()),
        None => Outcome::Warning("UNKNOWN".to_string()),
    }
}

fn header(out: &mut String, title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    let _ = writeln!(out, "{rule}\n{title}\n{rule}");
}

fn footer(out: &mut String) {
    let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
}

fn row(out: &mut String, key: &str, value: impl Display) {
    let _ = writeln!(out, "{:<width$}{}", format!("{key}:"), value, width = KEY_WIDTH);
}

fn or_na<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

pub fn format_order_summary(order: &OrderRequest) -> String {
    let mut out = String::new();
    header(&mut out, "ORDER REQUEST SUMMARY");
    row(&mut out, "Symbol", order.symbol());
    row(&mut out, "Side", order.side());
    row(&mut out, "Type", order.order_type());
    row(&mut out, "Quantity", order.quantity());
    if let Some(price) = order.price() {
        row(&mut out, "Price", price);
    }
    if let Some(tif) = order.time_in_force() {
        row(&mut out, "TimeInForce", tif);
    }
    footer(&mut out);
    out
}

/// Response block followed by the success or warning line
pub fn format_order_response(response: &OrderResponse) -> String {
    let mut out = String::new();
    header(&mut out, "ORDER RESPONSE");
    row(&mut out, "Order ID", or_na(response.order_id));
    row(&mut out, "Symbol", &response.symbol);
    row(&mut out, "Side", or_na(response.side.as_deref()));
    row(&mut out, "Type", or_na(response.order_type.as_deref()));
    row(&mut out, "Status", or_na(response.status.as_deref()));
    row(&mut out, "Quantity", or_na(response.orig_qty));

    if let Some(executed) = positive(response.executed_qty) {
        row(&mut out, "Executed Qty", executed);
    }
    if let Some(avg_price) = positive(response.avg_price) {
        row(&mut out, "Avg Price", avg_price);
    }
    if let Some(price) = positive(response.price) {
        row(&mut out, "Limit Price", price);
    }
    footer(&mut out);

    match classify(response) {
        Outcome::Success => out.push_str("\nOrder placed successfully!\n"),
        Outcome::Warning(status) => {
            let _ = writeln!(out, "\nWarning: order status {status}");
        }
    }
    out
}

pub fn format_balance(balance: &AccountBalance) -> String {
    let mut out = String::from("Account Balance:\n");
    let _ = writeln!(
        out,
        "  Total Wallet Balance: {} USDT",
        balance.total_wallet_balance.normalize()
    );
    let _ = writeln!(
        out,
        "  Available Balance:    {} USDT",
        balance.available_balance.normalize()
    );
    let _ = writeln!(
        out,
        "  Unrealized Profit:    {} USDT",
        balance.total_unrealized_profit.normalize()
    );
    out
}

pub fn format_connectivity(report: &ConnectivityReport) -> String {
    let mut out = String::from("Connection successful!\nAPI credentials are valid\n");
    let _ = writeln!(out, "  Server Time:    {}", report.server_time);
    let _ = writeln!(
        out,
        "  Wallet Balance: {} USDT",
        report.total_wallet_balance.normalize()
    );
    out
}

pub fn format_symbol_info(info: &SymbolInfo) -> String {
    let mut out = String::new();
    header(&mut out, "SYMBOL INFO");
    row(&mut out, "Symbol", &info.symbol);
    row(&mut out, "Status", &info.status);
    row(&mut out, "Base Asset", &info.base_asset);
    row(&mut out, "Quote Asset", &info.quote_asset);
    row(&mut out, "Price Prec.", info.price_precision);
    row(&mut out, "Qty Prec.", info.quantity_precision);
    if let Some(tick) = info.tick_size {
        row(&mut out, "Tick Size", tick.normalize());
    }
    if let Some(lot) = info.lot_size {
        row(&mut out, "Min Qty", lot.min_qty.normalize());
        row(&mut out, "Max Qty", lot.max_qty.normalize());
        row(&mut out, "Step Size", lot.step_size.normalize());
    }
    footer(&mut out);
    out
}
