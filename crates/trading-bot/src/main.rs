use std::process::ExitCode;

use color_eyre::eyre;
use structopt::StructOpt;
use tracing::{error, info};

use trading_bot::cli::{Action, Opt};
use trading_bot::config::{self, Settings};
use trading_bot::{display, logger, BotError, BotResult, OrderManager};

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<ExitCode> {
    // init error reporting
    color_eyre::install()?;
    dotenv::dotenv().ok();

    let opt = Opt::from_args();

    // init logging; the guard flushes the log file when main returns
    let _guards = logger::init_tracing(&config::log_dir(opt.log_dir.clone()))?;

    println!("\n{}", "=".repeat(60));
    println!("BINANCE FUTURES TRADING BOT (TESTNET)");
    println!("{}", "=".repeat(60));

    match run(&opt).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            report(&e);
            Ok(ExitCode::from(e.exit_code()))
        }
    }
}

async fn run(opt: &Opt) -> BotResult<()> {
    let action = opt.action()?;

    info!("Initializing trading bot...");
    let settings = Settings::load(&opt.credential_overrides())?;
    let client = settings.client()?;
    if client.is_testnet() {
        info!("Binance Futures client initialized (TESTNET)");
    } else {
        info!("Binance Futures client initialized ({})", client.base_url());
    }
    let manager = OrderManager::new(client);

    match action {
        Action::TestConnection => {
            println!("\nTesting API connection...");
            let report = manager.test_connection().await?;
            println!("{}", display::format_connectivity(&report));
        }
        Action::Balance => {
            println!("\nFetching account balance...");
            let balance = manager.account_balance().await?;
            println!("\n{}", display::format_balance(&balance));
        }
        Action::OrderStatus { symbol, order_id } => {
            println!("\nFetching order {order_id}...");
            let order = manager.order_status(&symbol, order_id).await?;
            println!("\n{}", display::format_order_response(&order));
        }
        Action::SymbolInfo { symbol } => {
            let info = manager.symbol_info(&symbol).await?;
            println!("\n{}", display::format_symbol_info(&info));
        }
        Action::PlaceOrder(args) => {
            info!("Placing {} {} order...", args.order_type, args.side);
            manager
                .place_order(
                    &args.symbol,
                    &args.side,
                    &args.order_type,
                    &args.quantity,
                    args.price.as_deref(),
                )
                .await?;
        }
    }

    Ok(())
}

fn report(e: &BotError) {
    match e {
        BotError::Argument(_) => error!("Invalid arguments: {}", e),
        BotError::Validation(_) => error!("Validation error: {}", e),
        BotError::Remote(_) => error!("Binance API error: {}", e),
    }

    println!("\n{}: {}", e.console_prefix(), e);
    if let Some(hint) = e.hint() {
        println!("\n{hint}");
    }
}
