//! ledgerbank - Multi-currency retail banking ledger engine
//!
//! Demo driver: seeds a small bank, walks one customer through deposits,
//! withdrawals, interest accrual and a cross-currency transfer, then prints
//! statements, analytics and the audit-chain verification result.

use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledgerbank::account::AccountKind;
use ledgerbank::auth::SignedTokenIssuer;
use ledgerbank::rates::FixedRateSource;
use ledgerbank::{Amount, Bank, Config};

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerbank=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(environment = %config.environment, "Starting ledgerbank demo");

    let bank = Bank::new(config);
    bank.add_currency("USD", "US Dollar", "$");
    bank.add_currency("EUR", "Euro", "€");

    let alice = bank.register_customer(
        "Alice Smith",
        "alice@example.com",
        "+1-555-0100",
        "correct horse battery staple",
    )?;

    let savings = bank.create_account_with(
        &alice,
        AccountKind::savings(Decimal::new(1, 2))?, // 1% interest
        "USD",
        Decimal::new(1000, 0),
    )?;
    let checking = bank.create_account_with(
        &alice,
        AccountKind::checking(Decimal::new(100, 0))?, // 100 EUR overdraft
        "EUR",
        Decimal::new(500, 0),
    )?;

    // Everyday operations
    bank.deposit(&savings, Amount::from_integer(500)?)?;
    bank.withdraw(&checking, Amount::from_integer(200)?)?;
    bank.apply_interest(&savings)?;

    // Pull fresh exchange rates from the (fixed) external source
    let source = FixedRateSource::new()
        .with_rate("USD", "EUR", Decimal::new(9, 1))
        .with_rate("EUR", "USD", Decimal::new(11, 1));
    bank.refresh_rates(&source, "USD").await?;
    bank.refresh_rates(&source, "EUR").await?;

    // Move 300 USD into the EUR checking account
    let receipt = bank.transfer(&savings, &checking, Amount::from_integer(300)?)?;
    tracing::info!(
        transfer = %receipt.transfer_id,
        rate = %receipt.rate,
        converted = %receipt.converted_amount,
        "Cross-currency transfer settled"
    );

    // Login round trip against the token capability
    let issuer = SignedTokenIssuer::random();
    let token = bank
        .login("alice@example.com", "correct horse battery staple", &issuer)
        .await?;
    let authenticated = bank.authenticate(&token, &issuer).await?;
    tracing::info!(customer = %authenticated, "Token verified");

    println!("{}\n", bank.statement(&savings)?);
    println!("{}\n", bank.statement(&checking)?);

    let analytics = bank.generate_analytics(&alice)?;
    println!(
        "analytics (unconverted): total {}, transactions {}, average {}",
        analytics.total_balance,
        analytics.total_transaction_count,
        analytics.average_transaction_amount
    );
    let in_usd = bank.generate_analytics_in(&alice, "USD")?;
    println!("analytics (in USD): total {}", in_usd.total_balance);

    let verification = bank.audit().verify_chain();
    tracing::info!(
        entries = verification.entries_checked,
        valid = verification.is_valid,
        "Audit chain verified"
    );

    Ok(())
}
