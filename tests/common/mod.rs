//! Common test utilities

use ledgerbank::auth::CustomerId;
use ledgerbank::rates::FixedRateSource;
use ledgerbank::{Bank, Config};
use rust_decimal_macros::dec;

pub const ALICE_EMAIL: &str = "alice@example.com";
pub const ALICE_PASSWORD: &str = "correct horse battery staple";

/// Bank with the demo currencies recognized and Alice registered.
pub fn seeded_bank() -> (Bank, CustomerId) {
    let bank = Bank::new(Config::default());
    bank.add_currency("USD", "US Dollar", "$");
    bank.add_currency("EUR", "Euro", "€");
    bank.add_currency("GBP", "Pound Sterling", "£");

    let alice = bank
        .register_customer("Alice Smith", ALICE_EMAIL, "+1-555-0100", ALICE_PASSWORD)
        .expect("Failed to register test customer");

    (bank, alice)
}

/// Fixed external source quoting the pairs the tests rely on.
pub fn demo_rate_source() -> FixedRateSource {
    FixedRateSource::new()
        .with_rate("USD", "EUR", dec!(0.9))
        .with_rate("USD", "JPY", dec!(150)) // JPY is not recognized by the bank
        .with_rate("EUR", "USD", dec!(1.1))
}
