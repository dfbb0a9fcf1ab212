//! Utils

use clap::Parser;

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
pub struct DemoCheckoutArgs {
    /// Fixture set to use for the catalog, cart & rules
    #[clap(short, long, default_value = "market")]
    pub fixture: String,

    /// Price the cart with member pricing
    #[clap(short, long)]
    pub member: bool,
}
