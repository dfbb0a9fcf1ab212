//! Checkout Demo
//!
//! Prices a fixture cart against its catalog and rule set and prints the
//! receipt.
//!
//! Use `-f` to load a fixture set by name
//! Use `-m` to price the cart with member pricing

use std::{io, io::Write, time::Instant};

use anyhow::Result;
use clap::Parser;
use humanize_duration::{Truncate, prelude::DurationExt};

use tally::{
    checkout::price_cart, fixtures::Fixture, units::Membership, utils::DemoCheckoutArgs,
};

/// Checkout Demo
pub fn main() -> Result<()> {
    let args = DemoCheckoutArgs::parse();

    let fixture = Fixture::from_set(&args.fixture)?;

    let membership = if args.member {
        Membership::Member
    } else {
        Membership::Standard
    };

    let start = Instant::now();

    let receipt = price_cart(
        fixture.catalog(),
        fixture.cart(),
        fixture.rules(),
        fixture.threshold(),
        membership,
    )?;

    let elapsed = start.elapsed();

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    receipt.write_to(&mut handle)?;

    for message in receipt.trace() {
        writeln!(handle, " - {message}")?;
    }

    writeln!(
        handle,
        " {} ({}s)",
        elapsed.human(Truncate::Nano),
        elapsed.as_secs_f32()
    )?;

    Ok(())
}
