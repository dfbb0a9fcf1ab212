//! Integration tests for buy-one-get-one rules through the memo solver.

use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use tally::{
    cart::Cart,
    catalog::{Catalog, Product},
    rules::{Rule, RuleKey, bogo::BogoRule},
    solvers::{Solver, memo::MemoSolver},
    units::{Membership, expand},
};

fn catalog() -> Result<Catalog<'static>, Box<dyn std::error::Error>> {
    let mut catalog = Catalog::new(USD);

    catalog.insert(Product::new("A", "Apples", Money::from_minor(3000, USD)))?;
    catalog.insert(Product::new("E", "Eggs", Money::from_minor(5500, USD)))?;

    Ok(catalog)
}

#[test]
fn odd_unit_pays_full_price() -> TestResult {
    let catalog = catalog()?;
    let mut cart = Cart::new();
    cart.add("A", 3);

    let units = expand(&cart, &catalog, Membership::Standard)?;

    let rule = Rule::Bogo(BogoRule::new(RuleKey::default(), "apple pair", &["A"])?);
    let allocation = MemoSolver::solve(&[rule], &units, USD)?;

    // One pair: the charged unit pays 30.00, its partner rides free. The
    // third unit is uncovered and pays 30.00. Total 60.00, not 30.00.
    assert_eq!(allocation.total.to_minor_units(), 6000);
    assert_eq!(allocation.selections.len(), 1);

    let uncovered: Vec<(&str, u32)> = allocation
        .full_price
        .iter()
        .map(|l| (l.sku, l.units))
        .collect();

    assert_eq!(uncovered, vec![("A", 1)]);

    Ok(())
}

#[test]
fn cross_sku_pair_charges_the_higher_price() -> TestResult {
    let catalog = catalog()?;
    let mut cart = Cart::new();
    cart.add("A", 1).add("E", 1);

    let units = expand(&cart, &catalog, Membership::Standard)?;

    let rule = Rule::Bogo(BogoRule::new(
        RuleKey::default(),
        "mix pair",
        &["A", "E"],
    )?);
    let allocation = MemoSolver::solve(&[rule], &units, USD)?;

    // E at 55.00 is charged, A at 30.00 rides free.
    assert_eq!(allocation.total.to_minor_units(), 5500);

    let selection = allocation.selections.first().ok_or("missing selection")?;

    assert!(selection.trace.contains("E pays"));
    assert!(selection.trace.contains("A free"));

    Ok(())
}

#[test]
fn even_units_pair_off_completely() -> TestResult {
    let catalog = catalog()?;
    let mut cart = Cart::new();
    cart.add("A", 4);

    let units = expand(&cart, &catalog, Membership::Standard)?;

    let rule = Rule::Bogo(BogoRule::new(RuleKey::default(), "apple pair", &["A"])?);
    let allocation = MemoSolver::solve(&[rule], &units, USD)?;

    // Two disjoint pairs: 2 * 30.00 = 60.00 for four apples.
    assert_eq!(allocation.total.to_minor_units(), 6000);
    assert_eq!(allocation.selections.len(), 2);
    assert!(allocation.full_price.is_empty());

    Ok(())
}

#[test]
fn single_eligible_unit_stays_at_unit_price() -> TestResult {
    let catalog = catalog()?;
    let mut cart = Cart::new();
    cart.add("A", 1);

    let units = expand(&cart, &catalog, Membership::Standard)?;

    let rule = Rule::Bogo(BogoRule::new(RuleKey::default(), "apple pair", &["A"])?);
    let allocation = MemoSolver::solve(&[rule], &units, USD)?;

    assert_eq!(allocation.total.to_minor_units(), 3000);
    assert!(allocation.selections.is_empty());

    Ok(())
}
