//! Cart Fixtures

use serde::Deserialize;

use crate::cart::Cart;

/// Wrapper for a cart in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart lines, in order
    pub lines: Vec<CartLineFixture>,
}

/// One cart line in YAML
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// SKU of the line
    pub sku: String,

    /// Quantity of the line
    pub quantity: i64,
}

impl From<CartFixture> for Cart {
    fn from(fixture: CartFixture) -> Self {
        let mut cart = Cart::new();

        for line in fixture.lines {
            cart.add(line.sku, line.quantity);
        }

        cart
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_fixture_preserves_line_order() -> Result<(), serde_norway::Error> {
        let yaml = "
lines:
  - sku: B
    quantity: 1
  - sku: A
    quantity: 2
";

        let fixture: CartFixture = serde_norway::from_str(yaml)?;
        let cart = Cart::from(fixture);

        let lines: Vec<(&str, i64)> = cart.iter().map(|l| (l.sku(), l.quantity())).collect();

        assert_eq!(lines, vec![("B", 1), ("A", 2)]);

        Ok(())
    }
}
