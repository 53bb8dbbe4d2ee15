//! Session-scoped shopping cart.
//!
//! The cart is a map from product id to a line holding the quantity and the
//! unit price captured when the product was first added. It is stored in the
//! client's session under [`Cart::SESSION_KEY`]; the stored form is a JSON
//! object keyed by product id with `{ "quantity": u32, "price": "12.50" }`
//! values. Monetary math always uses the captured price, never the current
//! catalog price.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::{Session, session};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

/// One product's line: how many units and the unit price captured on first add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

/// The buyer's cart, keyed by product id and stored in the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: BTreeMap<Uuid, CartLine>,
}

/// A cart line joined with the catalog entry it refers to.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartLineView {
    pub product: Product,
    pub quantity: u32,
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    #[schema(value_type = String, example = "59.97")]
    pub total_price: Decimal,
}

impl Cart {
    pub const SESSION_KEY: &'static str = "cart";

    /// Largest quantity a single line may hold.
    pub const MAX_LINE_QUANTITY: u32 = 10_000;

    /// Adds `quantity` units of `product`, or sets the line to exactly
    /// `quantity` when `update_quantity` is true.
    ///
    /// A new line captures the product's current price. Callers validate that
    /// additive quantities are positive. Setting a quantity of zero drops the
    /// line.
    pub fn add(&mut self, product: &Product, quantity: u32, update_quantity: bool) {
        let line = self.lines.entry(product.id).or_insert_with(|| CartLine {
            quantity: 0,
            price: product.price,
        });
        if update_quantity {
            line.quantity = quantity;
        } else {
            line.quantity = line.quantity.saturating_add(quantity);
        }
        if line.quantity == 0 {
            self.lines.remove(&product.id);
        }
    }

    /// Removes the line for `product_id`. Returns whether a line was present.
    pub fn remove(&mut self, product_id: Uuid) -> bool {
        self.lines.remove(&product_id).is_some()
    }

    pub fn line(&self, product_id: Uuid) -> Option<&CartLine> {
        self.lines.get(&product_id)
    }

    pub fn lines(&self) -> impl Iterator<Item = (Uuid, &CartLine)> {
        self.lines.iter().map(|(id, line)| (*id, line))
    }

    pub fn product_ids(&self) -> Vec<Uuid> {
        self.lines.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn item_count(&self) -> u64 {
        self.lines.values().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn total_amount(&self) -> Decimal {
        self.lines
            .values()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum()
    }

    /// Joins the lines with a batch of catalog products.
    ///
    /// Lines whose product is missing from `products` (deleted from the
    /// catalog since it was added) are left out of the view but stay in the
    /// cart.
    pub fn view(&self, products: Vec<Product>) -> Vec<CartLineView> {
        let mut by_id: HashMap<Uuid, Product> =
            products.into_iter().map(|p| (p.id, p)).collect();
        self.lines
            .iter()
            .filter_map(|(id, line)| {
                by_id.remove(id).map(|product| CartLineView {
                    product,
                    quantity: line.quantity,
                    price: line.price,
                    total_price: line.price * Decimal::from(line.quantity),
                })
            })
            .collect()
    }

    /// Loads the cart from the session, starting empty when none is stored.
    pub async fn load(session: &Session) -> Result<Self, session::Error> {
        Ok(session
            .get::<Cart>(Self::SESSION_KEY)
            .await?
            .unwrap_or_default())
    }

    /// Writes the cart back, marking the session as modified.
    pub async fn save(&self, session: &Session) -> Result<(), session::Error> {
        session.insert(Self::SESSION_KEY, self).await
    }

    /// Deletes the cart from the session entirely.
    pub async fn clear(session: &Session) -> Result<(), session::Error> {
        session.remove::<Cart>(Self::SESSION_KEY).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::to_cents;
    use chrono::Utc;
    use std::str::FromStr;

    fn product(price: &str) -> Product {
        Product {
            id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            name: "Widget".into(),
            description: "A widget".into(),
            price: Decimal::from_str(price).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_cart_has_no_items_and_zero_total() {
        let cart = Cart::default();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total_amount(), Decimal::ZERO);
    }

    #[test]
    fn additive_add_accumulates_with_exact_decimals() {
        let p = product("19.99");
        let mut cart = Cart::default();
        cart.add(&p, 3, false);
        cart.add(&p, 2, false);
        assert_eq!(cart.line(p.id).unwrap().quantity, 5);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.total_amount(), Decimal::from_str("99.95").unwrap());
    }

    #[test]
    fn update_replaces_quantity() {
        let p = product("4.00");
        let mut cart = Cart::default();
        cart.add(&p, 2, false);
        cart.add(&p, 3, false);
        assert_eq!(cart.line(p.id).unwrap().quantity, 5);

        let q = product("1.00");
        cart.add(&q, 2, false);
        cart.add(&q, 5, true);
        assert_eq!(cart.line(q.id).unwrap().quantity, 5);
        assert_eq!(cart.item_count(), 10);
    }

    #[test]
    fn updating_to_zero_drops_the_line() {
        let p = product("4.00");
        let mut cart = Cart::default();
        cart.add(&p, 2, false);
        cart.add(&p, 0, true);
        assert!(cart.line(p.id).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn removing_an_absent_product_changes_nothing() {
        let p = product("4.00");
        let mut cart = Cart::default();
        cart.add(&p, 1, false);
        let before = cart.clone();
        assert!(!cart.remove(Uuid::new_v4()));
        assert_eq!(cart, before);
    }

    #[test]
    fn price_is_captured_on_first_add() {
        let mut p = product("10.00");
        let mut cart = Cart::default();
        cart.add(&p, 1, false);

        p.price = Decimal::from_str("12.50").unwrap();
        cart.add(&p, 1, false);
        cart.add(&p, 4, true);

        let line = cart.line(p.id).unwrap();
        assert_eq!(line.price, Decimal::from_str("10.00").unwrap());
        assert_eq!(cart.total_amount(), Decimal::from_str("40.00").unwrap());
    }

    #[test]
    fn view_skips_products_missing_from_catalog() {
        let a = product("10.00");
        let b = product("5.00");
        let mut cart = Cart::default();
        cart.add(&a, 2, false);
        cart.add(&b, 1, false);

        let view = cart.view(vec![a.clone()]);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].product.id, a.id);
        assert_eq!(view[0].total_price, Decimal::from_str("20.00").unwrap());
        // The stale line still counts until it is removed.
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn totals_at_the_price_and_quantity_caps_stay_exact() {
        let mut cart = Cart::default();
        let mut products = Vec::new();
        for _ in 0..250 {
            let mut p = product("1.00");
            p.price = crate::money::MAX_PRICE;
            cart.add(&p, Cart::MAX_LINE_QUANTITY, false);
            products.push(p);
        }

        let per_line = Decimal::from(10_000_000_000_i64);
        assert_eq!(cart.total_amount(), per_line * Decimal::from(250));
        assert_eq!(cart.item_count(), 2_500_000);
        let view = cart.view(products);
        assert!(view.iter().all(|line| line.total_price == per_line));
        assert_eq!(
            to_cents(cart.total_amount()).unwrap(),
            250_000_000_000_000
        );
    }

    #[test]
    fn view_is_restartable() {
        let a = product("3.33");
        let mut cart = Cart::default();
        cart.add(&a, 3, false);
        let first = cart.view(vec![a.clone()]);
        let second = cart.view(vec![a]);
        assert_eq!(first.len(), second.len());
        assert_eq!(first[0].total_price, second[0].total_price);
    }

    #[test]
    fn stored_form_keys_by_product_id_with_string_prices() {
        let p = product("19.99");
        let mut cart = Cart::default();
        cart.add(&p, 2, false);

        let value = serde_json::to_value(&cart).unwrap();
        let line = &value[p.id.to_string()];
        assert_eq!(line["quantity"], 2);
        assert_eq!(line["price"], "19.99");

        let restored: Cart = serde_json::from_value(value).unwrap();
        assert_eq!(restored, cart);
    }
}
