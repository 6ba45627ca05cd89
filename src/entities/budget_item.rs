//! Line items embedded in budget requests and purchase orders.
//!
//! Items are never persisted on their own. They live in JSON columns and are
//! decoded into these types at the database edge, so the workflow code only ever
//! sees a typed, ordered sequence.

use super::product;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// One product line with a price snapshot taken at submission time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub product_id: String,
    pub product_name: String,
    pub product_image: String,
    pub unit: String,
    /// Unit price at the time of the snapshot
    pub price: i64,
    pub qty: u32,
    /// Always `price * qty`
    pub total: i64,
}

impl BudgetItem {
    /// Snapshots a catalogue product with the requested quantity.
    #[must_use]
    pub fn from_product(product: &product::Model, qty: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            product_image: product.image_url.clone(),
            unit: product.unit.clone(),
            price: product.price,
            qty,
            total: line_total(product.price, qty),
        }
    }

    /// Replaces the quantity and recomputes the line total.
    pub fn set_qty(&mut self, qty: u32) {
        self.qty = qty;
        self.total = line_total(self.price, qty);
    }

    /// Adds another occurrence of the same product onto this line.
    pub fn absorb(&mut self, other: &Self) {
        self.qty = self.qty.saturating_add(other.qty);
        self.total = self.total.saturating_add(other.total);
    }
}

/// `price * qty`, saturating instead of wrapping on absurd inputs.
#[must_use]
pub fn line_total(price: i64, qty: u32) -> i64 {
    price.saturating_mul(i64::from(qty))
}

/// Ordered item collection stored as a JSON column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct BudgetItems(pub Vec<BudgetItem>);

impl BudgetItems {
    /// Sum of the line totals, saturating like [`line_total`].
    #[must_use]
    pub fn grand_total(&self) -> i64 {
        self.0
            .iter()
            .fold(0, |total, item| total.saturating_add(item.total))
    }

    /// Iterates over the lines in stored order.
    pub fn iter(&self) -> std::slice::Iter<'_, BudgetItem> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<BudgetItem>> for BudgetItems {
    fn from(items: Vec<BudgetItem>) -> Self {
        Self(items)
    }
}

/// Identifiers of the budget requests a purchase order was built from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct RelatedBudgetIds(pub Vec<String>);

impl RelatedBudgetIds {
    #[must_use]
    pub fn contains(&self, budget_id: &str) -> bool {
        self.0.iter().any(|id| id == budget_id)
    }
}
