use crate::keyword::record_matches;
use crate::schema::{amount_of, Product};
use crate::series::reduce_series;
use crate::temporal::{Dated, ReportingWindow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Cumulative movement totals for one product name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockTotals {
    pub restocked: f64,
    pub sold: f64,
    pub first_restocked_at: Option<DateTime<Utc>>,
}

impl StockTotals {
    /// May be negative when a product is over-sold; surfaced as-is, since
    /// clamping would hide a data-entry error.
    pub fn balance(&self) -> f64 {
        self.restocked - self.sold
    }
}

/// Name-keyed running totals over the product collection, built once per
/// snapshot and shared read-only by every consumer of an aggregation pass.
///
/// [`RunningTotalsIndex::build`] is a pure function: a data change means
/// building a new index, never mutating an existing one, so no reader can
/// observe a half-updated state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningTotalsIndex {
    totals: BTreeMap<String, StockTotals>,
}

impl RunningTotalsIndex {
    /// One pass over the products, reducing each embedded restock and sale
    /// series without a window: the totals are lifetime-cumulative.
    pub fn build(products: &[Product]) -> Self {
        let everything = ReportingWindow::unbounded();
        let mut totals: BTreeMap<String, StockTotals> = BTreeMap::new();

        for product in products {
            let entry = totals.entry(product.name.clone()).or_default();
            entry.restocked += reduce_series(&product.quantity_restocked, &everything);
            entry.sold += reduce_series(&product.quantity_sold, &everything);

            if entry.first_restocked_at.is_none() {
                entry.first_restocked_at = product
                    .quantity_restocked
                    .first()
                    .map(|event| event.recorded_at());
            }
        }

        Self { totals }
    }

    pub fn totals(&self, name: &str) -> Option<&StockTotals> {
        self.totals.get(name)
    }

    pub fn restocked(&self, name: &str) -> f64 {
        self.totals.get(name).map_or(0.0, |t| t.restocked)
    }

    pub fn sold(&self, name: &str) -> f64 {
        self.totals.get(name).map_or(0.0, |t| t.sold)
    }

    pub fn balance(&self, name: &str) -> f64 {
        self.totals.get(name).map_or(0.0, StockTotals::balance)
    }

    pub fn first_restocked_at(&self, name: &str) -> Option<DateTime<Utc>> {
        self.totals.get(name).and_then(|t| t.first_restocked_at)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.totals.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StockTotals)> {
        self.totals.iter().map(|(name, totals)| (name.as_str(), totals))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Per-product line of an inventory valuation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductBalance {
    pub restocked: f64,
    pub sold: f64,
    pub balance: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryValuation {
    pub total_value: f64,
    pub per_product: BTreeMap<String, ProductBalance>,
}

/// Values the stock on hand: `costPrice × (restocked − sold)` per product,
/// over the products retained by the window and keyword.
///
/// The window applies to each product's first restock date. A product that
/// has never been restocked is excluded from bounded queries (there is no
/// date to test) but included when the window is unbounded.
pub fn inventory_valuation(
    products: &[Product],
    index: &RunningTotalsIndex,
    window: &ReportingWindow,
    keyword: Option<&str>,
) -> InventoryValuation {
    let mut valuation = InventoryValuation::default();

    for product in products {
        let retained = match index.first_restocked_at(&product.name) {
            Some(first) => window.contains(first),
            None => window.is_unbounded(),
        };
        if !retained {
            continue;
        }

        if let Some(keyword) = keyword {
            if !record_matches(product, keyword) {
                continue;
            }
        }

        // Duplicate documents for one product name share the same index
        // totals; count the name once.
        if valuation.per_product.contains_key(&product.name) {
            continue;
        }

        let restocked = index.restocked(&product.name);
        let sold = index.sold(&product.name);
        let balance = restocked - sold;
        let value = amount_of(&product.cost_price) * balance;

        valuation.total_value += value;
        valuation.per_product.insert(
            product.name.clone(),
            ProductBalance {
                restocked,
                sold,
                balance,
                value,
            },
        );
    }

    valuation
}
