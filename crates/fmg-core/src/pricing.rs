//! Order pricing.
//!
//! ```text
//! total = bundle.price (if any)
//!       + Σ max(default_price, custom_price) over selected keys not in the bundle
//! ```
//!
//! Custom prices are floor-clamped to the catalog default, never rejected.
//! Keys covered by the bundle contribute nothing individually, whatever
//! custom price was typed for them.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::entities::{Bundle, CatalogService};
use crate::errors::PricingError;

/// One priced line of a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLine {
    pub key: String,
    pub name: String,
    /// Amount this line adds to the total. `0` for bundled keys.
    pub amount: u64,
    pub bundled: bool,
}

/// Itemized result of [`quote`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub lines: Vec<QuoteLine>,
    pub bundle_id: Option<String>,
    pub bundle_price: u64,
    pub total: u64,
}

/// Price charged for a single non-bundled service.
#[must_use]
pub fn effective_price(default_price: u64, custom_price: Option<u64>) -> u64 {
    custom_price.map_or(default_price, |custom| custom.max(default_price))
}

/// Itemize an order.
///
/// # Errors
///
/// Returns [`PricingError::UnknownService`] if a selected key is not in the
/// catalog, or [`PricingError::UnknownBundleService`] if the bundle names a key
/// the catalog does not have.
pub fn quote(
    catalog: &[CatalogService],
    selected: &BTreeSet<String>,
    bundle: Option<&Bundle>,
    custom_prices: &BTreeMap<String, u64>,
) -> Result<Quote, PricingError> {
    let by_key: HashMap<&str, &CatalogService> =
        catalog.iter().map(|s| (s.key.as_str(), s)).collect();

    if let Some(bundle) = bundle {
        if let Some(missing) = bundle
            .service_keys
            .iter()
            .find(|k| !by_key.contains_key(k.as_str()))
        {
            return Err(PricingError::UnknownBundleService {
                bundle: bundle.id.clone(),
                key: missing.clone(),
            });
        }
    }

    let mut lines = Vec::with_capacity(selected.len());
    for key in selected {
        let service = by_key
            .get(key.as_str())
            .ok_or_else(|| PricingError::UnknownService(key.clone()))?;
        let bundled = bundle.is_some_and(|b| b.includes(key));
        let amount = if bundled {
            0
        } else {
            effective_price(service.default_price, custom_prices.get(key).copied())
        };
        lines.push(QuoteLine {
            key: key.clone(),
            name: service.name.clone(),
            amount,
            bundled,
        });
    }

    let bundle_price = bundle.map_or(0, |b| b.price);
    let total = lines
        .iter()
        .fold(bundle_price, |acc, line| acc.saturating_add(line.amount));

    Ok(Quote {
        lines,
        bundle_id: bundle.map(|b| b.id.clone()),
        bundle_price,
        total,
    })
}

/// Order total without the itemization.
///
/// # Errors
///
/// Same as [`quote`].
pub fn order_total(
    catalog: &[CatalogService],
    selected: &BTreeSet<String>,
    bundle: Option<&Bundle>,
    custom_prices: &BTreeMap<String, u64>,
) -> Result<u64, PricingError> {
    quote(catalog, selected, bundle, custom_prices).map(|q| q.total)
}
