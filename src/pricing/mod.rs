//! Price and progress derivation.
//!
//! Everything here is pure: the running total and progress view are
//! recomputed from selection state on demand and are safe to call
//! arbitrarily often.

pub mod money;
pub mod progress;
pub mod variant;

pub use money::{CustomFormatter, MoneyFormatter};
pub use progress::{DotState, ProgressView};

use crate::cart::ProductForm;

/// Running total in minor currency units: main product plus every
/// selected add-on with a declared unit price.
///
/// `main_price_cents` overrides the form's unit price when a
/// variant-change event has reported a newer one.
pub fn total_cents(form: &ProductForm, main_price_cents: Option<u64>) -> u64 {
    let unit = main_price_cents.unwrap_or(form.unit_price_cents);
    let mut total = unit * u64::from(form.quantity.max(1));
    for group in &form.addon_groups {
        for entry in group.entries.iter().filter(|e| e.selected) {
            if let Some(price) = entry.unit_price_cents {
                total += price * u64::from(entry.quantity.max(1));
            }
        }
    }
    total
}
