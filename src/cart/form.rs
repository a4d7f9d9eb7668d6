//! Selection-state model for the current step's product context.
//!
//! The engine never owns this state: a [`FormSource`](crate::ports::FormSource)
//! snapshot of it is read on every price recompute and on add-to-cart.

use serde::{Deserialize, Serialize};

/// A single form field within the product context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Label shown to the user, echoed back in validation errors.
    pub label: String,
    /// Current raw value.
    pub value: String,
    /// Required fields must be non-blank for assembly to proceed.
    pub required: bool,
    /// When set, the trimmed value is attached to the main line item as
    /// a property under this name.
    pub property_name: Option<String>,
}

impl FormField {
    pub fn required(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            required: true,
            property_name: None,
        }
    }

    pub fn property(
        label: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            required: false,
            property_name: Some(name.into()),
        }
    }
}

/// Kind of an add-on group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonKind {
    /// Secondary products: one item per selected entry, entry quantity.
    Product,
    /// Services: one item per selected entry, quantity fixed at 1,
    /// synthesized service properties.
    Service,
}

/// One selectable entry within an add-on group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonEntry {
    pub variant_id: u64,
    /// Quantity attribute; 0 means "unset" and is treated as 1.
    pub quantity: u32,
    pub selected: bool,
    /// Declared unit price in minor currency units; entries without one
    /// do not contribute to the running total.
    pub unit_price_cents: Option<u64>,
    /// Service type tag, used only by service groups.
    pub service_type: Option<String>,
    /// Optional display name, attached as a property on service items.
    pub display_name: Option<String>,
}

impl AddonEntry {
    pub fn new(variant_id: u64) -> Self {
        Self {
            variant_id,
            quantity: 1,
            selected: false,
            unit_price_cents: None,
            service_type: None,
            display_name: None,
        }
    }
}

/// A group of add-on entries, traversed in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonGroup {
    pub kind: AddonKind,
    pub entries: Vec<AddonEntry>,
}

/// Snapshot of the scoped form region for the current step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    /// Explicitly selected main variant.
    pub variant_id: Option<u64>,
    /// Fallback default when no explicit selection exists.
    pub default_variant_id: Option<u64>,
    /// Main quantity; 0 means "unset" and is treated as 1.
    pub quantity: u32,
    /// Main unit price in minor currency units.
    pub unit_price_cents: u64,
    pub fields: Vec<FormField>,
    pub addon_groups: Vec<AddonGroup>,
}
