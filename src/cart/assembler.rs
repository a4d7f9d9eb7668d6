//! Cart line-item assembly.
//!
//! Turns a [`ProductForm`] snapshot into the ordered item list for the
//! multi-item cart-add call: main item first, then product add-ons, then
//! service add-ons, in document order within each group. Identical
//! variant ids are never deduplicated here; the cart store sums them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cart::form::{AddonKind, ProductForm};
use crate::config::WizardConfig;
use crate::error::ValidationError;

/// One line item for the cart-add call. Produced fresh per call, never
/// persisted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "id")]
    pub variant_id: u64,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, String>>,
}

impl LineItem {
    pub fn new(variant_id: u64, quantity: u32) -> Self {
        Self {
            variant_id,
            quantity,
            properties: None,
        }
    }
}

/// Assemble the line items for the current form.
///
/// Returns an empty list when no main variant can be resolved; the
/// caller treats that as "nothing to add". The first missing required
/// field aborts assembly with its label.
pub fn assemble(form: &ProductForm, config: &WizardConfig) -> Result<Vec<LineItem>, ValidationError> {
    for field in &form.fields {
        if field.required && field.value.trim().is_empty() {
            return Err(ValidationError::MissingRequired {
                label: field.label.clone(),
            });
        }
    }

    let Some(main_variant) = form
        .variant_id
        .filter(|&v| v > 0)
        .or(form.default_variant_id.filter(|&v| v > 0))
    else {
        return Ok(Vec::new());
    };

    let mut properties = BTreeMap::new();
    for field in &form.fields {
        if let Some(name) = &field.property_name {
            let value = field.value.trim();
            if !value.is_empty() {
                properties.insert(name.clone(), value.to_string());
            }
        }
    }

    let mut items = vec![LineItem {
        variant_id: main_variant,
        quantity: form.quantity.max(1),
        properties: (!properties.is_empty()).then_some(properties),
    }];

    for group in form.addon_groups.iter().filter(|g| g.kind == AddonKind::Product) {
        for entry in group.entries.iter().filter(|e| e.selected && e.variant_id > 0) {
            items.push(LineItem::new(entry.variant_id, entry.quantity.max(1)));
        }
    }

    for group in form.addon_groups.iter().filter(|g| g.kind == AddonKind::Service) {
        for entry in group.entries.iter().filter(|e| e.selected && e.variant_id > 0) {
            let mut props = BTreeMap::new();
            props.insert(
                config.service_type_key.clone(),
                entry.service_type.clone().unwrap_or_else(|| "true".to_string()),
            );
            if let Some(name) = &entry.display_name {
                props.insert(config.service_name_key.clone(), name.clone());
            }
            items.push(LineItem {
                variant_id: entry.variant_id,
                quantity: 1,
                properties: Some(props),
            });
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::form::{AddonEntry, AddonGroup, FormField};

    fn config() -> WizardConfig {
        WizardConfig::default()
    }

    fn service_entry(variant_id: u64, service_type: &str) -> AddonEntry {
        AddonEntry {
            service_type: Some(service_type.to_string()),
            selected: true,
            ..AddonEntry::new(variant_id)
        }
    }

    #[test]
    fn main_then_products_then_services() {
        let form = ProductForm {
            variant_id: Some(100),
            quantity: 2,
            addon_groups: vec![
                AddonGroup {
                    kind: AddonKind::Service,
                    entries: vec![service_entry(300, "assembly")],
                },
                AddonGroup {
                    kind: AddonKind::Product,
                    entries: vec![AddonEntry {
                        selected: true,
                        ..AddonEntry::new(200)
                    }],
                },
            ],
            ..ProductForm::default()
        };

        let items = assemble(&form, &config()).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], LineItem::new(100, 2));
        assert_eq!(items[1], LineItem::new(200, 1));
        assert_eq!(items[2].variant_id, 300);
        assert_eq!(items[2].quantity, 1);
        let props = items[2].properties.as_ref().unwrap();
        assert_eq!(props.get("_service_type").map(String::as_str), Some("assembly"));
    }

    #[test]
    fn first_missing_required_field_wins() {
        let form = ProductForm {
            variant_id: Some(100),
            fields: vec![
                FormField::required("Height", "180"),
                FormField::required("Weight", "   "),
                FormField::required("Age", ""),
            ],
            ..ProductForm::default()
        };

        let err = assemble(&form, &config()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequired {
                label: "Weight".to_string()
            }
        );
    }

    #[test]
    fn no_variant_yields_empty_list() {
        let form = ProductForm::default();
        assert!(assemble(&form, &config()).unwrap().is_empty());

        // Explicit zero is not a valid variant id either.
        let form = ProductForm {
            variant_id: Some(0),
            default_variant_id: Some(0),
            ..ProductForm::default()
        };
        assert!(assemble(&form, &config()).unwrap().is_empty());
    }

    #[test]
    fn falls_back_to_default_variant() {
        let form = ProductForm {
            default_variant_id: Some(77),
            ..ProductForm::default()
        };
        let items = assemble(&form, &config()).unwrap();
        assert_eq!(items[0].variant_id, 77);
        assert_eq!(items[0].quantity, 1);
    }

    #[test]
    fn blank_properties_are_dropped_and_values_trimmed() {
        let form = ProductForm {
            variant_id: Some(100),
            fields: vec![
                FormField::property("Engraving", "engraving", "  Ada  "),
                FormField::property("Gift note", "gift_note", "   "),
            ],
            ..ProductForm::default()
        };

        let items = assemble(&form, &config()).unwrap();
        let props = items[0].properties.as_ref().unwrap();
        assert_eq!(props.get("engraving").map(String::as_str), Some("Ada"));
        assert!(!props.contains_key("gift_note"));
    }

    #[test]
    fn unselected_and_invalid_entries_are_skipped() {
        let form = ProductForm {
            variant_id: Some(100),
            addon_groups: vec![AddonGroup {
                kind: AddonKind::Product,
                entries: vec![
                    AddonEntry::new(200), // not selected
                    AddonEntry {
                        selected: true,
                        ..AddonEntry::new(0) // invalid variant
                    },
                    AddonEntry {
                        selected: true,
                        quantity: 3,
                        ..AddonEntry::new(201)
                    },
                ],
            }],
            ..ProductForm::default()
        };

        let items = assemble(&form, &config()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], LineItem::new(201, 3));
    }

    #[test]
    fn duplicate_variants_are_kept() {
        let form = ProductForm {
            variant_id: Some(100),
            addon_groups: vec![AddonGroup {
                kind: AddonKind::Product,
                entries: vec![
                    AddonEntry {
                        selected: true,
                        ..AddonEntry::new(100)
                    },
                    AddonEntry {
                        selected: true,
                        ..AddonEntry::new(100)
                    },
                ],
            }],
            ..ProductForm::default()
        };

        let items = assemble(&form, &config()).unwrap();
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn service_display_name_property() {
        let mut entry = service_entry(300, "fitting");
        entry.display_name = Some("Bike fitting".to_string());
        let form = ProductForm {
            variant_id: Some(100),
            addon_groups: vec![AddonGroup {
                kind: AddonKind::Service,
                entries: vec![entry],
            }],
            ..ProductForm::default()
        };

        let items = assemble(&form, &config()).unwrap();
        let props = items[1].properties.as_ref().unwrap();
        assert_eq!(props.get("_service_name").map(String::as_str), Some("Bike fitting"));
    }
}
