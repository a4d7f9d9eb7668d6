//! Typed command dispatch.
//!
//! The presentation layer translates user gestures into [`Action`]
//! values and hands them to [`Wizard::dispatch`]; the state machine
//! never sees raw UI events.

use serde::{Deserialize, Serialize};

use crate::nav::Wizard;
use crate::pricing::variant;

/// Every command the wizard understands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Next,
    Previous,
    Restart,
    Skip { offset: i64 },
    GoToStep { id: String },
    ToggleAddon { group: usize, entry: usize, selected: bool },
    SetQuantity { group: usize, entry: usize, quantity: u32 },
    /// Inbound variant-change notification; the payload carries a price
    /// in one of several shapes (see [`variant::price_cents`]).
    VariantChanged { payload: serde_json::Value },
    AddToCart,
}

impl Wizard {
    /// Execute one action.
    ///
    /// Navigation and add-to-cart go through the single-flight guard;
    /// selection and price updates are lightweight and always run.
    pub async fn dispatch(&self, action: Action) {
        match action {
            Action::Next => self.next().await,
            Action::Previous => self.previous().await,
            Action::Restart => self.restart().await,
            Action::Skip { offset } => self.skip(offset).await,
            Action::GoToStep { id } => self.go_to_step(&id).await,
            Action::ToggleAddon {
                group,
                entry,
                selected,
            } => {
                self.ports.forms.set_addon_selected(group, entry, selected);
                self.recompute_price().await;
            }
            Action::SetQuantity {
                group,
                entry,
                quantity,
            } => {
                self.ports.forms.set_addon_quantity(group, entry, quantity);
                self.recompute_price().await;
            }
            Action::VariantChanged { payload } => {
                self.set_main_price(variant::price_cents(&payload)).await;
                self.recompute_price().await;
            }
            Action::AddToCart => self.add_to_cart().await,
        }
    }
}
