//! External collaborator interfaces.
//!
//! Everything the engine touches outside its own state goes through one
//! of these ports, injected at construction time. Default
//! implementations: [`http::HttpCartStore`] for the live cart API and
//! the [`memory`] ports for tests and headless runs.

pub mod http;
pub mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::cart::{LineItem, ProductForm};
use crate::error::{CartAddError, PersistenceError};
use crate::pricing::ProgressView;
use crate::steps::Visibility;

/// The cart store: attribute writes, the informational note, and the
/// multi-item add call.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Persist a full attribute mapping in one write.
    async fn update_attributes(
        &self,
        attributes: &BTreeMap<String, String>,
    ) -> Result<(), PersistenceError>;

    /// Persist the human-readable trail note as a separate field.
    async fn save_note(&self, note: &str) -> Result<(), PersistenceError>;

    /// Add an ordered list of line items to the cart.
    async fn add_items(&self, items: &[LineItem]) -> Result<(), CartAddError>;
}

/// Presentation surface for the step panels and shared indicators.
///
/// All methods are plain synchronous updates; the engine owns the state
/// and tells the presenter what to show.
pub trait StepPresenter: Send + Sync {
    /// Apply one visibility state per step, in ordinal order.
    fn apply(&self, visibility: &[Visibility]);

    fn render_progress(&self, progress: &ProgressView);

    fn render_price(&self, display: &str);

    /// Show a message in the shared error slot. The engine clears it
    /// again after the configured display duration.
    fn show_error(&self, message: &str);

    fn clear_error(&self);

    /// Toggle the busy/loading visual state.
    fn set_busy(&self, busy: bool);

    /// Reveal the in-page success panel if one exists. Returns whether
    /// a panel was shown.
    fn reveal_success_panel(&self) -> bool;

    /// Signal a cart-changed event to the page.
    fn announce_cart_changed(&self);
}

/// The cart drawer collaborator. The engine opens it but does not own it.
pub trait CartDrawer: Send + Sync {
    fn open(&self);
}

/// One query parameter identifying the active step, used to restore
/// position on load. Unreadable state degrades to the first step.
pub trait UrlState: Send + Sync {
    fn read_step(&self) -> Option<String>;
    fn write_step(&self, value: &str);
}

/// Read access to the current step's form/selection state. The engine
/// only ever reads snapshots; selection is owned by the source.
pub trait FormSource: Send + Sync {
    fn current_form(&self) -> Option<ProductForm>;

    fn set_addon_selected(&self, group: usize, entry: usize, selected: bool);

    fn set_addon_quantity(&self, group: usize, entry: usize, quantity: u32);
}

/// Optional host-provided price formatting hook (tier 1 of money
/// formatting).
pub trait PriceFormat: Send + Sync {
    fn format(&self, cents: u64) -> String;
}
