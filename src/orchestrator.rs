//! Add-to-cart orchestration.
//!
//! Composes validation, item assembly, the trail note, the attribute
//! flush, and the cart-add call into one sequence. Shares the wizard's
//! single-flight guard: an add-to-cart call and a step navigation can
//! never run concurrently.

use crate::cart::{self, ProductForm};
use crate::error::{CartAddError, ValidationError};
use crate::nav::Wizard;

const CONNECTION_ERROR: &str = "Connection error. Please check your network and try again.";

impl Wizard {
    /// Run the full add-to-cart sequence for the current form.
    ///
    /// Dropped silently when another whole-flow operation is in flight
    /// or when no form is active. The busy visual state is always
    /// cleared, whatever the outcome.
    pub async fn add_to_cart(&self) {
        let Ok(_guard) = self.busy.try_lock() else {
            tracing::debug!("add to cart dropped, another operation is in flight");
            return;
        };
        let Some(form) = self.ports.forms.current_form() else {
            tracing::debug!("add to cart ignored, no active form");
            return;
        };

        self.ports.presenter.set_busy(true);
        self.run_add(&form).await;
        self.ports.presenter.set_busy(false);
    }

    async fn run_add(&self, form: &ProductForm) {
        let items = match cart::assemble(form, &self.config) {
            Ok(items) => items,
            Err(e) => {
                self.flash_error(&e.to_string());
                return;
            }
        };
        if items.is_empty() {
            self.flash_error(&ValidationError::NothingToAdd.to_string());
            return;
        }

        // The trail note is informational; its failure never blocks the
        // purchase.
        let note = self.trail_note().await;
        if !note.is_empty() {
            if let Err(e) = self.ports.store.save_note(&note).await {
                tracing::warn!(error = %e, "trail note save failed");
            }
        }

        if let Err(e) = self.attrs.flush().await {
            tracing::warn!(error = %e, "attribute flush failed, add to cart aborted");
            self.flash_error(crate::nav::engine::ATTRIBUTE_SAVE_ERROR);
            return;
        }

        match self.ports.store.add_items(&items).await {
            Ok(()) => self.signal_success().await,
            Err(CartAddError::Rejected { message }) => self.flash_error(&message),
            Err(CartAddError::Transport(e)) => {
                tracing::warn!(error = %e, "cart add transport failure");
                self.flash_error(CONNECTION_ERROR);
            }
        }
    }

    /// Success signaling: in-page success panel first when one exists,
    /// then the cart-changed event, then the drawer (delayed if the
    /// panel was shown so the user sees it).
    async fn signal_success(&self) {
        let panel_shown = self.ports.presenter.reveal_success_panel();
        self.ports.presenter.announce_cart_changed();
        if panel_shown && !self.config.drawer_delay.is_zero() {
            tokio::time::sleep(self.config.drawer_delay).await;
        }
        self.ports.drawer.open();
    }

    /// Human-readable trail of the steps currently on the stack.
    async fn trail_note(&self) -> String {
        let ordinals: Vec<usize> = self.state.read().await.stack.iter().collect();
        ordinals
            .iter()
            .filter_map(|&ordinal| self.registry.get(ordinal))
            .map(|step| step.label.as_str())
            .collect::<Vec<_>>()
            .join(&self.config.note_separator)
    }
}
