//! The wizard engine: step stack, transition protocol, and the
//! single-flight guard shared with add-to-cart.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::attributes::AttributeGate;
use crate::config::WizardConfig;
use crate::error::NavError;
use crate::nav::stack::NavStack;
use crate::ports::{CartDrawer, CartStore, FormSource, PriceFormat, StepPresenter, UrlState};
use crate::pricing::{self, MoneyFormatter};
use crate::steps::{Direction, Step, StepRegistry, Visibility};

/// Message flashed when the attribute flush fails.
pub(crate) const ATTRIBUTE_SAVE_ERROR: &str = "Could not save your selections. Please try again.";

/// External collaborators, injected at construction time.
pub struct WizardPorts {
    pub store: Arc<dyn CartStore>,
    pub presenter: Arc<dyn StepPresenter>,
    pub drawer: Arc<dyn CartDrawer>,
    pub url: Arc<dyn UrlState>,
    pub forms: Arc<dyn FormSource>,
    /// Optional host price-formatting hook.
    pub host_formatter: Option<Arc<dyn PriceFormat>>,
}

/// Mutable flow state, only ever written under the single-flight guard.
#[derive(Debug, Default)]
pub(crate) struct WizardState {
    pub(crate) stack: NavStack,
    pub(crate) visibility: Vec<Visibility>,
    /// Latest price reported by a variant-change event; overrides the
    /// form's unit price once set.
    pub(crate) main_price_cents: Option<u64>,
}

/// The guided purchase wizard.
///
/// All whole-flow operations (navigation, restart, skip, add-to-cart)
/// are serialized through one mutual-exclusion flag; requests arriving
/// while one is in flight are dropped, not queued.
pub struct Wizard {
    pub(crate) config: WizardConfig,
    pub(crate) registry: StepRegistry,
    pub(crate) ports: WizardPorts,
    pub(crate) attrs: AttributeGate,
    pub(crate) money: MoneyFormatter,
    pub(crate) state: RwLock<WizardState>,
    pub(crate) busy: Mutex<()>,
}

impl Wizard {
    pub fn new(config: WizardConfig, steps: Vec<Step>, ports: WizardPorts) -> Self {
        let registry = StepRegistry::new(steps);
        let mut money = MoneyFormatter::new(config.currency_prefix.clone(), config.decimal_separator);
        if let Some(host) = &ports.host_formatter {
            money = money.with_host(Arc::clone(host));
        }
        let attrs = AttributeGate::new(Arc::clone(&ports.store));
        Self {
            config,
            registry,
            ports,
            attrs,
            money,
            state: RwLock::new(WizardState::default()),
            busy: Mutex::new(()),
        }
    }

    /// Show the first step, restoring position from the URL state when
    /// it names a resolvable step (by id or by ordinal).
    pub async fn start(&self) {
        if self.registry.is_empty() {
            tracing::warn!("wizard started with no steps defined");
            return;
        }
        let target = self.initial_ordinal();
        {
            let mut state = self.state.write().await;
            state.stack.clear();
            state.stack.push(target);
            state.visibility = vec![Visibility::Hidden; self.registry.len()];
            state.visibility[target] = Visibility::Active;
        }
        self.apply_visibility().await;
        self.refresh_indicators().await;
        self.ports.url.write_step(&self.registry.identifier(target));
    }

    fn initial_ordinal(&self) -> usize {
        let Some(raw) = self.ports.url.read_step() else {
            return 0;
        };
        if let Some(ordinal) = self.registry.resolve(&raw) {
            return ordinal;
        }
        match raw.parse::<usize>() {
            Ok(ordinal) if ordinal < self.registry.len() => ordinal,
            _ => {
                tracing::debug!(step = %raw, "unparseable step parameter, defaulting to first step");
                0
            }
        }
    }

    // ── Navigation operations ───────────────────────────────────────

    /// Advance to the next step. At the last step this is a silent no-op.
    pub async fn next(&self) {
        let Ok(_guard) = self.busy.try_lock() else {
            tracing::debug!("next dropped, another operation is in flight");
            return;
        };
        let current = self.current_ordinal().await;
        let target = current + 1;
        if target >= self.registry.len() {
            return;
        }
        self.navigate_to(target, Direction::Forward).await;
    }

    /// Pop the stack and redisplay the previous step. Back navigation
    /// does not re-flush attributes; it only re-renders. At depth ≤ 1
    /// this is a no-op.
    pub async fn previous(&self) {
        let Ok(_guard) = self.busy.try_lock() else {
            tracing::debug!("previous dropped, another operation is in flight");
            return;
        };
        let target = {
            let mut state = self.state.write().await;
            match state.stack.pop() {
                Some(target) => target,
                None => return,
            }
        };
        self.transition_to(target, Direction::Back).await;
    }

    /// Clear the stack and pending attributes, then navigate to the
    /// first step as a fresh push.
    pub async fn restart(&self) {
        let Ok(_guard) = self.busy.try_lock() else {
            tracing::debug!("restart dropped, another operation is in flight");
            return;
        };
        if self.registry.is_empty() {
            return;
        }
        self.attrs.clear().await;
        {
            let mut state = self.state.write().await;
            state.stack.clear();
        }
        self.navigate_to(0, Direction::Back).await;
    }

    /// Jump by a relative offset. Out-of-range targets are a no-op.
    pub async fn skip(&self, offset: i64) {
        let Ok(_guard) = self.busy.try_lock() else {
            tracing::debug!("skip dropped, another operation is in flight");
            return;
        };
        let current = self.current_ordinal().await as i64;
        let target = current + offset;
        if target < 0 || target >= self.registry.len() as i64 {
            return;
        }
        let direction = if offset < 0 {
            Direction::Back
        } else {
            Direction::Forward
        };
        self.navigate_to(target as usize, direction).await;
    }

    /// Navigate directly to a step by id. Revisiting a step pushes a
    /// new stack entry; there is no dedup, so each visit is poppable.
    ///
    /// An unknown id is a silent no-op for end users; in design mode it
    /// becomes a visible diagnostic.
    pub async fn go_to_step(&self, id: &str) {
        let Ok(_guard) = self.busy.try_lock() else {
            tracing::debug!("go_to_step dropped, another operation is in flight");
            return;
        };
        match self.registry.resolve(id) {
            Some(target) => self.navigate_to(target, Direction::Forward).await,
            None => {
                let err = NavError::UnknownStep(id.to_string());
                if self.config.design_mode {
                    self.flash_error(&err.to_string());
                } else {
                    tracing::warn!(error = %err, "navigation to unknown step ignored");
                }
            }
        }
    }

    /// Stage a cart attribute to be flushed with the next navigation.
    pub async fn stage_attribute(&self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.stage(key, value).await;
    }

    // ── Core primitive ──────────────────────────────────────────────

    /// The single forward-navigation primitive. The caller must hold
    /// the busy guard. Flushes pending attributes first; a failed flush
    /// aborts the whole navigation with the stack unchanged.
    pub(crate) async fn navigate_to(&self, target: usize, direction: Direction) {
        if let Err(e) = self.attrs.flush().await {
            tracing::warn!(error = %e, "attribute flush failed, navigation aborted");
            self.flash_error(ATTRIBUTE_SAVE_ERROR);
            return;
        }
        {
            let mut state = self.state.write().await;
            state.stack.push(target);
        }
        self.transition_to(target, direction).await;
    }

    /// Two-phase display transition: mark the currently visible step as
    /// exiting and wait out the configured duration, then hide all
    /// steps, reveal the target, and recompute the derived indicators.
    async fn transition_to(&self, target: usize, direction: Direction) {
        let exiting = {
            let mut state = self.state.write().await;
            let active = state
                .visibility
                .iter()
                .position(|v| *v == Visibility::Active);
            if let Some(i) = active {
                state.visibility[i] = Visibility::Exiting(direction);
            }
            active
        };
        if exiting.is_some() {
            self.apply_visibility().await;
            if !self.config.transition.is_zero() {
                tokio::time::sleep(self.config.transition).await;
            }
        }

        {
            let mut state = self.state.write().await;
            state.visibility = vec![Visibility::Hidden; self.registry.len()];
            if target < state.visibility.len() {
                state.visibility[target] = Visibility::Active;
            }
        }
        self.apply_visibility().await;
        self.refresh_indicators().await;
        self.ports.url.write_step(&self.registry.identifier(target));
    }

    // ── Derived indicators ──────────────────────────────────────────

    /// Recompute and render the running total. Pure reads plus a
    /// display update; safe to call arbitrarily often.
    pub async fn recompute_price(&self) {
        let Some(form) = self.ports.forms.current_form() else {
            return;
        };
        let main_price = self.state.read().await.main_price_cents;
        let total = pricing::total_cents(&form, main_price);
        self.ports.presenter.render_price(&self.money.format(total));
    }

    pub(crate) async fn refresh_indicators(&self) {
        let depth = self.state.read().await.stack.depth();
        let progress = pricing::progress::view(depth, self.registry.len());
        self.ports.presenter.render_progress(&progress);
        self.recompute_price().await;
    }

    pub(crate) async fn set_main_price(&self, cents: u64) {
        self.state.write().await.main_price_cents = Some(cents);
    }

    async fn apply_visibility(&self) {
        let snapshot = self.state.read().await.visibility.clone();
        self.ports.presenter.apply(&snapshot);
    }

    pub(crate) async fn current_ordinal(&self) -> usize {
        self.state.read().await.stack.current().unwrap_or(0)
    }

    /// Current stack depth (exposed for progress rendering and tests).
    pub async fn depth(&self) -> usize {
        self.state.read().await.stack.depth()
    }

    /// Snapshot of the pending attribute buffer.
    pub async fn pending_attributes(&self) -> std::collections::BTreeMap<String, String> {
        self.attrs.pending().await
    }

    /// Show a message in the shared error slot and schedule its
    /// self-clear.
    pub(crate) fn flash_error(&self, message: &str) {
        self.ports.presenter.show_error(message);
        let presenter = Arc::clone(&self.ports.presenter);
        let after = self.config.error_display;
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            presenter.clear_error();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::ProductForm;
    use crate::ports::memory::{
        MemoryCartStore, MemoryDrawer, MemoryForm, MemoryUrlState, RecordingPresenter,
    };

    struct Harness {
        wizard: Wizard,
        store: Arc<MemoryCartStore>,
        presenter: Arc<RecordingPresenter>,
        url: Arc<MemoryUrlState>,
    }

    fn steps() -> Vec<Step> {
        vec![
            Step::new("model", "Model"),
            Step::new("size", "Size"),
            Step::new("extras", "Extras"),
            Step::new("services", "Services"),
            Step::new("summary", "Summary"),
        ]
    }

    fn harness_with(config: WizardConfig, url: MemoryUrlState) -> Harness {
        let store = Arc::new(MemoryCartStore::new());
        let presenter = Arc::new(RecordingPresenter::new());
        let url = Arc::new(url);
        let ports = WizardPorts {
            store: store.clone(),
            presenter: presenter.clone(),
            drawer: Arc::new(MemoryDrawer::new()),
            url: url.clone(),
            forms: Arc::new(MemoryForm::new(ProductForm {
                variant_id: Some(1),
                unit_price_cents: 1000,
                quantity: 1,
                ..ProductForm::default()
            })),
            host_formatter: None,
        };
        Harness {
            wizard: Wizard::new(config, steps(), ports),
            store,
            presenter,
            url,
        }
    }

    fn harness() -> Harness {
        harness_with(WizardConfig::instant(), MemoryUrlState::new())
    }

    #[tokio::test]
    async fn start_shows_exactly_one_step_at_depth_one() {
        let h = harness();
        h.wizard.start().await;
        assert_eq!(h.wizard.depth().await, 1);
        assert_eq!(h.presenter.active_step(), Some(0));
        assert_eq!(h.url.current().as_deref(), Some("model"));
    }

    #[tokio::test]
    async fn start_restores_position_from_url_id() {
        let h = harness_with(
            WizardConfig::instant(),
            MemoryUrlState::from_query("?step=extras", "step"),
        );
        h.wizard.start().await;
        assert_eq!(h.presenter.active_step(), Some(2));
    }

    #[tokio::test]
    async fn start_restores_position_from_url_ordinal() {
        let h = harness_with(
            WizardConfig::instant(),
            MemoryUrlState::from_query("?step=3", "step"),
        );
        h.wizard.start().await;
        assert_eq!(h.presenter.active_step(), Some(3));
    }

    #[tokio::test]
    async fn start_degrades_to_first_step_on_garbage_url() {
        let h = harness_with(
            WizardConfig::instant(),
            MemoryUrlState::from_query("?step=nonsense", "step"),
        );
        h.wizard.start().await;
        assert_eq!(h.presenter.active_step(), Some(0));
    }

    #[tokio::test]
    async fn next_advances_and_grows_the_stack() {
        let h = harness();
        h.wizard.start().await;
        h.wizard.next().await;
        assert_eq!(h.wizard.depth().await, 2);
        assert_eq!(h.presenter.active_step(), Some(1));
        assert_eq!(h.url.current().as_deref(), Some("size"));
    }

    #[tokio::test]
    async fn next_at_last_step_is_a_noop() {
        let h = harness();
        h.wizard.start().await;
        for _ in 0..4 {
            h.wizard.next().await;
        }
        assert_eq!(h.presenter.active_step(), Some(4));
        let depth = h.wizard.depth().await;

        h.wizard.next().await;
        assert_eq!(h.wizard.depth().await, depth);
        assert_eq!(h.presenter.active_step(), Some(4));
    }

    #[tokio::test]
    async fn previous_at_root_is_a_noop() {
        let h = harness();
        h.wizard.start().await;
        h.wizard.previous().await;
        assert_eq!(h.wizard.depth().await, 1);
        assert_eq!(h.presenter.active_step(), Some(0));
    }

    #[tokio::test]
    async fn previous_pops_without_reflushing_attributes() {
        let h = harness();
        h.wizard.start().await;
        h.wizard.next().await;
        let flushes = h.store.update_calls();

        h.wizard.stage_attribute("size", "M").await;
        h.wizard.previous().await;

        assert_eq!(h.presenter.active_step(), Some(0));
        assert_eq!(h.store.update_calls(), flushes, "previous must not flush");
        assert!(!h.wizard.pending_attributes().await.is_empty());
    }

    #[tokio::test]
    async fn restart_resets_stack_and_pending_attributes() {
        let h = harness();
        h.wizard.start().await;
        h.wizard.next().await;
        h.wizard.next().await;
        h.wizard.stage_attribute("size", "M").await;

        h.wizard.restart().await;

        assert_eq!(h.wizard.depth().await, 1);
        assert_eq!(h.presenter.active_step(), Some(0));
        assert!(h.wizard.pending_attributes().await.is_empty());
    }

    #[tokio::test]
    async fn skip_out_of_range_is_a_noop() {
        let h = harness();
        h.wizard.start().await;
        h.wizard.skip(-1).await;
        assert_eq!(h.presenter.active_step(), Some(0));
        h.wizard.skip(99).await;
        assert_eq!(h.presenter.active_step(), Some(0));
        assert_eq!(h.wizard.depth().await, 1);

        h.wizard.skip(2).await;
        assert_eq!(h.presenter.active_step(), Some(2));
        assert_eq!(h.wizard.depth().await, 2);
    }

    #[tokio::test]
    async fn go_to_step_always_pushes_a_new_entry() {
        let h = harness();
        h.wizard.start().await;
        h.wizard.go_to_step("extras").await;
        h.wizard.go_to_step("extras").await;
        assert_eq!(h.wizard.depth().await, 3);

        // Both entries are poppable.
        h.wizard.previous().await;
        assert_eq!(h.presenter.active_step(), Some(2));
        h.wizard.previous().await;
        assert_eq!(h.presenter.active_step(), Some(0));
    }

    #[tokio::test]
    async fn unknown_step_is_silent_unless_design_mode() {
        let h = harness();
        h.wizard.start().await;
        h.wizard.go_to_step("missing").await;
        assert_eq!(h.presenter.active_step(), Some(0));
        assert!(h.presenter.errors().is_empty());

        let mut config = WizardConfig::instant();
        config.design_mode = true;
        let h = harness_with(config, MemoryUrlState::new());
        h.wizard.start().await;
        h.wizard.go_to_step("missing").await;
        assert_eq!(
            h.presenter.errors(),
            vec![NavError::UnknownStep("missing".to_string()).to_string()]
        );
    }

    #[tokio::test]
    async fn failed_flush_blocks_navigation_and_keeps_buffer() {
        let h = harness();
        h.wizard.start().await;
        h.wizard.stage_attribute("size", "M").await;
        let before = h.wizard.pending_attributes().await;

        h.store.fail_updates(true);
        h.wizard.next().await;

        assert_eq!(h.wizard.depth().await, 1, "stack must not grow");
        assert_eq!(h.presenter.active_step(), Some(0));
        assert_eq!(h.wizard.pending_attributes().await, before);
        assert_eq!(h.presenter.errors(), vec![ATTRIBUTE_SAVE_ERROR]);

        // Recovery: the same buffered write goes through on retry.
        h.store.fail_updates(false);
        h.wizard.next().await;
        assert_eq!(h.presenter.active_step(), Some(1));
        assert!(h.wizard.pending_attributes().await.is_empty());
        assert_eq!(h.store.attributes().get("size").map(String::as_str), Some("M"));
    }

    #[tokio::test]
    async fn navigation_flushes_staged_attributes() {
        let h = harness();
        h.wizard.start().await;
        h.wizard.stage_attribute("model", "gravel").await;
        h.wizard.next().await;
        assert_eq!(
            h.store.attributes().get("model").map(String::as_str),
            Some("gravel")
        );
        assert_eq!(h.store.update_calls(), 1);

        // Nothing staged: the next navigation performs no write.
        h.wizard.next().await;
        assert_eq!(h.store.update_calls(), 1);
    }

    #[tokio::test]
    async fn progress_updates_after_each_transition() {
        let h = harness();
        h.wizard.start().await;
        h.wizard.next().await;
        h.wizard.next().await;
        let progress = h.presenter.progress().unwrap();
        assert_eq!(progress.percent, 60); // depth 3 of 5
    }

    #[tokio::test]
    async fn price_renders_through_builtin_formatter() {
        let h = harness();
        h.wizard.start().await;
        assert_eq!(h.presenter.price().as_deref(), Some("R$ 10,00"));

        h.wizard.set_main_price(12345).await;
        h.wizard.recompute_price().await;
        assert_eq!(h.presenter.price().as_deref(), Some("R$ 123,45"));
    }
}
