//! In-memory port implementations for tests and headless runs.
//!
//! Every implementation records what it was asked to do so tests can
//! assert on the engine's outward behavior. The cart store can be told
//! to fail or to respond slowly (to exercise the single-flight guard).

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::cart::{LineItem, ProductForm};
use crate::error::{CartAddError, PersistenceError};
use crate::ports::{CartDrawer, CartStore, FormSource, StepPresenter, UrlState};
use crate::pricing::ProgressView;
use crate::steps::Visibility;

fn locked<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Cart store that keeps everything in memory.
#[derive(Default)]
pub struct MemoryCartStore {
    attributes: Mutex<BTreeMap<String, String>>,
    note: Mutex<Option<String>>,
    added: Mutex<Vec<Vec<LineItem>>>,
    update_calls: AtomicUsize,
    fail_updates: AtomicBool,
    fail_note: AtomicBool,
    add_error: Mutex<Option<String>>,
    delay: Mutex<Duration>,
}

impl MemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every attribute update fail until told otherwise.
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_note(&self, fail: bool) {
        self.fail_note.store(fail, Ordering::SeqCst);
    }

    /// Make the next add calls fail with this message.
    pub fn reject_adds(&self, message: Option<&str>) {
        *locked(&self.add_error) = message.map(String::from);
    }

    /// Artificial latency applied to every call.
    pub fn set_delay(&self, delay: Duration) {
        *locked(&self.delay) = delay;
    }

    pub fn attributes(&self) -> BTreeMap<String, String> {
        locked(&self.attributes).clone()
    }

    pub fn note(&self) -> Option<String> {
        locked(&self.note).clone()
    }

    /// Every add call made, in order.
    pub fn added(&self) -> Vec<Vec<LineItem>> {
        locked(&self.added).clone()
    }

    /// Number of attribute-update network calls observed.
    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let delay = *locked(&self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn update_attributes(
        &self,
        attributes: &BTreeMap<String, String>,
    ) -> Result<(), PersistenceError> {
        self.pause().await;
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(PersistenceError::Transport("simulated failure".into()));
        }
        locked(&self.attributes).extend(attributes.clone());
        Ok(())
    }

    async fn save_note(&self, note: &str) -> Result<(), PersistenceError> {
        self.pause().await;
        if self.fail_note.load(Ordering::SeqCst) {
            return Err(PersistenceError::Transport("simulated failure".into()));
        }
        *locked(&self.note) = Some(note.to_string());
        Ok(())
    }

    async fn add_items(&self, items: &[LineItem]) -> Result<(), CartAddError> {
        self.pause().await;
        if let Some(message) = locked(&self.add_error).clone() {
            return Err(CartAddError::Rejected { message });
        }
        locked(&self.added).push(items.to_vec());
        Ok(())
    }
}

/// Presenter that records every instruction it receives.
pub struct RecordingPresenter {
    visibility: Mutex<Vec<Visibility>>,
    progress: Mutex<Option<ProgressView>>,
    price: Mutex<Option<String>>,
    errors: Mutex<Vec<String>>,
    error_clears: AtomicUsize,
    busy: AtomicBool,
    has_success_panel: bool,
    success_shown: AtomicUsize,
    cart_changes: AtomicUsize,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::with_success_panel(false)
    }

    pub fn with_success_panel(has_success_panel: bool) -> Self {
        Self {
            visibility: Mutex::new(Vec::new()),
            progress: Mutex::new(None),
            price: Mutex::new(None),
            errors: Mutex::new(Vec::new()),
            error_clears: AtomicUsize::new(0),
            busy: AtomicBool::new(false),
            has_success_panel,
            success_shown: AtomicUsize::new(0),
            cart_changes: AtomicUsize::new(0),
        }
    }

    /// Last applied visibility states.
    pub fn visibility(&self) -> Vec<Visibility> {
        locked(&self.visibility).clone()
    }

    /// Ordinal of the single active step, if settled.
    pub fn active_step(&self) -> Option<usize> {
        let states = locked(&self.visibility);
        let mut active = states
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == Visibility::Active);
        match (active.next(), active.next()) {
            (Some((i, _)), None) => Some(i),
            _ => None,
        }
    }

    pub fn progress(&self) -> Option<ProgressView> {
        locked(&self.progress).clone()
    }

    pub fn price(&self) -> Option<String> {
        locked(&self.price).clone()
    }

    pub fn errors(&self) -> Vec<String> {
        locked(&self.errors).clone()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn success_shown(&self) -> usize {
        self.success_shown.load(Ordering::SeqCst)
    }

    pub fn cart_changes(&self) -> usize {
        self.cart_changes.load(Ordering::SeqCst)
    }
}

impl Default for RecordingPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl StepPresenter for RecordingPresenter {
    fn apply(&self, visibility: &[Visibility]) {
        *locked(&self.visibility) = visibility.to_vec();
    }

    fn render_progress(&self, progress: &ProgressView) {
        *locked(&self.progress) = Some(progress.clone());
    }

    fn render_price(&self, display: &str) {
        *locked(&self.price) = Some(display.to_string());
    }

    fn show_error(&self, message: &str) {
        locked(&self.errors).push(message.to_string());
    }

    fn clear_error(&self) {
        self.error_clears.fetch_add(1, Ordering::SeqCst);
    }

    fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }

    fn reveal_success_panel(&self) -> bool {
        if self.has_success_panel {
            self.success_shown.fetch_add(1, Ordering::SeqCst);
        }
        self.has_success_panel
    }

    fn announce_cart_changed(&self) {
        self.cart_changes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Drawer that counts how often it was opened.
#[derive(Default)]
pub struct MemoryDrawer {
    opens: AtomicUsize,
}

impl MemoryDrawer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl CartDrawer for MemoryDrawer {
    fn open(&self) {
        self.opens.fetch_add(1, Ordering::SeqCst);
    }
}

/// URL state held in memory, seeded from a raw query string.
#[derive(Default)]
pub struct MemoryUrlState {
    value: Mutex<Option<String>>,
}

impl MemoryUrlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a raw query string, decoding the configured parameter.
    /// Unparseable input just leaves the state empty.
    pub fn from_query(query: &str, param: &str) -> Self {
        let value = query
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == param)
            .and_then(|(_, raw)| urlencoding::decode(raw).ok())
            .map(|decoded| decoded.into_owned());
        Self {
            value: Mutex::new(value),
        }
    }

    pub fn current(&self) -> Option<String> {
        locked(&self.value).clone()
    }
}

impl UrlState for MemoryUrlState {
    fn read_step(&self) -> Option<String> {
        locked(&self.value).clone()
    }

    fn write_step(&self, value: &str) {
        *locked(&self.value) = Some(value.to_string());
    }
}

/// Form source over a single in-memory form.
#[derive(Default)]
pub struct MemoryForm {
    form: Mutex<Option<ProductForm>>,
}

impl MemoryForm {
    pub fn new(form: ProductForm) -> Self {
        Self {
            form: Mutex::new(Some(form)),
        }
    }

    /// A source with no active form (add-to-cart aborts silently).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn set_form(&self, form: Option<ProductForm>) {
        *locked(&self.form) = form;
    }
}

impl FormSource for MemoryForm {
    fn current_form(&self) -> Option<ProductForm> {
        locked(&self.form).clone()
    }

    fn set_addon_selected(&self, group: usize, entry: usize, selected: bool) {
        if let Some(form) = locked(&self.form).as_mut()
            && let Some(e) = form
                .addon_groups
                .get_mut(group)
                .and_then(|g| g.entries.get_mut(entry))
        {
            e.selected = selected;
        }
    }

    fn set_addon_quantity(&self, group: usize, entry: usize, quantity: u32) {
        if let Some(form) = locked(&self.form).as_mut()
            && let Some(e) = form
                .addon_groups
                .get_mut(group)
                .and_then(|g| g.entries.get_mut(entry))
        {
            e.quantity = quantity;
        }
    }
}
