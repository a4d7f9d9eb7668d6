//! Money formatting with three fallback tiers.

use std::sync::Arc;

use crate::ports::PriceFormat;

/// A custom formatting function supplied at construction time.
pub type CustomFormatter = Box<dyn Fn(u64) -> String + Send + Sync>;

/// Formats minor-currency-unit amounts for display.
///
/// Tiers, in order: host-provided formatter hook, custom formatter
/// function, builtin cents → "unit,fraction" formatter with a
/// locale-specific decimal separator.
pub struct MoneyFormatter {
    host: Option<Arc<dyn PriceFormat>>,
    custom: Option<CustomFormatter>,
    prefix: String,
    separator: char,
}

impl MoneyFormatter {
    pub fn new(prefix: impl Into<String>, separator: char) -> Self {
        Self {
            host: None,
            custom: None,
            prefix: prefix.into(),
            separator,
        }
    }

    pub fn with_host(mut self, host: Arc<dyn PriceFormat>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn with_custom(mut self, custom: CustomFormatter) -> Self {
        self.custom = Some(custom);
        self
    }

    pub fn format(&self, cents: u64) -> String {
        if let Some(host) = &self.host {
            return host.format(cents);
        }
        if let Some(custom) = &self.custom {
            return custom(cents);
        }
        self.builtin(cents)
    }

    fn builtin(&self, cents: u64) -> String {
        format!(
            "{}{}{}{:02}",
            self.prefix,
            cents / 100,
            self.separator,
            cents % 100
        )
    }
}

impl std::fmt::Debug for MoneyFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoneyFormatter")
            .field("host", &self.host.is_some())
            .field("custom", &self.custom.is_some())
            .field("prefix", &self.prefix)
            .field("separator", &self.separator)
            .finish()
    }
}
