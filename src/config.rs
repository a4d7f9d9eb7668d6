//! Configuration types.

use std::time::Duration;

/// Wizard configuration.
#[derive(Debug, Clone)]
pub struct WizardConfig {
    /// Duration of the exit-styling phase of a step transition.
    /// Zero disables transition pacing entirely.
    pub transition: Duration,
    /// Delay before opening the cart drawer when an in-page success
    /// panel was shown first.
    pub drawer_delay: Duration,
    /// How long a flashed error stays in the shared error slot.
    pub error_display: Duration,
    /// Separator used when joining step labels into the trail note.
    pub note_separator: String,
    /// Property key identifying the service type on service add-on items.
    /// Underscore-prefixed keys are reserved (hidden from buyers).
    pub service_type_key: String,
    /// Property key carrying the service display name, when one exists.
    pub service_name_key: String,
    /// Currency prefix for the builtin money formatter.
    pub currency_prefix: String,
    /// Decimal separator for the builtin money formatter.
    pub decimal_separator: char,
    /// Query parameter carrying the active step on page load.
    pub step_param: String,
    /// Authoring/preview mode: unresolvable step references become
    /// visible diagnostics instead of silent no-ops.
    pub design_mode: bool,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            transition: Duration::from_millis(300),
            drawer_delay: Duration::from_millis(1200),
            error_display: Duration::from_secs(4),
            note_separator: " > ".to_string(),
            service_type_key: "_service_type".to_string(),
            service_name_key: "_service_name".to_string(),
            currency_prefix: "R$ ".to_string(),
            decimal_separator: ',',
            step_param: "step".to_string(),
            design_mode: false,
        }
    }
}

impl WizardConfig {
    /// Configuration with all pacing delays zeroed, for tests and
    /// headless runs.
    pub fn instant() -> Self {
        Self {
            transition: Duration::ZERO,
            drawer_delay: Duration::ZERO,
            error_display: Duration::ZERO,
            ..Self::default()
        }
    }
}
