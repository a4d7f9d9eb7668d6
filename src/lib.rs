//! Checkout Flow — guided multi-step purchase wizard engine.
//!
//! Sequences step panels, persists user choices as cart attributes
//! before each navigation commits, assembles multi-item cart adds
//! (main product, product add-ons, service add-ons), and keeps a
//! running price estimate and progress indicator in sync. Everything
//! outside the engine's own state is reached through the [`ports`]
//! traits.

pub mod actions;
pub mod attributes;
pub mod cart;
pub mod config;
pub mod error;
pub mod nav;
pub mod orchestrator;
pub mod ports;
pub mod pricing;
pub mod steps;

pub use actions::Action;
pub use config::WizardConfig;
pub use nav::{Wizard, WizardPorts};
pub use steps::Step;
