//! Navigation: the visited-step stack and the engine driving it.

pub mod engine;
pub mod stack;

pub use engine::{Wizard, WizardPorts};
pub use stack::NavStack;
