//! Cart item assembly and the form/selection model it reads.

pub mod assembler;
pub mod form;

pub use assembler::{LineItem, assemble};
pub use form::{AddonEntry, AddonGroup, AddonKind, FormField, ProductForm};
