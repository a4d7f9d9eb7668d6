//! Error types for the checkout flow engine.
//!
//! There is no composed top-level error: nothing here ever propagates
//! out of the wizard uncaught. Each enum belongs to one failure domain
//! and is rendered into the shared error slot (or swallowed with a
//! warn log) at the point it occurs.

/// Form validation errors. Recoverable and local: shown transiently,
/// the triggering operation aborts without mutating any flow state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in {label}")]
    MissingRequired { label: String },

    #[error("There is nothing to add to the cart")]
    NothingToAdd,
}

/// Cart-attribute persistence errors. The pending buffer survives these
/// so the next navigation attempt can retry the same write.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Cart attribute update rejected (status {status})")]
    Rejected { status: u16, body: String },

    #[error("Network error: {0}")]
    Transport(String),
}

/// Errors from the multi-item cart-add call.
#[derive(Debug, thiserror::Error)]
pub enum CartAddError {
    /// The cart API refused the items; `message` is taken verbatim from
    /// the response body when one of the preferred fields is present.
    #[error("{message}")]
    Rejected { message: String },

    #[error("Network error: {0}")]
    Transport(String),
}

/// Navigation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    #[error("Unknown step: {0}")]
    UnknownStep(String),
}
