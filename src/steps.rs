//! Step definitions and the ordinal/id registry.
//!
//! Steps are defined once at composition time from the host document and
//! are never created or destroyed afterwards; only their visibility
//! state mutates as the flow runs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Direction tag applied to a step's exit styling during a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Back,
}

/// Visibility state of a single step panel.
///
/// At any settled point exactly one step is `Active`; `Exiting` only
/// appears transiently during phase 1 of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Active,
    Exiting(Direction),
}

/// One screen/panel of the guided flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Stable identifier. Steps without an id are addressable by
    /// ordinal only.
    pub id: Option<String>,
    /// Human-readable label, used for the trail note.
    pub label: String,
}

impl Step {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            label: label.into(),
        }
    }

    /// A step with no stable id (auto-indexed by position).
    pub fn unnamed(label: impl Into<String>) -> Self {
        Self {
            id: None,
            label: label.into(),
        }
    }
}

/// Ordinal-indexed step list with an id → ordinal lookup.
///
/// Lookups fail silently (`None`) rather than panicking; callers decide
/// whether a missing id is worth surfacing (only in design mode).
#[derive(Debug, Clone, Default)]
pub struct StepRegistry {
    steps: Vec<Step>,
    by_id: HashMap<String, usize>,
}

impl StepRegistry {
    pub fn new(steps: Vec<Step>) -> Self {
        let by_id = steps
            .iter()
            .enumerate()
            .filter_map(|(ordinal, step)| step.id.clone().map(|id| (id, ordinal)))
            .collect();
        Self { steps, by_id }
    }

    /// Resolve a step id to its ordinal.
    pub fn resolve(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn get(&self, ordinal: usize) -> Option<&Step> {
        self.steps.get(ordinal)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Identifier written to the URL state for a step: its id when it
    /// has one, otherwise its ordinal.
    pub fn identifier(&self, ordinal: usize) -> String {
        match self.get(ordinal).and_then(|s| s.id.as_deref()) {
            Some(id) => id.to_string(),
            None => ordinal.to_string(),
        }
    }
}
