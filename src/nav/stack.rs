//! Visited-step history stack.

/// Ordered history of visited step ordinals. The top of the stack is the
/// currently displayed step.
///
/// Duplicates are permitted: revisiting a step pushes a new entry, and
/// each entry is individually poppable via `previous`. Once the flow has
/// shown its first step the stack never empties again; popping below
/// depth 1 is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavStack {
    entries: Vec<usize>,
}

impl NavStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ordinal: usize) {
        self.entries.push(ordinal);
    }

    /// Pop the top entry and return the new top, or `None` (and leave
    /// the stack untouched) when at depth ≤ 1.
    pub fn pop(&mut self) -> Option<usize> {
        if self.entries.len() <= 1 {
            return None;
        }
        self.entries.pop();
        self.entries.last().copied()
    }

    /// Currently displayed ordinal (top of stack).
    pub fn current(&self) -> Option<usize> {
        self.entries.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.iter().copied()
    }
}
