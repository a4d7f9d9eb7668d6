//! Step-progress derivation: percentage and dot states.

/// State of one progress dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotState {
    Visited,
    Active,
    Upcoming,
}

/// Rendered progress: a clamped percentage plus one state per dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub percent: u32,
    pub dots: Vec<DotState>,
}

/// Progress percentage for a stack of `depth` visited steps out of
/// `total`.
///
/// While the flow is underway the denominator is padded to at least
/// `depth + 2` so early steps never show inflated completion; at or past
/// the final step the padding stops and the value clamps to 100.
pub fn percent(depth: usize, total: usize) -> u32 {
    if depth == 0 || total == 0 {
        return 0;
    }
    let denom = if depth >= total {
        total
    } else {
        total.max(depth + 2)
    };
    let raw = (depth as f64 / denom as f64 * 100.0).round() as u32;
    raw.min(100)
}

/// Full progress view. Dot count is `max(total, 3)`; dots before the
/// current depth are visited, with the most recent one active.
pub fn view(depth: usize, total: usize) -> ProgressView {
    let count = total.max(3);
    let dots = (0..count)
        .map(|i| {
            if depth > 0 && i == depth - 1 {
                DotState::Active
            } else if i + 1 < depth {
                DotState::Visited
            } else {
                DotState::Upcoming
            }
        })
        .collect();
    ProgressView {
        percent: percent(depth, total),
        dots,
    }
}
