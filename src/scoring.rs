//! Position-based accuracy scoring for a finished (or abandoned) transcript.
//!
//! This is the summary formula, normalized against the target length. It is
//! intentionally distinct from the live keystroke accuracy a session tracks
//! while typing; the two must not be merged.

/// Per-category error counts from comparing a typed transcript to its target.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreBreakdown {
    /// Positions where both strings have a character and they differ.
    pub mistyped: usize,
    /// Target characters the typist never reached.
    pub missed: usize,
    /// Typed characters past the end of the target.
    pub extra: usize,
    /// `100 * (1 - errors / target_len)`, clamped to `[0, 100]`.
    pub accuracy: f64,
}

impl ScoreBreakdown {
    pub fn total_errors(&self) -> usize {
        self.mistyped + self.missed + self.extra
    }
}

/// Compare `typed` against `target` position by position.
///
/// Pure and stateless. An empty target always scores 0.
pub fn score(target: &str, typed: &str) -> ScoreBreakdown {
    let target: Vec<char> = target.chars().collect();
    let typed: Vec<char> = typed.chars().collect();

    let overlap = target.len().min(typed.len());
    let mistyped = (0..overlap).filter(|&i| typed[i] != target[i]).count();
    let missed = target.len().saturating_sub(typed.len());
    let extra = typed.len().saturating_sub(target.len());

    let accuracy = if target.is_empty() {
        0.0
    } else {
        let errors = (mistyped + missed + extra) as f64;
        (100.0 * (1.0 - errors / target.len() as f64)).clamp(0.0, 100.0)
    };

    ScoreBreakdown {
        mistyped,
        missed,
        extra,
        accuracy,
    }
}
