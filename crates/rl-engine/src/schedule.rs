//! Decaying exploration rate.

/// Per-iteration decay applied to the initial epsilon.
pub const DECAY_RATE: f64 = 0.01;

/// `epsilon_t = initial_epsilon / (DECAY_RATE * t + 1)` for zero-based iteration `t`.
///
/// Non-increasing in `t` for non-negative `initial_epsilon`, equal to it at `t = 0`,
/// and positive for every finite `t` when `initial_epsilon > 0`.
pub fn epsilon_schedule(initial_epsilon: f64, t: u64) -> f64 {
    initial_epsilon / (DECAY_RATE * t as f64 + 1.0)
}
