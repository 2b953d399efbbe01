//! Epsilon-greedy multi-armed bandit simulation — arms with hidden success
//! probabilities, a decaying exploration schedule, and the experiment loop
//! that tallies exploration, exploitation, and optimal selections.

pub mod arm;
pub mod experiment;
pub mod report;
pub mod schedule;

pub use arm::{Arm, HistorySample};
pub use experiment::{argmax_first, Decision, Experiment, ExperimentStatus, Selection};
pub use report::{ArmReport, ExperimentReport};
pub use schedule::epsilon_schedule;
