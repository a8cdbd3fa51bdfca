//! Offline analysis of a league dataset used to steer header selection.

pub mod overlap;

pub use overlap::OverlapSummary;
