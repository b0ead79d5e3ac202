//! Small numeric helpers shared by the cleaning and aggregation stages.

pub mod median;

pub use median::*;
