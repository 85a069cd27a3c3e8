//! Category aggregation and final grade combination.
//!
//! Category groups are scored under one [`policy::AggregationPolicy`],
//! scaled by their configured weight, and the weighted contributions are
//! summed and rounded half up into a final grade.

pub mod aggregate;
pub mod grade;
pub mod policy;
pub mod types;
pub mod utility;
