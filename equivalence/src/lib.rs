//! Equivalence calculator.
//!
//! `equivalent(c) = floor(c.amount × rate(c.denom → target))`
//!
//! The calculator never knows where rates come from; a [`RateSource`] is
//! injected. Truncation guarantees the aggregated stake is never overstated,
//! so no voting power exists that is not backed by a real deposit.

pub mod calculator;
pub mod error;
pub mod rate;

pub use calculator::EquivalenceCalculator;
pub use error::EquivalenceError;
pub use rate::{RateSource, StaticRateTable};
