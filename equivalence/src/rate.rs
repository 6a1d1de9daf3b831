//! Exchange rate sources.

use interstake_types::{Dec, Denom};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Anything that can quote `denom → target` as a fixed-point rate.
///
/// Implementations may be a static table, a validator-set derived rate, or
/// an oracle feed. `None` means the pair is not supported.
pub trait RateSource {
    fn exchange_rate(&self, denom: &Denom, target: &Denom) -> Option<Dec>;
}

/// A fixed table of rates into a single target denomination.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticRateTable {
    rates: BTreeMap<Denom, Dec>,
}

impl StaticRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, denom: Denom, rate: Dec) -> Self {
        self.rates.insert(denom, rate);
        self
    }

    pub fn set_rate(&mut self, denom: Denom, rate: Dec) {
        self.rates.insert(denom, rate);
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Denom, &Dec)> {
        self.rates.iter()
    }
}

impl From<BTreeMap<Denom, Dec>> for StaticRateTable {
    fn from(rates: BTreeMap<Denom, Dec>) -> Self {
        Self { rates }
    }
}

/// Rates in the table are all relative to the caller's bonding denom; the
/// target is not part of the key.
impl RateSource for StaticRateTable {
    fn exchange_rate(&self, denom: &Denom, _target: &Denom) -> Option<Dec> {
        self.rates.get(denom).copied()
    }
}
