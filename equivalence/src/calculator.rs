//! Pure coin → bonding-denom conversion.

use std::sync::Arc;

use interstake_types::{Coin, Denom};

use crate::rate::RateSource;
use crate::EquivalenceError;

/// Converts coins into an equivalent amount of a target denomination.
///
/// Holds no mutable state; any number of readers may share one instance.
#[derive(Clone)]
pub struct EquivalenceCalculator {
    rates: Arc<dyn RateSource + Send + Sync>,
}

impl EquivalenceCalculator {
    pub fn new(rates: Arc<dyn RateSource + Send + Sync>) -> Self {
        Self { rates }
    }

    /// `floor(coin.amount × rate)`. A coin already in `target` converts 1:1.
    pub fn equivalent_amount(&self, coin: &Coin, target: &Denom) -> Result<u128, EquivalenceError> {
        if &coin.denom == target {
            return Ok(coin.amount);
        }
        let rate = self
            .rates
            .exchange_rate(&coin.denom, target)
            .ok_or_else(|| EquivalenceError::UnsupportedDenom {
                denom: coin.denom.clone(),
                target: target.clone(),
            })?;
        rate.checked_mul_int_truncate(coin.amount)
            .ok_or_else(|| EquivalenceError::Overflow {
                amount: coin.amount,
                denom: coin.denom.clone(),
            })
    }

    /// Same as [`equivalent_amount`](Self::equivalent_amount) but returns a coin in `target`.
    pub fn equivalent_coin(&self, coin: &Coin, target: &Denom) -> Result<Coin, EquivalenceError> {
        self.equivalent_amount(coin, target)
            .map(|amount| Coin::new(target.clone(), amount))
    }
}
