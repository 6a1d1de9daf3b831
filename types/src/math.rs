//! Widening multiply-divide over `u128`.

use primitive_types::U256;

fn narrow(value: U256) -> Option<u128> {
    if value.bits() > 128 {
        None
    } else {
        Some(value.low_u128())
    }
}

/// `floor(a * b / d)` with a 256-bit intermediate. `None` if `d` is zero or
/// the quotient does not fit in a `u128`.
pub fn mul_div_floor(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    narrow(U256::from(a) * U256::from(b) / U256::from(d))
}

/// `ceil(a * b / d)` with a 256-bit intermediate. `None` if `d` is zero or
/// the quotient does not fit in a `u128`.
pub fn mul_div_ceil(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    let d = U256::from(d);
    let product = U256::from(a) * U256::from(b);
    let (quotient, remainder) = product.div_mod(d);
    let quotient = if remainder.is_zero() {
        quotient
    } else {
        quotient + U256::one()
    };
    narrow(quotient)
}
