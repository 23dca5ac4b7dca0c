//! Emission arithmetic.
//!
//! Edge cases (non-positive elapsed time, oversized shares, rates outside
//! `[0, 1]`) are absorbed here so the engine never fails on arithmetic.

use mint_types::{Decimal, TokenAmount, ONE_YEAR_MICROS};
use num_bigint::BigUint;
use num_traits::ToPrimitive;

/// Whole tokens of `annual_provisions` accrued over `elapsed_micros` of block
/// time: `floor(annual_provisions × elapsed / ONE_YEAR)`.
///
/// The quotient is taken on the decimal's integer mantissa, so no digit is
/// rounded before the floor. A 96-bit mantissa over any `i64` span always
/// fits a [`TokenAmount`]; the saturation only guards the conversion.
pub fn annualized_share(annual_provisions: Decimal, elapsed_micros: i64) -> TokenAmount {
    if elapsed_micros <= 0 || annual_provisions <= Decimal::ZERO {
        return 0;
    }
    // annual_provisions = mantissa / 10^scale
    let mantissa = BigUint::from(annual_provisions.mantissa().unsigned_abs());
    let elapsed = BigUint::from(elapsed_micros.unsigned_abs());
    let denominator =
        BigUint::from(ONE_YEAR_MICROS.unsigned_abs()) * BigUint::from(10u32).pow(annual_provisions.scale());

    (mantissa * elapsed / denominator)
        .to_u128()
        .unwrap_or(TokenAmount::MAX)
}

/// Whole tokens to release this block: `min(remaining, share)`.
pub fn block_provision(share: TokenAmount, remaining: TokenAmount) -> TokenAmount {
    share.min(remaining)
}

/// One dilution step: `max(rate − rate × dilution, 0)`.
///
/// Both inputs are clamped to `[0, 1]`, so the result is always within
/// `[0, rate]`.
pub fn dilute_rate(rate: Decimal, dilution: Decimal) -> Decimal {
    let rate = rate.clamp(Decimal::ZERO, Decimal::ONE);
    let dilution = dilution.clamp(Decimal::ZERO, Decimal::ONE);
    match rate.checked_mul(dilution) {
        Some(cut) => (rate - cut).max(Decimal::ZERO),
        None => Decimal::ZERO,
    }
}
