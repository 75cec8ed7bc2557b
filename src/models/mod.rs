use rust_decimal::Decimal;

pub mod category;
pub mod product;
pub mod product_detail;
pub mod product_tag;
pub mod tag;

/// Number of decimal places kept for prices and measurements.
pub const DECIMAL_SCALE: u32 = 2;

/// Convert a decimal into the integer number of hundredths stored in the database.
///
/// Values with more than two decimal places are rounded half to even.
pub fn decimal_to_hundredths(value: Decimal) -> i64 {
    let mut rounded = value.round_dp(DECIMAL_SCALE);
    rounded.rescale(DECIMAL_SCALE);
    rounded.mantissa().clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Convert stored hundredths back into a decimal with two decimal places.
pub fn hundredths_to_decimal(value: i64) -> Decimal {
    Decimal::new(value, DECIMAL_SCALE)
}
