//! Numeric value generators.

use rand::Rng;
use rust_decimal::Decimal;

/// Generate a random integer in the given range (inclusive).
pub fn generate_int_range<R: Rng>(rng: &mut R, min: i64, max: i64) -> i64 {
    rng.gen_range(min..=max)
}

/// Generate a random decimal with at most `left_digits` integer digits and
/// exactly `right_digits` fractional digits, within `[min, max]`.
///
/// `max` is clamped to the largest value that fits in `left_digits`.
pub fn generate_decimal<R: Rng>(
    rng: &mut R,
    left_digits: u32,
    right_digits: u32,
    min: i64,
    max: i64,
) -> Decimal {
    let scale = 10i64.pow(right_digits);
    let ceiling = 10i64.pow(left_digits) * scale - 1;
    let low = (min * scale).min(ceiling);
    let high = (max * scale).min(ceiling).max(low);
    Decimal::new(rng.gen_range(low..=high), right_digits)
}

/// Latitude/longitude pair inside mainland Spain, formatted `"lat, lon"`.
pub fn generate_coordinates<R: Rng>(rng: &mut R) -> String {
    let lat: f64 = rng.gen_range(36.0..43.8);
    let lon: f64 = rng.gen_range(-9.3..3.3);
    format!("{lat:.6}, {lon:.6}")
}
