//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Suppress small values.
///
/// Values whose magnitude is strictly below `threshold` are snapped to zero, all others are
/// returned unchanged. This is a hard cutoff, values just above the threshold are not scaled.
pub fn dead_band<T>(value: T, threshold: T) -> T
where
    T: Float
{
    if value.abs() < threshold {
        T::zero()
    }
    else {
        value
    }
}

/// Limit a value to the range `[min, max]`.
///
/// A NaN value is returned as NaN, callers which must never output NaN shall check for it.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Square root of the magnitude of `value`, carrying the sign of `value`.
///
/// Zero maps to zero.
pub fn signed_sqrt<T>(value: T) -> T
where
    T: Float
{
    if value < T::zero() {
        -(-value).sqrt()
    }
    else {
        value.sqrt()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dead_band() {
        assert_eq!(dead_band(0.04f64, 0.05), 0.0);
        assert_eq!(dead_band(-0.04f64, 0.05), 0.0);
        assert_eq!(dead_band(0.05f64, 0.05), 0.05);
        assert_eq!(dead_band(-0.05f64, 0.05), -0.05);
        assert_eq!(dead_band(0.051f64, 0.05), 0.051);
        assert_eq!(dead_band(-0.9f64, 0.05), -0.9);
        assert_eq!(dead_band(0.0f64, 0.05), 0.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(1.5f64, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-3.0f64, -1.0, 1.0), -1.0);
        assert_eq!(clamp(0.25f64, -1.0, 1.0), 0.25);
        assert_eq!(clamp(1.2f64, 0.0, 1.0), 1.0);
        assert_eq!(clamp(f64::INFINITY, -1.0, 1.0), 1.0);
        assert!(clamp(f64::NAN, -1.0, 1.0).is_nan());
    }

    #[test]
    fn test_signed_sqrt() {
        assert_eq!(signed_sqrt(4.0f64), 2.0);
        assert_eq!(signed_sqrt(-9.0f64), -3.0);
        assert_eq!(signed_sqrt(0.0f64), 0.0);
    }
}
