use num::{Bounded, NumCast};
use std::fmt::Display;

use crate::{Error, Result};

/// Converts `value` to `To`, failing with [`Error::Underflow`] when it is below `To::min_value()`
/// and with [`Error::Overflow`] when it is above `To::max_value()`.
/// The value is never truncated or wrapped.
pub fn narrow<To, From>(value: From) -> Result<To>
where
    To: NumCast + Bounded,
    From: NumCast + PartialOrd + Copy + Display,
{
    // A bound that does not fit in the source type can never be crossed
    if let Some(min) = <From as NumCast>::from(To::min_value()) {
        if value < min {
            return Err(Error::Underflow(value.to_string()));
        }
    }

    if let Some(max) = <From as NumCast>::from(To::max_value()) {
        if value > max {
            return Err(Error::Overflow(value.to_string()));
        }
    }

    <To as NumCast>::from(value).ok_or_else(|| Error::Overflow(value.to_string()))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_narrow_error_message_holds_value() {
        match narrow::<u8, i64>(-5) {
            Err(Error::Underflow(msg)) => assert_eq!(msg, "-5"),
            other => panic!("unexpected result: {other:?}"),
        }

        match narrow::<i64, u64>(u64::MAX) {
            Err(Error::Overflow(msg)) => assert_eq!(msg, u64::MAX.to_string()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test_log::test]
    fn test_unsigned_target_rejects_negative() {
        assert!(matches!(narrow::<u64, i64>(-1), Err(Error::Underflow(_))));
        assert_eq!(narrow::<u64, i64>(i64::MAX).unwrap(), i64::MAX as u64);
    }

    #[test_log::test]
    fn test_narrow_float() {
        assert!(matches!(narrow::<f32, f64>(1e300), Err(Error::Overflow(_))));
        assert!(matches!(narrow::<f32, f64>(-1e300), Err(Error::Underflow(_))));
        assert_eq!(narrow::<f32, f64>(1.5).unwrap(), 1.5f32);
        assert!(narrow::<f32, f64>(f64::NAN).unwrap().is_nan());
    }
}
