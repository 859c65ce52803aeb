//! Daylight window guard.
//!
//! Irradiance outside `[06:00, 18:00)` is forced to zero. The predictors use
//! it before their recurrence and the engine applies it once more after the
//! weather adjustment.

/// First hour with non-zero irradiance
pub const SUNRISE_HOUR: u32 = 6;
/// First hour with zero irradiance after the day
pub const SUNSET_HOUR: u32 = 18;

pub fn is_daylight(hour: u32) -> bool {
    (SUNRISE_HOUR..SUNSET_HOUR).contains(&hour)
}

/// Returns 0 outside the daylight window, `ghi` otherwise
pub fn constrain(hour: u32, ghi: f64) -> f64 {
    if is_daylight(hour) {
        ghi
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, false)]
    #[case(5, false)]
    #[case(6, true)]
    #[case(12, true)]
    #[case(17, true)]
    #[case(18, false)]
    #[case(23, false)]
    fn test_window(#[case] hour: u32, #[case] expected: bool) {
        assert_eq!(is_daylight(hour), expected);
    }

    #[test]
    fn test_constrain() {
        assert_eq!(constrain(3, 250.0), 0.0);
        assert_eq!(constrain(9, 250.0), 250.0);
        assert_eq!(constrain(18, 250.0), 0.0);
    }
}
