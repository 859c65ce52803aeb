//! Synthetic clear-sky history with random attenuation, used when no
//! measured data is available.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Timelike};
use rand::Rng;

use super::{HistoryFormat, LoadedHistory};
use crate::domain::{HistoricalSample, HistoryInput, HOURS_PER_DAY};

/// Clear-sky noon peak (W/m²)
const PEAK_GHI: f64 = 1000.0;
const SOLAR_NOON: f64 = 12.0;
/// Width of the bell curve in hours
const SPREAD_HOURS: f64 = 3.0;

/// Clear-sky value for an hour of day before attenuation
fn clear_sky(hour: u32) -> f64 {
    if !(6..18).contains(&hour) {
        return 0.0;
    }
    let x = (hour as f64 - SOLAR_NOON) / SPREAD_HOURS;
    PEAK_GHI * (-0.5 * x * x).exp()
}

/// Start of the calendar day containing `now`, in the same offset.
///
/// Synthetic history ending here starts at 00:00, so positional hour
/// buckets line up with wall-clock hours.
pub fn day_start(now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| now.offset().from_local_datetime(&midnight).single())
        .unwrap_or(now)
}

/// `days * 24` hourly samples ending just before `end`, oldest first.
///
/// Each daylight hour is the clear-sky curve scaled by a factor in `[0.7, 1.0)`.
pub fn generate<R: Rng>(
    days: u32,
    end: DateTime<FixedOffset>,
    rng: &mut R,
) -> Vec<HistoricalSample> {
    let count = days as usize * HOURS_PER_DAY;
    let Some(start) = end.checked_sub_signed(Duration::days(days as i64)) else {
        return Vec::new();
    };

    (0..count)
        .map_while(|i| start.checked_add_signed(Duration::hours(i as i64)))
        .map(|timestamp| {
            let base = clear_sky(timestamp.hour());
            let ghi = if base > 0.0 {
                base * (0.7 + 0.3 * rng.gen::<f64>())
            } else {
                0.0
            };
            HistoricalSample { timestamp, ghi }
        })
        .collect()
}

/// [`generate`] wrapped as a loaded history source
pub fn history<R: Rng>(days: u32, end: DateTime<FixedOffset>, rng: &mut R) -> LoadedHistory {
    LoadedHistory {
        input: HistoryInput::Series(generate(days, end, rng)),
        format: HistoryFormat::Synthetic { days },
        message: format!("Synthetic history covering {days} days"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::SeasonalPattern;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    fn end() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 15, 0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_length_and_spacing() {
        let mut rng = StdRng::seed_from_u64(42);
        let samples = generate(30, end(), &mut rng);
        assert_eq!(samples.len(), 30 * 24);
        assert_eq!(samples[0].timestamp, end() - Duration::days(30));
        for pair in samples.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::hours(1));
        }
    }

    #[test]
    fn test_values_follow_bell_curve_envelope() {
        let mut rng = StdRng::seed_from_u64(7);
        for sample in generate(10, end(), &mut rng) {
            let hour = sample.timestamp.hour();
            let cap = clear_sky(hour);
            if cap == 0.0 {
                assert_eq!(sample.ghi, 0.0, "hour {hour} should be dark");
            } else {
                assert!(sample.ghi >= 0.7 * cap && sample.ghi < cap);
            }
        }
    }

    #[test]
    fn test_same_seed_same_history() {
        let a = generate(3, end(), &mut StdRng::seed_from_u64(1));
        let b = generate(3, end(), &mut StdRng::seed_from_u64(1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_history_wrapper() {
        let loaded = history(2, end(), &mut StdRng::seed_from_u64(5));
        assert_eq!(loaded.input.len(), 48);
        assert_eq!(loaded.format, HistoryFormat::Synthetic { days: 2 });
    }

    #[test]
    fn test_zero_days_is_empty() {
        assert!(generate(0, end(), &mut StdRng::seed_from_u64(1)).is_empty());
    }

    #[test]
    fn test_midnight_aligned_history_peaks_at_noon() {
        let samples = generate(7, end(), &mut StdRng::seed_from_u64(3));
        let pattern = SeasonalPattern::extract(&HistoryInput::Series(samples));
        let peak = (0..24)
            .max_by(|a, b| pattern.get(*a).total_cmp(&pattern.get(*b)))
            .unwrap();
        assert_eq!(peak, 12);
        assert_eq!(pattern.get(3), 0.0);
    }

    #[rstest]
    #[case(7, 15, 37)]
    #[case(7, 0, 0)]
    #[case(-5, 23, 59)]
    #[case(0, 6, 1)]
    #[case(9, 12, 30)]
    fn test_day_start_anchored_history_peaks_at_noon(
        #[case] offset_h: i32,
        #[case] hour: u32,
        #[case] minute: u32,
    ) {
        let now = FixedOffset::east_opt(offset_h * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 15, hour, minute, 0)
            .unwrap();
        let end = day_start(now);
        assert_eq!((end.hour(), end.minute()), (0, 0));
        assert_eq!(end.date_naive(), now.date_naive());
        assert_eq!(end.offset(), now.offset());

        let loaded = history(30, end, &mut StdRng::seed_from_u64(11));
        let pattern = SeasonalPattern::extract(&loaded.input);
        let peak = (0..24)
            .max_by(|a, b| pattern.get(*a).total_cmp(&pattern.get(*b)))
            .unwrap();
        assert_eq!(peak, 12);
        assert_eq!(pattern.get(0), 0.0);
        assert_eq!(pattern.get(21), 0.0);
    }
}
