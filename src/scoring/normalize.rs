/// Round to 4 decimal places, the precision every published score carries.
///
/// Rounds the exact binary value: anything below a half goes down even when
/// scaling by 10^4 would land on it, and exact halves go to the even digit.
pub fn round4(value: f64) -> f64 {
    format!("{:.4}", value).parse().unwrap_or(value)
}

/// Compress a company's raw total so weight tuning can't inflate ratings.
///
/// Intervals are open: exactly 60, 70, 80 and 90 pass through unchanged, as
/// does anything at or below 60.
pub fn normalize_total(raw: f64) -> f64 {
    let total = if raw > 60.0 && raw < 70.0 {
        raw / 70.0 * 68.0
    } else if raw > 70.0 && raw < 80.0 {
        raw / 80.0 * 76.0
    } else if raw > 80.0 && raw < 90.0 {
        raw / 90.0 * 84.0
    } else if raw > 90.0 {
        raw / 110.0 * 92.0
    } else {
        raw
    };
    round4(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round4() {
        assert_eq!(round4(50.0), 50.0);
        assert_eq!(round4(33.333333), 33.3333);
        assert_eq!(round4(66.66666), 66.6667);
        assert_eq!(round4(0.0), 0.0);
    }

    #[test]
    fn test_round4_just_below_half_rounds_down() {
        // 0.05625 and 0.00375 are stored slightly below the half.
        assert_eq!(round4(0.056249999999999994), 0.0562);
        assert_eq!(round4(0.00375), 0.0037);
        assert_eq!(round4(70.013 / 80.0 * 76.0), 66.5123);
    }

    #[test]
    fn test_round4_exact_halves_go_to_even() {
        assert_eq!(round4(1.03125), 1.0312);
        assert_eq!(round4(1.09375), 1.0938);
        assert_eq!(round4(-1.03125), -1.0312);
    }

    #[test]
    fn test_round4_non_finite_passes_through() {
        assert!(round4(f64::NAN).is_nan());
        assert_eq!(round4(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_low_scores_untouched() {
        assert_eq!(normalize_total(0.0), 0.0);
        assert_eq!(normalize_total(42.5), 42.5);
        assert_eq!(normalize_total(59.9999), 59.9999);
    }

    #[test]
    fn test_boundaries_pass_through() {
        for boundary in [60.0, 70.0, 80.0, 90.0] {
            assert_eq!(normalize_total(boundary), boundary);
        }
    }

    #[test]
    fn test_each_interval() {
        assert_eq!(normalize_total(65.0), round4(65.0 / 70.0 * 68.0));
        assert_eq!(normalize_total(75.0), 71.25);
        assert_eq!(normalize_total(85.0), round4(85.0 / 90.0 * 84.0));
        assert_eq!(normalize_total(100.0), round4(100.0 / 110.0 * 92.0));
    }

    #[test]
    fn test_normalized_total_rounds_like_published_scores() {
        assert_eq!(normalize_total(70.013), 66.5123);
        assert_eq!(normalize_total(100.0), 83.6364);
    }

    #[test]
    fn test_compression_is_discontinuous_at_boundaries() {
        // Just above 70 drops below 70; exactly 70 does not.
        assert!(normalize_total(70.0001) < 70.0);
        assert_eq!(normalize_total(70.0), 70.0);
    }

    #[test]
    fn test_monotonic_within_intervals() {
        let intervals = [(60.0, 70.0), (70.0, 80.0), (80.0, 90.0), (90.0, 200.0)];
        for (low, high) in intervals {
            let mut previous = normalize_total(low + 0.01);
            let mut raw = low + 0.51;
            while raw < high {
                let current = normalize_total(raw);
                assert!(current > previous, "not increasing at {}", raw);
                previous = current;
                raw += 0.5;
            }
        }
    }

    #[test]
    fn test_totals_above_ninety_are_scaled_down() {
        assert_eq!(normalize_total(110.0), 92.0);
        assert!(normalize_total(250.0) < 250.0);
    }
}
