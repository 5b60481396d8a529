//! Unit conversions shared by the thermostat and weather reports.
//!
//! All rounding is half-to-even, so `0.5` rounds to `0` and `1.5` to `2`.

/// Humidity (percent) below which the dew point approximation is undefined.
pub const DEW_POINT_MIN_HUMIDITY: f64 = 50.0;

/// Round to the nearest integer, ties to even.
pub fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}

/// Round to the nearest integer (ties to even) for display.
pub fn round_to_i64(value: f64) -> i64 {
    round_half_even(value) as i64
}

/// Celsius to whole degrees Fahrenheit.
pub fn c_to_f(celsius: f64) -> f64 {
    round_half_even(celsius * 9.0 / 5.0 + 32.0)
}

/// Approximate dew point in Celsius.
///
/// `temp - (100 - rh) / 5`, only defined for humidity of 50% or more.
pub fn dew_point_c(temperature_c: f64, humidity_pct: f64) -> Option<f64> {
    if humidity_pct >= DEW_POINT_MIN_HUMIDITY {
        Some(temperature_c - (100.0 - humidity_pct) / 5.0)
    } else {
        None
    }
}

/// Approximate dew point in whole degrees Fahrenheit.
pub fn dew_point_f(temperature_c: f64, humidity_pct: f64) -> Option<f64> {
    dew_point_c(temperature_c, humidity_pct).map(c_to_f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_to_f_fixed_points() {
        assert_eq!(c_to_f(0.0), 32.0);
        assert_eq!(c_to_f(100.0), 212.0);
        assert_eq!(c_to_f(-40.0), -40.0);
    }

    #[test]
    fn test_c_to_f_rounds_to_nearest() {
        // 69.98
        assert_eq!(c_to_f(21.1), 70.0);
        // 71.6
        assert_eq!(c_to_f(22.0), 72.0);
    }

    #[test]
    fn test_c_to_f_ties_go_to_even() {
        // -17.5 C is exactly 0.5 F
        assert_eq!(c_to_f(-17.5), 0.0);
        assert_eq!(round_half_even(1.5), 2.0);
        assert_eq!(round_half_even(2.5), 2.0);
        assert_eq!(round_half_even(-0.5), 0.0);
    }

    #[test]
    fn test_dew_point_threshold() {
        assert_eq!(dew_point_c(20.0, 50.0), Some(10.0));
        assert_eq!(dew_point_c(20.0, 49.0), None);
        assert_eq!(dew_point_c(20.0, 100.0), Some(20.0));
    }

    #[test]
    fn test_dew_point_f() {
        // 10 C -> 50 F
        assert_eq!(dew_point_f(20.0, 50.0), Some(50.0));
        assert_eq!(dew_point_f(20.0, 49.9), None);
    }

    #[test]
    fn test_round_to_i64() {
        assert_eq!(round_to_i64(72.4), 72);
        assert_eq!(round_to_i64(72.5), 72);
        assert_eq!(round_to_i64(73.5), 74);
    }
}
