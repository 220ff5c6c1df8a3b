/// Round half-up to one decimal place.
///
/// Every derived quantity goes through this so thresholds compare against the
/// same representation on every recomputation. Inputs are non-negative in
/// practice, where `f64::round` (half away from zero) is half-up.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Lead time as a divisor: zero days is treated as one.
pub fn lead_time_divisor(lead_time_days: u32) -> f64 {
    f64::from(lead_time_days.max(1))
}
