//! Half-up decimal rounding.
//!
//! Results are shown to households as short decimals, and the rounding must
//! match what the browser front end has always displayed: halves round
//! towards positive infinity (`2.25 -> 2.3`, `-2.25 -> -2.2`).

/// Rounds `value` to `places` decimals, halves up.
pub fn round_to(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(places);
    (value * factor + 0.5).floor() / factor
}

/// One decimal place.
pub fn round1(value: f64) -> f64 {
    round_to(value, 1)
}

/// Two decimal places.
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Renders a rupee amount without a trailing `.0` for whole numbers.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", round2(value))
    }
}
