//! Small shared helpers.

use tracing::warn;

/// Clamp a signal value to `[0, 1]`, logging when the source was out of range.
///
/// Malformed upstream values are never fatal; the run continues with the
/// clamped value and the anomaly is visible in the logs.
pub fn clamp_unit(value: f64, context: &str) -> f64 {
    if value.is_nan() {
        warn!(context = context, "NaN signal value, clamping to 0.0");
        return 0.0;
    }
    if !(0.0..=1.0).contains(&value) {
        warn!(
            context = context,
            value = value,
            "Signal value outside [0, 1], clamping"
        );
    }
    value.clamp(0.0, 1.0)
}
