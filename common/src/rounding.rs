/// Rounds `x` to 4 decimal places, matching the `round(..., 4)` calls the
/// reference implementation applies to every balance comparison.
pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
