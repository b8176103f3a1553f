/// Round seconds to two decimal places, the precision every timing value is carried at.
pub fn round2(x: f64) -> f64 {
    let r = (x * 100.0).round() / 100.0;
    // Avoid emitting "-0.00".
    if r == 0.0 { 0.0 } else { r }
}

/// Format seconds the way the renderer's expression language expects them (`%.2f`).
pub fn fmt_secs(x: f64) -> String {
    format!("{:.2}", round2(x))
}

/// Absolute-tolerance float comparison used by timing checks.
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
