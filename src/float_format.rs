//! Float rendering that always reads back as a YAML float.

use num_traits::float::FloatCore;
use zmij::Float;

/// Shortest round-trip text for `f`, with the special values spelled the YAML way.
///
/// zmij omits the fraction for whole numbers (`2`, `4e-6`); a `.0` is inserted before any
/// exponent so the scalar is not inferred as an integer.
pub(crate) fn float_to_string<F: Float + FloatCore>(f: F) -> String {
    if f.is_nan() {
        return ".nan".to_string();
    }
    if f.is_infinite() {
        return if f.is_sign_positive() { ".inf" } else { "-.inf" }.to_string();
    }
    let mut buf = zmij::Buffer::new();
    let digits = buf.format_finite(f);
    if digits.contains('.') {
        return digits.to_string();
    }
    let (mantissa, exponent) = digits.split_at(digits.find(['e', 'E']).unwrap_or(digits.len()));
    format!("{mantissa}.0{exponent}")
}
