//! Recognizers for the textual forms of primitive scalars.
//!
//! These are shared by kind inference (which decides quoting on output) and by the codec
//! (which decodes values for typed fields), so a value always reads back as the kind it was
//! written as.

use crate::node::ScalarKind;

/// Parse a boolean from a fixed, case-insensitive table.
///
/// Accepted TRUE literals: "true", "yes", "on"
/// Accepted FALSE literals: "false", "no", "off"
///
/// With `strict`, only "true" and "false" are accepted.
pub(crate) fn parse_bool(s: &str, strict: bool) -> Option<bool> {
    let t = s.trim();
    if t.eq_ignore_ascii_case("true") {
        Some(true)
    } else if t.eq_ignore_ascii_case("false") {
        Some(false)
    } else if strict {
        None
    } else if t.eq_ignore_ascii_case("yes") || t.eq_ignore_ascii_case("on") {
        Some(true)
    } else if t.eq_ignore_ascii_case("no") || t.eq_ignore_ascii_case("off") {
        Some(false)
    } else {
        None
    }
}

fn parse_digits_u128(digits: &str, radix: u32) -> Option<u128> {
    let mut val: u128 = 0;
    let mut saw = false;
    for c in digits.chars() {
        let d = c.to_digit(radix)?;
        val = val.checked_mul(radix as u128)?;
        val = val.checked_add(d as u128)?;
        saw = true;
    }
    if saw { Some(val) } else { None }
}

/// Parse an integer: optional sign, then decimal digits or a `0x` / `0o` / `0b` prefixed
/// magnitude. Decimal values with a leading zero (`007`) are rejected, because YAML 1.1
/// readers take them as octal and YAML 1.2 readers as decimal.
///
/// The result covers `i64::MIN..=u64::MAX`.
pub(crate) fn parse_int(s: &str) -> Result<i128, &'static str> {
    let t = s.trim();
    let (neg, rest) = match t.strip_prefix('+') {
        Some(r) => (false, r),
        None => match t.strip_prefix('-') {
            Some(r) => (true, r),
            None => (false, t),
        },
    };

    // Detect base
    let (radix, digits) = if let Some(r) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X")) {
        (16u32, r)
    } else if let Some(r) = rest.strip_prefix("0o").or_else(|| rest.strip_prefix("0O")) {
        (8u32, r)
    } else if let Some(r) = rest.strip_prefix("0b").or_else(|| rest.strip_prefix("0B")) {
        (2u32, r)
    } else {
        (10u32, rest)
    };

    if radix == 10 && digits.len() > 1 && digits.starts_with('0') {
        return Err("leading zeros are ambiguous");
    }

    let mag = parse_digits_u128(digits, radix).ok_or("not an integer")?;
    if mag > u64::MAX as u128 {
        return Err("integer out of range");
    }
    let val = if neg { -(mag as i128) } else { mag as i128 };
    if val < i64::MIN as i128 {
        return Err("integer out of range");
    }
    Ok(val)
}

/// True if `s` is a float in YAML notation: decimal with fraction and/or exponent, or
/// one of the `.inf` / `.nan` spellings. Plain integers are not floats here.
pub(crate) fn is_yaml_float(s: &str) -> bool {
    let t = s.trim();
    let lower = t.to_ascii_lowercase();
    if matches!(lower.as_str(), ".nan" | ".inf" | "+.inf" | "-.inf") {
        return true;
    }
    let body = t.strip_prefix(['+', '-']).unwrap_or(t);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) {
        return false;
    }
    if let Some(frac) = frac_part {
        if !all_digits(frac) || (int_part.is_empty() && frac.is_empty()) {
            return false;
        }
    } else if int_part.is_empty() {
        return false;
    }
    match exponent {
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && all_digits(digits)
        }
        None => frac_part.is_some(),
    }
}

pub(crate) fn parse_float(s: &str) -> Option<f64> {
    let t = s.trim();
    match t.to_ascii_lowercase().as_str() {
        ".nan" => Some(f64::NAN),
        ".inf" | "+.inf" => Some(f64::INFINITY),
        "-.inf" => Some(f64::NEG_INFINITY),
        _ if is_yaml_float(t) => t.parse::<f64>().ok(),
        _ => None,
    }
}

pub(crate) fn is_null_literal(s: &str) -> bool {
    matches!(s, "" | "~" | "null" | "Null" | "NULL")
}

/// Kind a plain scalar with this text is read as.
pub(crate) fn infer_kind(s: &str) -> ScalarKind {
    if is_null_literal(s) {
        ScalarKind::Null
    } else if parse_bool(s, false).is_some() {
        ScalarKind::Bool
    } else if parse_int(s).is_ok() {
        ScalarKind::Int
    } else if is_yaml_float(s) {
        ScalarKind::Float
    } else {
        ScalarKind::Str
    }
}
