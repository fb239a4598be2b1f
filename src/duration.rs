//! Human-readable durations: `90s`, `5m`, `1h30m`, `250ms`, `2d`, or a bare number of
//! seconds.
//!
//! Bound durations travel to Rust types in serde's own `std::time::Duration` shape
//! (`{secs, nanos}`), so fields can simply be declared as `Duration`.

use std::time::Duration;

use serde_json::{Map, Value};

const UNITS: &[(&str, u128)] = &[
    ("d", 86_400_000),
    ("h", 3_600_000),
    ("m", 60_000),
    ("s", 1_000),
    ("ms", 1),
];

fn unit_millis(unit: &str) -> Option<u128> {
    UNITS.iter().find(|(name, _)| *name == unit).map(|(_, ms)| *ms)
}

fn from_total_millis(total: u128) -> Option<Duration> {
    let secs = u64::try_from(total / 1_000).ok()?;
    // < 1000 ms, so the nanos always fit.
    let nanos = (total % 1_000) as u32 * 1_000_000;
    Some(Duration::new(secs, nanos))
}

/// Parse a duration. Components must be non-negative integers; units may repeat in any
/// order (`1m30s`, `30s1m`).
pub(crate) fn parse_duration(s: &str) -> Option<Duration> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    if t.bytes().all(|b| b.is_ascii_digit()) {
        return t.parse::<u64>().ok().map(Duration::from_secs);
    }

    let mut total: u128 = 0;
    let mut rest = t;
    while !rest.is_empty() {
        let digits_end = rest.find(|c: char| !c.is_ascii_digit())?;
        if digits_end == 0 {
            return None;
        }
        let amount: u128 = rest[..digits_end].parse().ok()?;
        rest = &rest[digits_end..];
        let unit_end = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
        let millis = unit_millis(&rest[..unit_end])?;
        total = total.checked_add(amount.checked_mul(millis)?)?;
        rest = &rest[unit_end..];
    }
    from_total_millis(total)
}

/// Canonical text: largest units first.
///
/// `None` when `d` carries sub-millisecond precision, which the text form cannot hold.
pub(crate) fn format_duration(d: Duration) -> Option<String> {
    if d.subsec_nanos() % 1_000_000 != 0 {
        return None;
    }
    let mut millis = d.as_millis();
    if millis == 0 {
        return Some("0s".to_string());
    }
    let mut out = String::new();
    for (name, size) in UNITS {
        let amount = millis / size;
        if amount > 0 {
            out.push_str(&amount.to_string());
            out.push_str(name);
            millis %= size;
        }
    }
    Some(out)
}

pub(crate) fn duration_to_json(d: Duration) -> Value {
    let mut map = Map::new();
    map.insert("secs".to_string(), Value::from(d.as_secs()));
    map.insert("nanos".to_string(), Value::from(d.subsec_nanos()));
    Value::Object(map)
}

pub(crate) fn duration_from_json(value: &Value) -> Option<Duration> {
    let obj = value.as_object()?;
    let secs = obj.get("secs")?.as_u64()?;
    let nanos = obj.get("nanos")?.as_u64()?;
    Some(Duration::new(secs, u32::try_from(nanos).ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_units() {
        assert_eq!(parse_duration("90"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("90s"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("1h30m"), Some(Duration::from_secs(5400)));
        assert_eq!(parse_duration("250ms"), Some(Duration::from_millis(250)));
        assert_eq!(parse_duration("2d"), Some(Duration::from_secs(172_800)));
        assert_eq!(parse_duration("1m1m"), Some(Duration::from_secs(120)));
    }

    #[test]
    fn rejects_garbage() {
        for s in ["", "s", "5x", "-5s", "1.5h", "h1", "5 s"] {
            assert_eq!(parse_duration(s), None, "{s}");
        }
    }

    #[test]
    fn canonical_format() {
        assert_eq!(format_duration(Duration::from_secs(5400)).as_deref(), Some("1h30m"));
        assert_eq!(format_duration(Duration::from_millis(1_250)).as_deref(), Some("1s250ms"));
        assert_eq!(format_duration(Duration::ZERO).as_deref(), Some("0s"));
        assert_eq!(format_duration(Duration::from_secs(86_400 + 1)).as_deref(), Some("1d1s"));
    }

    #[test]
    fn largest_duration_survives_text_round_trip() {
        let d = Duration::new(u64::MAX, 999_000_000);
        let text = format_duration(d).unwrap();
        assert_eq!(parse_duration(&text), Some(d));

        let bare = parse_duration("18446744073709551615").unwrap();
        assert_eq!(parse_duration(&format_duration(bare).unwrap()), Some(bare));
    }

    #[test]
    fn sub_millisecond_precision_has_no_text_form() {
        assert_eq!(format_duration(Duration::from_nanos(1)), None);
        assert_eq!(format_duration(Duration::new(5, 1_500_000)), None);
    }

    #[test]
    fn overflowing_sums_are_rejected() {
        assert_eq!(parse_duration("18446744073709551615s1s"), None);
        assert_eq!(parse_duration("99999999999999999999999999d"), None);
    }

    #[test]
    fn json_shape_matches_serde() {
        let d = Duration::new(3, 5);
        let v = duration_to_json(d);
        let back: Duration = serde_json::from_value(v.clone()).unwrap();
        assert_eq!(back, d);
        assert_eq!(duration_from_json(&v), Some(d));
        assert_eq!(serde_json::to_value(d).unwrap(), v);
    }
}
