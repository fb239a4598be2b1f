use anyhow::Result;

use axiom::{Document, Error, options};

#[test]
fn deep_flow_nesting_is_rejected() {
    let depth = 10_000;
    let text = format!("{}{}\n", "[".repeat(depth), "]".repeat(depth));
    let err = Document::parse(&text).unwrap_err();
    assert!(matches!(err, Error::DocumentTooDeep { limit: 128, .. }), "{err}");
}

#[test]
fn deep_flow_mappings_are_rejected() {
    let depth = 10_000;
    let text = format!("a: {}1{}\n", "{k: ".repeat(depth), "}".repeat(depth));
    let err = Document::parse(&text).unwrap_err();
    assert!(matches!(err, Error::DocumentTooDeep { .. }), "{err}");
}

#[test]
fn deep_block_nesting_is_rejected() {
    let mut text = String::new();
    for level in 0..300 {
        text.push_str(&" ".repeat(level));
        text.push_str("k:\n");
    }
    let err = Document::parse(&text).unwrap_err();
    let Error::DocumentTooDeep { location, .. } = err else {
        panic!("expected DocumentTooDeep, got {err}");
    };
    assert_eq!(location.line(), 129);
}

#[test]
fn limit_is_configurable() -> Result<()> {
    let text = "a:\n  b:\n    c: 1\n";
    assert!(Document::parse_with_options(text, &options! { max_depth: 3 }).is_ok());
    let err = Document::parse_with_options(text, &options! { max_depth: 2 }).unwrap_err();
    assert!(matches!(err, Error::DocumentTooDeep { limit: 2, .. }), "{err}");

    let deep = format!("{}{}", "[".repeat(200), "]".repeat(200));
    let doc = Document::parse_with_options(&deep, &options! { max_depth: 256 })?;
    assert!(doc.root.as_sequence().is_some());
    Ok(())
}
