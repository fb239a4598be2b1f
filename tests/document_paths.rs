use anyhow::Result;
use indoc::indoc;

use axiom::{Document, MergeOptions, Node};

#[test]
fn set_keeps_comment() -> Result<()> {
    let mut doc = Document::parse("a: 1 # comment\n")?;
    doc.set("a", Node::plain("2"))?;
    assert_eq!(doc.to_string(), "a: 2 # comment\n");

    doc.set("a", Node::plain("3").with_inline_comment("# replaced"))?;
    assert_eq!(doc.to_string(), "a: 3 # replaced\n");
    Ok(())
}

#[test]
fn set_creates_missing_parents() -> Result<()> {
    let mut doc = Document::parse("")?;
    doc.set("a.b.c", Node::plain("true"))?;
    assert_eq!(doc.to_string(), "a:\n  b:\n    c: true\n");
    assert_eq!(doc.get_bool("a.b.c")?, Some(true));

    // A null on the way is replaced by a mapping.
    let mut doc = Document::parse("a:\n")?;
    doc.set("a.b", Node::plain("1"))?;
    assert_eq!(doc.to_string(), "a:\n  b: 1\n");
    Ok(())
}

#[test]
fn set_addresses_sequence_elements() -> Result<()> {
    let mut doc = Document::parse("list:\n  - a # first\n  - b\n")?;
    doc.set("list.0", Node::plain("z"))?;
    doc.set("list.2", Node::plain("c"))?;
    assert_eq!(doc.to_string(), "list:\n  - z # first\n  - b\n  - c\n");
    assert!(doc.set("list.9", Node::plain("x")).is_err());
    Ok(())
}

#[test]
fn remove_key() -> Result<()> {
    let mut doc = Document::parse(indoc! {"
        a: 1
        b:
          c: 2 # gone
          d: 3
    "})?;
    let removed = doc.remove("b.c").expect("b.c exists");
    assert_eq!(removed.as_str(), Some("2"));
    assert_eq!(doc.to_string(), "a: 1\nb:\n  d: 3\n");
    assert!(doc.remove("b.c").is_none());
    assert!(doc.remove("missing.path").is_none());
    Ok(())
}

#[test]
fn string_list() -> Result<()> {
    let doc = Document::parse("flags: [true, \"false\", 'true']\n")?;
    assert_eq!(
        doc.get_string_list("flags")?,
        Some(vec!["true".to_string(), "false".to_string(), "true".to_string()])
    );
    assert_eq!(doc.get_string_list("absent")?, None);

    let doc = Document::parse("flags: yes\n")?;
    assert!(doc.get_string_list("flags").is_err());
    Ok(())
}

#[test]
fn typed_getters() -> Result<()> {
    let doc = Document::parse(indoc! {"
        server:
          port: 0x1F90
          debug: on
          name: demo
          nothing: ~
    "})?;
    assert_eq!(doc.get_int("server.port")?, Some(8080));
    assert_eq!(doc.get_bool("server.debug")?, Some(true));
    assert_eq!(doc.get_str("server.name"), Some("demo"));
    assert_eq!(doc.get_str("server.nothing"), None);
    assert_eq!(doc.get_int("server.nothing")?, None);
    assert!(doc.get_int("server.name").is_err());
    Ok(())
}

#[test]
fn paths_and_keys() -> Result<()> {
    let doc = Document::parse(indoc! {"
        a:
          b: 1
          c:
            d: 2
        e: [1, 2]
    "})?;
    assert_eq!(doc.paths(), ["a", "a.b", "a.c", "a.c.d", "e"]);
    assert_eq!(doc.keys(""), ["a", "e"]);
    assert_eq!(doc.keys("a.c"), ["d"]);
    assert!(doc.keys("e").is_empty());
    Ok(())
}

#[test]
fn merge_adds_missing_keys_only() -> Result<()> {
    let mut doc = Document::parse("a: 1\nb: 2\n")?;
    let defaults = Document::parse("a: 9\nc: 3 # from defaults\n")?;
    doc.merge_defaults(&defaults, MergeOptions::default());
    assert_eq!(doc.to_string(), "a: 1\nb: 2\nc: 3 # from defaults\n");
    Ok(())
}

#[test]
fn merge_with_overwrite() -> Result<()> {
    let mut doc = Document::parse("a: 1 # mine\nb:\n  x: 1\n")?;
    let defaults = Document::parse("a: 2 # theirs\nb:\n  x: 5\n  y: 6\n")?;
    let options = MergeOptions {
        overwrite_values: true,
        ..Default::default()
    };
    doc.merge_defaults(&defaults, options);
    assert_eq!(doc.to_string(), "a: 2 # mine\nb:\n  x: 5\n  y: 6\n");
    Ok(())
}

#[test]
fn merge_overwrites_comments() -> Result<()> {
    let mut doc = Document::parse("a: 1\nb: 2\n")?;
    let defaults = Document::parse("b: 3 # Test\nc: 4 # Test 2\n")?;
    let options = MergeOptions {
        overwrite_comments: true,
        ..Default::default()
    };
    doc.merge_defaults(&defaults, options);
    assert_eq!(doc.to_string(), "a: 1\nb: 2 # Test\nc: 4 # Test 2\n");
    Ok(())
}

#[test]
fn merge_repairs_sections_and_fills_comments() -> Result<()> {
    let defaults = Document::parse(indoc! {"
        # Database
        db:
          host: x
        # about a
        a: 2
    "})?;

    let mut doc = Document::parse("db: foo\na: 1\n")?;
    doc.merge_defaults(&defaults, MergeOptions::default());
    assert_eq!(doc.to_string(), "# Database\ndb:\n  host: x\n# about a\na: 1\n");

    let mut doc = Document::parse("db: foo\na: 1\n")?;
    let options = MergeOptions {
        overwrite_invalid: false,
        ..Default::default()
    };
    doc.merge_defaults(&defaults, options);
    assert_eq!(doc.to_string(), "# Database\ndb: foo\n# about a\na: 1\n");
    Ok(())
}

#[test]
fn merge_keeps_existing_comments_when_filling() -> Result<()> {
    let mut doc = Document::parse("a: 1 # mine\n")?;
    let defaults = Document::parse("# lead\na: 2 # theirs\n")?;
    doc.merge_defaults(&defaults, MergeOptions::default());
    assert_eq!(doc.to_string(), "# lead\na: 1 # mine\n");
    Ok(())
}

#[test]
fn documents_compare_structurally() -> Result<()> {
    let a = Document::parse("a: 1\nlist: [x, y]\n")?;
    let b = Document::parse("a: 1\nlist:\n  - x\n  - y\n")?;
    assert_eq!(a, b);
    let c = Document::parse("a: 1 # note\nlist: [x, y]\n")?;
    assert_ne!(a, c);
    Ok(())
}
