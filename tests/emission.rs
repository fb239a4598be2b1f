use anyhow::Result;
use indoc::indoc;

use axiom::{Document, Error, Mapping, Node, Style, ser_options};

#[test]
fn flow_paths_select_collections() -> Result<()> {
    let doc = Document::parse(indoc! {"
        server:
          tags:
            - a
            - b
          limits:
            cpu: 2
        tags:
          - c
    "})?;
    let opts = ser_options! {
        flow_paths: vec!["server.tags".to_string(), "server.limits".to_string()],
    };
    assert_eq!(
        doc.serialize(&opts)?,
        "server:\n  tags: [a, b]\n  limits: {cpu: 2}\ntags:\n  - c\n"
    );
    Ok(())
}

#[test]
fn flow_hints_can_be_ignored() -> Result<()> {
    let doc = Document::parse("tags: [a, b]\nempty: []\n")?;
    assert_eq!(doc.to_string(), "tags: [a, b]\nempty: []\n");
    let opts = ser_options! { respect_flow_hints: false };
    assert_eq!(doc.serialize(&opts)?, "tags:\n  - a\n  - b\nempty: []\n");
    Ok(())
}

#[test]
fn wider_indent_step() -> Result<()> {
    let doc = Document::parse("server:\n  port: 1\n  tags:\n    - a\n")?;
    let opts = ser_options! { indent_step: 4 };
    let out = doc.serialize(&opts)?;
    assert_eq!(out, "server:\n    port: 1\n    tags:\n        - a\n");
    assert_eq!(Document::parse(&out)?, doc);
    Ok(())
}

#[test]
fn sequences_at_key_column() -> Result<()> {
    let doc = Document::parse("list:\n  - a\n  - b\nnext: 1\n")?;
    let opts = ser_options! { indent_sequences: false };
    let out = doc.serialize(&opts)?;
    assert_eq!(out, "list:\n- a\n- b\nnext: 1\n");
    assert_eq!(Document::parse(&out)?, doc);
    Ok(())
}

#[test]
fn quote_all_affects_strings_only() -> Result<()> {
    let doc = Document::parse("name: demo\nport: 1\nflag: true\n")?;
    let opts = ser_options! { quote_all: true };
    assert_eq!(doc.serialize(&opts)?, "name: \"demo\"\nport: 1\nflag: true\n");
    Ok(())
}

#[test]
fn strings_are_quoted_when_needed() -> Result<()> {
    let mut doc = Document::new();
    doc.set("version", Node::string("1.0"))?;
    doc.set("answer", Node::string("yes"))?;
    doc.set("comment", Node::string("a # b"))?;
    doc.set("lead", Node::string("- item"))?;
    doc.set("a: b", Node::plain("1"))?;
    doc.set("quote", Node::string("it's"))?;
    doc.set("lang", Node::string("C#"))?;
    doc.set("tag", Node::string("#tag"))?;
    let out = doc.to_string();
    assert_eq!(
        out,
        indoc! {r##"
            version: "1.0"
            answer: "yes"
            comment: "a # b"
            lead: "- item"
            "a: b": 1
            quote: it's
            lang: C#
            tag: "#tag"
        "##}
    );
    let reparsed = Document::parse(&out)?;
    assert_eq!(reparsed.get_str("lang"), Some("C#"));
    assert_eq!(reparsed.get_str("answer"), Some("yes"));
    assert_eq!(reparsed.get_str("a: b"), Some("1"));
    Ok(())
}

#[test]
fn multi_line_strings() -> Result<()> {
    let mut doc = Document::new();
    doc.set("text", Node::string("one\ntwo\n"))?;
    doc.set("stripped", Node::string("one\ntwo"))?;
    doc.set("kept", Node::string("one\n\n"))?;
    assert_eq!(
        doc.to_string(),
        "text: |\n  one\n  two\nstripped: |-\n  one\n  two\nkept: |+\n  one\n\n"
    );

    let opts = ser_options! { prefer_block_scalars: false };
    assert_eq!(
        doc.serialize(&opts)?,
        "text: \"one\\ntwo\\n\"\nstripped: \"one\\ntwo\"\nkept: \"one\\n\\n\"\n"
    );

    let reparsed = Document::parse(&doc.to_string())?;
    assert_eq!(reparsed.get_str("kept"), Some("one\n\n"));
    assert_eq!(reparsed.get_str("stripped"), Some("one\ntwo"));
    Ok(())
}

#[test]
fn folded_scalars_read_back() -> Result<()> {
    let doc = Document::parse("text: >\n  folded line\n  continues\n\n  new paragraph\n")?;
    assert_eq!(doc.get_str("text"), Some("folded line continues\nnew paragraph\n"));
    let out = doc.to_string();
    assert!(out.starts_with("text: >\n"), "{out}");
    assert_eq!(Document::parse(&out)?.get_str("text"), doc.get_str("text"));
    Ok(())
}

#[test]
fn programmatic_flow_collections() -> Result<()> {
    let inner: Mapping = [("x", Node::plain("1")), ("y", Node::string("two words"))]
        .into_iter()
        .collect();
    let root: Mapping = [
        ("point", Node::mapping(inner).with_style(Style::Flow)),
        (
            "list",
            Node::sequence(vec![Node::plain("a"), Node::null(), Node::string("b, c")])
                .with_style(Style::Flow),
        ),
    ]
    .into_iter()
    .collect();
    let doc = Document::from_root(Node::mapping(root));
    let out = doc.to_string();
    assert_eq!(out, "point: {x: 1, y: two words}\nlist: [a, null, \"b, c\"]\n");
    let reparsed = Document::parse(&out)?;
    assert_eq!(reparsed.get_str("point.y"), Some("two words"));
    assert!(reparsed.get("list.1").is_some_and(Node::is_null));
    assert_eq!(reparsed.get_str("list.2"), Some("b, c"));
    Ok(())
}

#[test]
fn invalid_indent_step() {
    let doc = Document::new();
    let err = doc.serialize(&ser_options! { indent_step: 12 }).unwrap_err();
    assert!(matches!(err, Error::InvalidOptions(_)), "{err}");
}
