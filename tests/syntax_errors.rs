use indoc::indoc;

use axiom::{Document, Error, options, render_snippet};

fn parse_err(text: &str) -> Error {
    match Document::parse(text) {
        Ok(doc) => panic!("expected a syntax error, parsed {doc:?}"),
        Err(err) => err,
    }
}

fn position(err: &Error) -> Option<(u64, u64)> {
    err.location().map(|l| (l.line(), l.column()))
}

#[test]
fn tab_in_indentation() {
    let err = parse_err("server:\n\tport: 1\n");
    assert!(matches!(err, Error::Syntax { .. }), "{err}");
    assert_eq!(position(&err), Some((2, 1)));
}

#[test]
fn unterminated_quote() {
    let err = parse_err("a: 'unterminated\nb: 1\n");
    assert!(err.to_string().contains("unterminated"), "{err}");
    assert_eq!(position(&err), Some((1, 4)));

    let err = parse_err("a: \"open\n");
    assert!(err.to_string().contains("unterminated"), "{err}");
}

#[test]
fn unsupported_yaml_features() {
    let cases = [
        ("base: &base 1\n", "anchors"),
        ("copy: *base\n", "aliases"),
        ("port: !!int 80\n", "tags"),
        ("%YAML 1.2\n---\na: 1\n", "directives"),
        ("a: 1\n---\nb: 2\n", "multiple documents"),
    ];
    for (text, needle) in cases {
        let err = parse_err(text);
        assert!(err.to_string().contains(needle), "{text:?}: {err}");
    }
}

#[test]
fn structural_mistakes() {
    let err = parse_err("a: 1\n  b: 2\n");
    assert_eq!(position(&err), Some((2, 3)));

    let err = parse_err("a: [1, 2\nb: 3\n");
    assert!(err.to_string().contains("flow"), "{err}");

    let err = parse_err("a: 1\na: 2\n");
    assert!(err.to_string().contains("duplicate mapping key `a`"), "{err}");

    let err = parse_err("a: b: c\n");
    assert!(matches!(err, Error::Syntax { .. }), "{err}");
}

#[test]
fn duplicate_keys_can_be_allowed() {
    let options = options! { duplicate_keys: axiom::options::DuplicateKeyPolicy::LastWins };
    let doc = Document::parse_with_options("a: 1\na: 2\n", &options).expect("last wins");
    assert_eq!(doc.get_str("a"), Some("2"));
}

#[test]
fn snippet_points_at_the_error() {
    let text = indoc! {"
        name: demo
        ports: [80, 443
        debug: true
    "};
    let err = parse_err(text);
    let report = render_snippet(&err, text, "server.yaml");
    assert!(report.contains("server.yaml"), "{report}");
    assert!(report.contains("ports: [80, 443"), "{report}");
    assert!(report.contains('^'), "{report}");
}

#[test]
fn snippet_lists_every_binding_failure() {
    use std::sync::LazyLock;

    use axiom::schema::{Field, Kind, Schema};

    static LIMITS: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("Limits")
            .field(Field::new("retries", Kind::Int))
            .field(Field::new("timeout", Kind::Duration))
            .build()
            .expect("limits schema")
    });

    let text = "retries: many\ntimeout: soon\n";
    let doc = Document::parse(text).expect("valid yaml");
    let err = axiom::bind::bind(&doc.root, &LIMITS, &Default::default()).unwrap_err();
    assert_eq!(err.leaves().len(), 2);

    let report = render_snippet(&err, text, "limits.yaml");
    assert!(report.starts_with("2 errors at `<root>`"), "{report}");
    assert!(report.contains("retries: many"), "{report}");
    assert!(report.contains("timeout: soon"), "{report}");
}

#[test]
fn errors_without_location_render_plainly() {
    let err = Document::parse("a: 1\n")
        .expect("valid yaml")
        .serialize(&axiom::ser_options! { indent_step: 0 })
        .unwrap_err();
    assert_eq!(render_snippet(&err, "a: 1\n", "a.yaml"), err.to_string());
}
