use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use indoc::indoc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use axiom::schema::{Field, Kind, Schema};
use axiom::{Configuration, Error, PathSegment, from_str, from_str_with_options, options};

const MODES: &[&str] = &["SURVIVAL", "CREATIVE"];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum GameMode {
    Survival,
    Creative,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Server {
    max_players: u32,
    timeout: Duration,
    mode: GameMode,
    ports: Vec<u16>,
    motd: String,
    pvp: bool,
    whitelist: Option<Vec<String>>,
}

static SERVER: LazyLock<Schema> = LazyLock::new(|| {
    Schema::builder("Server")
        .field(Field::new("maxPlayers", Kind::Int).alias("max-players").default(20))
        .field(Field::new("timeout", Kind::Duration).default_duration(Duration::from_secs(30)))
        .field(Field::new("mode", Kind::enumeration(MODES)).default("SURVIVAL"))
        .field(Field::new("ports", Kind::seq(Kind::Int)).default(Value::Array(vec![])))
        .field(Field::new("motd", Kind::Str).default("A server"))
        .field(Field::new("pvp", Kind::Bool).default(true))
        .field(Field::new("whitelist", Kind::seq(Kind::Str)).optional())
        .build()
        .expect("server schema")
});

impl Configuration for Server {
    fn schema() -> &'static Schema {
        &SERVER
    }
}

#[test]
fn defaults_fill_missing_fields() -> Result<()> {
    let server: Server = from_str("ports: [25565]\n")?;
    assert_eq!(server.max_players, 20);
    assert_eq!(server.timeout, Duration::from_secs(30));
    assert_eq!(server.mode, GameMode::Survival);
    assert_eq!(server.ports, vec![25565]);
    assert_eq!(server.motd, "A server");
    assert!(server.pvp);
    assert_eq!(server.whitelist, None);
    Ok(())
}

#[test]
fn empty_document_binds_to_defaults() -> Result<()> {
    let server: Server = from_str("# nothing configured yet\n")?;
    assert_eq!(server.timeout, Duration::from_secs(30));
    assert!(server.ports.is_empty());
    Ok(())
}

#[test]
fn alias_key_is_accepted() -> Result<()> {
    let server: Server = from_str("max-players: 50\n")?;
    assert_eq!(server.max_players, 50);
    Ok(())
}

#[test]
fn empty_logical_key_falls_back_to_alias() -> Result<()> {
    let server: Server = from_str("maxPlayers:\nmax-players: 50\n")?;
    assert_eq!(server.max_players, 50);
    Ok(())
}

#[test]
fn durations_keep_their_exact_value_on_save() -> Result<()> {
    let server: Server = from_str("timeout: 18446744073709551615\n")?;
    assert_eq!(server.timeout, Duration::from_secs(u64::MAX));
    let text = axiom::to_string(&server)?;
    let back: Server = from_str(&text)?;
    assert_eq!(back.timeout, server.timeout);

    let precise = Server {
        timeout: Duration::from_nanos(1),
        ..server
    };
    let err = axiom::to_string(&precise).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }), "{err}");
    Ok(())
}

#[test]
fn quoting_does_not_change_the_target_kind() -> Result<()> {
    let y = indoc! {r#"
        maxPlayers: "64"
        motd: 42
        pvp: 'false'
    "#};
    let server: Server = from_str(y)?;
    assert_eq!(server.max_players, 64);
    assert_eq!(server.motd, "42");
    assert!(!server.pvp);
    Ok(())
}

#[test]
fn durations_and_numbers() -> Result<()> {
    let y = indoc! {"
        timeout: 1h30m
        maxPlayers: 0x1F
        ports:
          - 1000
          - 0o17
    "};
    let server: Server = from_str(y)?;
    assert_eq!(server.timeout, Duration::from_secs(5400));
    assert_eq!(server.max_players, 31);
    assert_eq!(server.ports, vec![1000, 15]);
    Ok(())
}

#[test]
fn element_errors_are_reported_together() {
    let err = from_str::<Server>("ports: [\"1\", x, \"3\", y, \"5\"]\n").unwrap_err();
    let Error::Aggregate { path, errors } = &err else {
        panic!("expected an aggregate error, got {err}");
    };
    assert_eq!(path.to_string(), "ports");
    assert_eq!(errors.len(), 2);
    let indices: Vec<_> = err.leaves().iter().filter_map(|e| e.path()?.leaf_index()).collect();
    assert_eq!(indices, vec![1, 3]);
    for leaf in err.leaves() {
        assert!(matches!(leaf, Error::TypeMismatch { .. }), "{leaf}");
    }
}

#[test]
fn sibling_fields_fail_together() {
    let y = indoc! {"
        maxPlayers: lots
        mode: HARDCORE
    "};
    let err = from_str::<Server>(y).unwrap_err();
    let leaves = err.leaves();
    assert_eq!(leaves.len(), 2, "{err}");
    assert!(matches!(leaves[0], Error::TypeMismatch { .. }));
    assert!(matches!(leaves[1], Error::UnknownEnumValue { .. }));
}

#[test]
fn invalid_value_is_not_replaced_by_default() {
    let err = from_str::<Server>("maxPlayers: lots\n").unwrap_err();
    let Error::TypeMismatch { path, location, .. } = &err else {
        panic!("expected a type mismatch, got {err}");
    };
    assert_eq!(path.leaf(), Some(&PathSegment::Key("maxPlayers".to_string())));
    assert_eq!((location.line(), location.column()), (1, 13));
    assert!(err.to_string().contains("expected an integer"), "{err}");
}

#[test]
fn enum_names_are_case_sensitive() {
    let err = from_str::<Server>("mode: creative\n").unwrap_err();
    match err {
        Error::UnknownEnumValue { value, expected, .. } => {
            assert_eq!(value, "creative");
            assert_eq!(expected, MODES);
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn strict_booleans_reject_yaml11_words() -> Result<()> {
    let server: Server = from_str("pvp: off\n")?;
    assert!(!server.pvp);

    let strict = options! { strict_booleans: true };
    let err = from_str_with_options::<Server>("pvp: off\n", &strict).unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }), "{err}");
    let server: Server = from_str_with_options("pvp: False\n", &strict)?;
    assert!(!server.pvp);
    Ok(())
}

#[test]
fn null_means_absent() -> Result<()> {
    let y = indoc! {"
        motd: ~
        whitelist:
    "};
    let server: Server = from_str(y)?;
    assert_eq!(server.motd, "A server");
    assert_eq!(server.whitelist, None);

    let server: Server = from_str("whitelist:\n  - alice\n  - bob\n")?;
    assert_eq!(server.whitelist, Some(vec!["alice".to_string(), "bob".to_string()]));
    Ok(())
}

#[test]
fn null_sequence_element_is_missing() {
    let err = from_str::<Server>("ports:\n  - 1\n  -\n").unwrap_err();
    assert!(
        err.leaves().iter().any(|e| matches!(e, Error::MissingRequiredValue { .. })),
        "{err}"
    );
}

#[test]
fn unknown_keys_are_ignored_when_binding() -> Result<()> {
    let y = indoc! {"
        plugins:
          worldedit: true
        maxPlayers: 8
    "};
    let server: Server = from_str(y)?;
    assert_eq!(server.max_players, 8);
    Ok(())
}

mod nested {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Listener {
        host: String,
        port: u16,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Network {
        listeners: Vec<Listener>,
        admin: Listener,
        limits: std::collections::BTreeMap<u16, String>,
        #[serde(default)]
        session: String,
    }

    static LISTENER: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("Listener")
            .field(Field::new("host", Kind::Str).default("0.0.0.0"))
            .field(Field::new("port", Kind::Int).default(8080))
            .build()
            .expect("listener schema")
    });

    static NETWORK: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("Network")
            .field(Field::new("listeners", Kind::seq(Kind::Struct(&LISTENER))))
            .field(Field::new("admin", Kind::Struct(&LISTENER)))
            .field(Field::new("limits", Kind::map(Kind::Int, Kind::Str)).default(Value::Object(Default::default())))
            .field(Field::new("session", Kind::Str).excluded())
            .build()
            .expect("network schema")
    });

    impl Configuration for Network {
        fn schema() -> &'static Schema {
            &NETWORK
        }
    }

    #[test]
    fn nested_structs_and_maps() -> Result<()> {
        let y = indoc! {"
            listeners:
              - host: localhost
                port: 25565
              - port: 25566
            limits:
              0x10: small
              100: large
            session: ignored
        "};
        let network: Network = from_str(y)?;
        assert_eq!(network.listeners.len(), 2);
        assert_eq!(network.listeners[1].host, "0.0.0.0");
        // `admin` is absent but every field has a default.
        assert_eq!(network.admin.port, 8080);
        assert_eq!(network.limits.get(&16).map(String::as_str), Some("small"));
        assert_eq!(network.session, "");
        Ok(())
    }

    #[test]
    fn missing_required_sequence() {
        let err = from_str::<Network>("admin:\n  port: 1\n").unwrap_err();
        let Error::MissingRequiredValue { path, .. } = &err else {
            panic!("expected a missing value, got {err}");
        };
        assert_eq!(path.to_string(), "listeners");
    }

    #[test]
    fn element_path_reaches_into_nested_struct() {
        let err = from_str::<Network>("listeners:\n  - port: 1\n  - port: nope\n").unwrap_err();
        let leaves = err.leaves();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].path().map(ToString::to_string).as_deref(), Some("listeners[1].port"));
        let location = leaves[0].location().expect("parsed values carry a location");
        assert_eq!((location.line(), location.column()), (3, 11));
    }
}
