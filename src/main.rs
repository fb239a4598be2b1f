#![forbid(unsafe_code)]

use std::process::exit;

use axiom::{Document, Options, SerializerOptions, render_snippet};

/// Read a YAML configuration file, check that it parses, and print it in normalized form.
/// Single parameter is the file name.
fn main() {
    let path = match std::env::args().nth(1).ok_or(
        "This program validates a YAML configuration file and prints its normalized form. \
        Expected a path to a YAML file as the first argument",
    ) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("{err}");
            exit(1);
        }
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Failed to read {path}: {err}");
            exit(2);
        }
    };

    let document = match Document::parse_with_options(&content, &Options::default()) {
        Ok(document) => document,
        Err(err) => {
            eprintln!("{path} invalid:\n{}", render_snippet(&err, &content, &path));
            exit(3);
        }
    };

    match document.serialize(&SerializerOptions::default()) {
        Ok(text) => print!("{text}"),
        Err(err) => {
            eprintln!("Failed to write {path}: {err}");
            exit(3);
        }
    }
}
