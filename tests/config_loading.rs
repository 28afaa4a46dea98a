use std::fs;

use reel_booker::catalog::Catalog;
use reel_booker::config::load_config;
use reel_booker::error::Error;

fn write_temp_config(name: &str, contents: &str) -> String {
    let path = std::env::temp_dir().join(format!("reel_booker_test_{name}_{}.json", std::process::id()));
    fs::write(&path, contents).expect("failed to write temp config");
    path.to_string_lossy().into_owned()
}

#[test]
fn loads_a_valid_config_into_a_queryable_catalog() {
    let path = write_temp_config(
        "valid",
        r#"{ "movies": [
            { "movie": "GodFather", "theatres": ["Tokyo", "Delhi"] },
            { "movie": "Inception", "theatres": ["Berlin"] }
        ] }"#,
    );

    let config = load_config(&path).expect("config should parse");
    let catalog = Catalog::load(config).expect("catalog should build");

    assert!(catalog.get("GodFather").is_some());
    assert!(catalog.get("Inception").is_some());
    assert!(catalog.get("Nope").is_none());

    let names: Vec<&str> = catalog.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["GodFather", "Inception"]); // BTreeMap: alphabetical

    let _ = fs::remove_file(&path);
}

#[test]
fn unknown_keys_in_the_config_are_ignored() {
    let path = write_temp_config(
        "unknown_keys",
        r#"{ "movies": [ { "movie": "GodFather", "theatres": ["Tokyo"], "rating": "PG" } ], "version": 3 }"#,
    );

    let config = load_config(&path).expect("unknown keys should not fail parsing");
    let catalog = Catalog::load(config).expect("catalog should build");
    assert!(catalog.get("GodFather").is_some());

    let _ = fs::remove_file(&path);
}

#[test]
fn malformed_json_is_a_bad_message_error() {
    let path = write_temp_config("malformed", "{ not json");
    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, Error::BadMessage(_)));
    let _ = fs::remove_file(&path);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_config("/tmp/reel_booker_test_definitely_missing.json").unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn duplicate_movie_names_across_entries_fail_the_whole_load() {
    let path = write_temp_config(
        "dup_movie",
        r#"{ "movies": [
            { "movie": "GodFather", "theatres": ["Tokyo"] },
            { "movie": "GodFather", "theatres": ["Delhi"] }
        ] }"#,
    );

    let config = load_config(&path).expect("config should parse");
    let err = Catalog::load(config).unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let _ = fs::remove_file(&path);
}
