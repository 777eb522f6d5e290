use std::fs;

use rust_slideshow::captions::CaptionDocument;
use rust_slideshow::catalog::ImageEntry;
use rust_slideshow::config::Configuration;
use rust_slideshow::error::Error;
use tempfile::tempdir;

#[test]
fn parse_full_json_document() {
    let json = r#"{
        "images": { "sources": ["images/1.jpg", "images/2.jpg"], "shuffle": true },
        "music": { "sources": ["music/a.mp3"], "shuffle": true, "volume": 0.6 },
        "transitions": ["fade", "cut"],
        "randomTransitions": false,
        "autoplay": true,
        "delay": 6000,
        "keyboard": { "enabled": false },
        "debug": { "enabled": true }
    }"#;
    let cfg = Configuration::from_json_str(json).unwrap().validated().unwrap();
    assert_eq!(cfg.images.sources.len(), 2);
    assert!(cfg.images.shuffle);
    assert!(cfg.images.reshuffle_on_loop);
    assert_eq!(cfg.music.volume, Some(0.6));
    assert!(cfg.music.shuffle);
    assert!(!cfg.music.reshuffle_on_wrap);
    assert_eq!(cfg.transitions, vec!["fade".to_string(), "cut".to_string()]);
    assert!(!cfg.random_transitions);
    assert!(cfg.autoplay);
    assert_eq!(cfg.autoplay_delay().as_millis(), 6000);
    assert!(!cfg.keyboard.enabled);
    assert!(cfg.debug.enabled);
    assert!(cfg.captions.enabled);
}

#[test]
fn yaml_file_is_detected_by_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        r#"
images:
  sources: [a.jpg, b.jpg]
  reshuffleOnLoop: false
transitions: []
transitionDuration: 250
shuffleSeed: 42
"#,
    )
    .unwrap();
    let cfg = Configuration::from_file(&path).unwrap();
    assert_eq!(cfg.images.sources, vec!["a.jpg".to_string(), "b.jpg".to_string()]);
    assert!(!cfg.images.reshuffle_on_loop);
    assert!(cfg.transitions.is_empty());
    assert_eq!(cfg.transition_duration().as_millis(), 250);
    assert_eq!(cfg.shuffle_seed, Some(42));
}

#[test]
fn json_file_is_the_default_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "delay": 1500 }"#).unwrap();
    assert_eq!(Configuration::from_file(&path).unwrap().delay, 1500);
}

#[test]
fn malformed_json_is_reported() {
    assert!(matches!(
        Configuration::from_json_str("{ \"delay\": "),
        Err(Error::Json(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(
        Configuration::from_file(dir.path().join("nope.json")),
        Err(Error::Io(_))
    ));
}

#[test]
fn blank_transition_name_is_rejected() {
    let cfg = Configuration::from_json_str(r#"{ "transitions": ["fade", " "] }"#).unwrap();
    assert!(matches!(cfg.validated(), Err(Error::Config(_))));
}

#[test]
fn caption_document_by_filename_and_ordinal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("captions.json");
    fs::write(
        &path,
        r#"{
            "1.jpg": { "title": "One", "description": "First", "author": "Kim", "date": "2021-05-01" },
            "4": { "title": "Four" }
        }"#,
    )
    .unwrap();
    let doc = CaptionDocument::from_file(&path).unwrap();
    assert_eq!(doc.len(), 2);

    let one = ImageEntry {
        index: 0,
        filename: "1.jpg".into(),
        source: "images/1.jpg".into(),
    };
    let rec = doc.lookup(&one).unwrap();
    assert_eq!(rec.title, "One");
    assert_eq!(rec.meta(), "Kim • 2021-05-01");

    let four = ImageEntry {
        index: 4,
        filename: "x.jpg".into(),
        source: "x.jpg".into(),
    };
    assert_eq!(doc.lookup(&four).unwrap().title, "Four");
    assert_eq!(doc.lookup(&four).unwrap().description, "");

    let none = ImageEntry {
        index: 9,
        filename: "9.jpg".into(),
        source: "9.jpg".into(),
    };
    assert!(doc.lookup(&none).is_none());
}
