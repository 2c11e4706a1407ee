use eframe_sketch::config::{Preferences, UndoLimit};
use eframe_sketch::error::ConfigError;

#[test]
fn preferences_survive_a_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    let prefs = Preferences {
        undo_limit: UndoLimit::Limited(50),
    };

    prefs.save(&path).unwrap();
    assert_eq!(Preferences::load(&path).unwrap(), prefs);
}

#[test]
fn undo_limit_accepts_a_count_or_unlimited() {
    let limited = Preferences::from_json(r#"{ "undo_limit": 20 }"#).unwrap();
    assert_eq!(limited.undo_limit, UndoLimit::Limited(20));

    let unlimited = Preferences::from_json(r#"{ "undo_limit": "Unlimited" }"#).unwrap();
    assert_eq!(unlimited.undo_limit, UndoLimit::Unlimited);
    assert_eq!(unlimited.undo_limit.depth(), usize::MAX);
}

#[test]
fn missing_fields_use_defaults() {
    let prefs = Preferences::from_json("{}").unwrap();
    assert_eq!(prefs, Preferences::default());
    assert_eq!(prefs.undo_limit, UndoLimit::Unlimited);
}

#[test]
fn unknown_undo_limit_word_is_rejected() {
    let err = Preferences::from_json(r#"{ "undo_limit": "lots" }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
    assert!(err.to_string().contains("lots"));
}

#[test]
fn unreadable_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, "not json").unwrap();

    assert_eq!(Preferences::load_or_default(&path), Preferences::default());
    assert_eq!(Preferences::load_or_default(dir.path().join("missing.json")), Preferences::default());
}
