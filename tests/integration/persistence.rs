//! Tests for write-through persistence to the file backend

use crate::common::StoreFixture;
use agents101::storage::persisted;
use agents101::{
    ApplicationState, Backend, Language, ProviderId, StoreEvent, StoreOptions, Theme,
};
use pretty_assertions::assert_eq;
use std::fs;

fn models(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

#[test]
fn test_cold_start_has_no_file_and_default_state() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = StoreFixture::new()?;
    let store = fixture.open();

    assert_eq!(store.state(), &ApplicationState::default());
    assert!(!fixture.state_path()?.exists());
    Ok(())
}

#[test]
fn test_session_survives_restart() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = StoreFixture::new()?;

    let expected = {
        let mut store = fixture.open();
        store.activate_provider(
            ProviderId::Cohere,
            "key-a",
            models(&["command-r-plus", "command-r"]),
        );
        store.activate_provider(ProviderId::Browser, "local", models(&["phi-3-mini"]));
        store.set_active_provider(ProviderId::Cohere);
        store.set_selected_model("command-r")?;
        store.mark_lab_complete_and_advance(1, 8);
        store.mark_lab_complete_and_advance(2, 8);
        store.set_language(Language::He);
        store.set_theme(Theme::Light);
        assert!(store.last_persistence_error().is_none());
        store.state().clone()
    };

    let reopened = fixture.open();
    assert_eq!(reopened.state(), &expected);
    assert_eq!(reopened.state().current_lab_id, 3);
    assert_eq!(reopened.state().selected_model_id, "command-r");
    Ok(())
}

#[test]
fn test_file_holds_versioned_document() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = StoreFixture::new()?;
    let mut store = fixture.open();
    store.mark_lab_complete(4);

    let contents = fs::read_to_string(fixture.state_path()?)?;
    let value: serde_json::Value = serde_json::from_str(&contents)?;
    assert_eq!(value["version"], persisted::FORMAT_VERSION);
    assert!(value["savedAt"].is_string());
    assert_eq!(value["state"]["labCompletion"]["4"], true);
    Ok(())
}

#[test]
fn test_corrupt_file_falls_back_to_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = StoreFixture::new()?;
    let mut backend = fixture.backend();
    backend.set(&fixture.options.storage_key, "{\"state\": [truncated")?;

    let mut store = fixture.open();
    assert_eq!(store.state(), &ApplicationState::default());

    // The next mutation overwrites the corrupt document.
    store.set_current_lab(2);
    assert_eq!(fixture.open().state().current_lab_id, 2);
    Ok(())
}

#[test]
fn test_hand_edited_partial_file_merges_over_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = StoreFixture::new()?;
    let mut backend = fixture.backend();
    backend.set(
        &fixture.options.storage_key,
        r#"{"state": {"uiLanguage": "he", "labCompletion": {"1": true, "2": true}}}"#,
    )?;

    let store = fixture.open();
    assert_eq!(store.state().ui_language, Language::He);
    assert!(store.state().is_lab_complete(2));
    assert_eq!(store.state().current_lab_id, 1);
    assert!(!store.state().providers.get(ProviderId::Cohere).is_active);
    Ok(())
}

#[test]
fn test_invalid_field_does_not_wipe_progress() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = StoreFixture::new()?;
    let mut backend = fixture.backend();
    backend.set(
        &fixture.options.storage_key,
        r#"{"version": 1, "state": {
            "uiTheme": "sepia",
            "currentLabId": 6,
            "labCompletion": {"1": true, "2": true, "3": true},
            "providers": {"cohere": {"credential": "k", "availableModels": ["m"], "isActive": true}}
        }}"#,
    )?;

    let mut store = fixture.open();
    store.set_language(Language::He);
    assert!(store.last_persistence_error().is_none());

    let reopened = fixture.open();
    assert_eq!(reopened.state().ui_theme, Theme::Dark);
    assert_eq!(reopened.state().current_lab_id, 6);
    assert_eq!(reopened.state().completed_labs().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(reopened.state().providers.get(ProviderId::Cohere).is_active);
    Ok(())
}

#[test]
fn test_separate_keys_are_separate_profiles() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = StoreFixture::new()?;
    let mut first = fixture.open();
    first.set_theme(Theme::Light);

    let other = agents101::StateStore::open(
        fixture.backend(),
        StoreOptions {
            storage_key: "second-profile".to_string(),
            ..fixture.options.clone()
        },
    );
    assert_eq!(other.state().ui_theme, Theme::Dark);
    Ok(())
}

#[test]
fn test_unwritable_directory_keeps_in_memory_state() -> Result<(), Box<dyn std::error::Error>> {
    let fixture = StoreFixture::new()?;
    // A regular file where the data directory should be makes every write fail.
    if let Some(parent) = fixture.data_dir.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&fixture.data_dir, "not a directory")?;

    let mut store = fixture.open();
    let rx = store.subscribe();
    store.set_language(Language::He);

    assert_eq!(store.state().ui_language, Language::He);
    assert!(store.last_persistence_error().is_some());
    assert!(matches!(rx.try_recv()?, StoreEvent::StateChanged(_)));
    Ok(())
}
