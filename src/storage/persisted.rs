//! Persisted state document
//!
//! The whole [`ApplicationState`] is written as one JSON document:
//!
//! ```json
//! { "version": 1, "savedAt": "...", "state": { "activeProviderId": "cohere", ... } }
//! ```
//!
//! Loading is lenient. Every field present in the stored `state` overrides
//! the compiled-in default, absent fields keep the default, and a field
//! holding an invalid value is logged and keeps its default without
//! affecting the others. Provider entries and lab completion marks are
//! merged one entry at a time, so a provider added to the enumeration later
//! still gets its default entry. Unknown provider keys are dropped. Only a
//! blob that is not a JSON object is a decode error.

use super::StorageError;
use crate::state::{ApplicationState, LabId, ProviderConfig, ProviderId};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Default key the state document is stored under.
pub const STORAGE_KEY: &str = "agents101-storage";

/// Current document format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    state: &'a ApplicationState,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    version: Option<Value>,
    saved_at: Option<Value>,
    state: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
    providers: Option<Value>,
    active_provider_id: Option<Value>,
    selected_model_id: Option<Value>,
    current_lab_id: Option<Value>,
    lab_completion: Option<Value>,
    ui_language: Option<Value>,
    ui_theme: Option<Value>,
}

/// Serialize `state` into a document stamped with `saved_at`.
///
/// # Errors
///
/// Returns [`StorageError::Encode`] if serialization fails.
pub fn encode_at(
    state: &ApplicationState,
    saved_at: DateTime<Utc>,
) -> Result<String, StorageError> {
    serde_json::to_string(&EnvelopeRef {
        version: FORMAT_VERSION,
        saved_at,
        state,
    })
    .map_err(StorageError::Encode)
}

/// Serialize `state` into a document stamped with the current time.
///
/// # Errors
///
/// Returns [`StorageError::Encode`] if serialization fails.
pub fn encode(state: &ApplicationState) -> Result<String, StorageError> {
    encode_at(state, Utc::now())
}

/// Parse a stored document and merge it over `defaults`.
///
/// # Errors
///
/// Returns [`StorageError::Decode`] if `blob` is not a JSON object or its
/// `state` is not an object.
pub fn decode_over(
    blob: &str,
    defaults: ApplicationState,
) -> Result<ApplicationState, StorageError> {
    let Value::Object(document) = serde_json::from_str(blob).map_err(StorageError::Decode)? else {
        return Err(not_an_object("document"));
    };
    let envelope: Envelope =
        serde_json::from_value(Value::Object(document)).map_err(StorageError::Decode)?;

    if let Some(version) = field::<u32>("version", envelope.version)
        && version > FORMAT_VERSION
    {
        warn!("Stored state has format version {version}, newer than {FORMAT_VERSION}");
    }
    if let Some(saved_at) = field::<DateTime<Utc>>("savedAt", envelope.saved_at) {
        debug!("Restoring state saved at {saved_at}");
    }

    let stored = match envelope.state {
        None => StoredState::default(),
        Some(state @ Value::Object(_)) => {
            serde_json::from_value(state).map_err(StorageError::Decode)?
        }
        Some(_) => return Err(not_an_object("state")),
    };
    Ok(merge(stored, defaults))
}

fn not_an_object(what: &str) -> StorageError {
    StorageError::Decode(<serde_json::Error as serde::de::Error>::custom(format!(
        "stored {what} is not a JSON object"
    )))
}

/// Convert one stored field, `None` (keeping the default) if it is invalid.
fn field<T: DeserializeOwned>(name: &str, value: Option<Value>) -> Option<T> {
    match serde_json::from_value(value?) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Ignoring stored {name}: {e}");
            None
        }
    }
}

fn merge(stored: StoredState, mut state: ApplicationState) -> ApplicationState {
    let providers: Option<BTreeMap<String, Value>> = field("providers", stored.providers);
    for (key, config) in providers.into_iter().flatten() {
        match key.parse::<ProviderId>() {
            Ok(id) => {
                let name = format!("provider {id}");
                if let Some(config) = field::<ProviderConfig>(&name, Some(config)) {
                    state.providers.set(id, config);
                }
            }
            Err(e) => debug!("Ignoring stored provider: {e}"),
        }
    }
    if let Some(id) = field("activeProviderId", stored.active_provider_id) {
        state.active_provider_id = id;
    }
    if let Some(model) = field("selectedModelId", stored.selected_model_id) {
        state.selected_model_id = model;
    }
    if let Some(lab) = field("currentLabId", stored.current_lab_id) {
        state.current_lab_id = lab;
    }
    let completion: Option<BTreeMap<String, Value>> =
        field("labCompletion", stored.lab_completion);
    if let Some(completion) = completion {
        state.lab_completion = completion
            .into_iter()
            .filter_map(|(key, done)| {
                let Ok(lab) = key.parse::<LabId>() else {
                    warn!("Ignoring completion mark for lab {key:?}");
                    return None;
                };
                let done: bool = field(&format!("completion of lab {lab}"), Some(done))?;
                Some((lab, done))
            })
            .collect();
    }
    if let Some(language) = field("uiLanguage", stored.ui_language) {
        state.ui_language = language;
    }
    if let Some(theme) = field("uiTheme", stored.ui_theme) {
        state.ui_theme = theme;
    }
    state
}
