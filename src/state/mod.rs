//! Application state
//!
//! [`ApplicationState`] is the single aggregate behind the course UI. Its
//! transitions are plain methods here; [`crate::store::StateStore`] wraps
//! them with persistence and change notification.

mod prefs;
mod provider;

pub use prefs::{Language, TextDirection, Theme};
pub use provider::{ProviderConfig, ProviderId, Providers};

use crate::course::FIRST_LAB_ID;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lab identifier. Values outside the course catalog are representable.
pub type LabId = i64;

/// Model selected before any provider has been configured.
pub const DEFAULT_MODEL_ID: &str = "command-r-plus";

/// Error returned when parsing an unknown enumeration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
    expected: String,
}

impl ParseEnumError {
    fn new<'a>(kind: &'static str, value: &str, expected: impl Iterator<Item = &'a str>) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: expected.collect::<Vec<_>>().join(", "),
        }
    }
}

/// Session state shared by every view of the course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationState {
    /// Per-provider configuration; every [`ProviderId`] is present.
    pub providers: Providers,

    /// Provider used for model calls.
    ///
    /// Only the cold-start default may point at an inactive provider.
    pub active_provider_id: ProviderId,

    /// Model used for calls against the active provider.
    pub selected_model_id: String,

    /// Lab or view currently displayed.
    pub current_lab_id: LabId,

    /// Completed labs; absent means not completed.
    pub lab_completion: BTreeMap<LabId, bool>,

    /// Interface language
    pub ui_language: Language,

    /// Color theme
    pub ui_theme: Theme,
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self::starting_at(FIRST_LAB_ID)
    }
}

impl ApplicationState {
    /// Cold-start state with `first_lab_id` as the current lab.
    #[must_use]
    pub fn starting_at(first_lab_id: LabId) -> Self {
        Self {
            providers: Providers::default(),
            active_provider_id: ProviderId::Cohere,
            selected_model_id: DEFAULT_MODEL_ID.to_string(),
            current_lab_id: first_lab_id,
            lab_completion: BTreeMap::new(),
            ui_language: Language::default(),
            ui_theme: Theme::default(),
        }
    }

    /// Configuration of the active provider.
    #[must_use]
    pub fn active_provider(&self) -> &ProviderConfig {
        self.providers.get(self.active_provider_id)
    }

    /// Whether `lab` has been marked complete.
    #[must_use]
    pub fn is_lab_complete(&self, lab: LabId) -> bool {
        self.lab_completion.get(&lab) == Some(&true)
    }

    /// Completed lab ids in ascending order.
    pub fn completed_labs(&self) -> impl Iterator<Item = LabId> {
        self.lab_completion
            .iter()
            .filter(|(_, done)| **done)
            .map(|(&lab, _)| lab)
    }

    /// Store a provider's credential and model list, mark it active and
    /// select it.
    ///
    /// The head of `available_models` becomes the selected model; an empty
    /// list keeps the previous selection.
    pub fn activate_provider(
        &mut self,
        id: ProviderId,
        credential: String,
        available_models: Vec<String>,
    ) {
        if let Some(head) = available_models.first() {
            self.selected_model_id.clone_from(head);
        }
        self.providers.set(
            id,
            ProviderConfig {
                credential: Some(credential),
                available_models,
                is_active: true,
            },
        );
        self.active_provider_id = id;
    }

    /// Switch to an already-active provider.
    ///
    /// Returns `false` and leaves the state untouched when the provider has
    /// never been configured.
    pub fn set_active_provider(&mut self, id: ProviderId) -> bool {
        let config = self.providers.get(id);
        if !config.is_active {
            return false;
        }
        if let Some(head) = config.default_model() {
            self.selected_model_id = head.to_string();
        }
        self.active_provider_id = id;
        true
    }

    /// Select a model without checking it against the active provider.
    pub fn set_selected_model(&mut self, model: String) {
        self.selected_model_id = model;
    }

    /// Show `lab`. No range check.
    pub const fn set_current_lab(&mut self, lab: LabId) {
        self.current_lab_id = lab;
    }

    /// Mark `lab` complete. Completion is never cleared.
    pub fn mark_lab_complete(&mut self, lab: LabId) {
        self.lab_completion.insert(lab, true);
    }

    /// Mark `lab` complete and move to the following lab, stopping at
    /// `total_lab_count`.
    ///
    /// Returns the new current lab.
    pub fn mark_lab_complete_and_advance(&mut self, lab: LabId, total_lab_count: u32) -> LabId {
        self.mark_lab_complete(lab);
        let next = if lab < LabId::from(total_lab_count) {
            lab + 1
        } else {
            lab
        };
        self.current_lab_id = next;
        next
    }

    /// Set the interface language.
    pub const fn set_language(&mut self, language: Language) {
        self.ui_language = language;
    }

    /// Set the color theme.
    pub const fn set_theme(&mut self, theme: Theme) {
        self.ui_theme = theme;
    }
}
