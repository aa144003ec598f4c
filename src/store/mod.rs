//! The application state store
//!
//! [`StateStore`] owns the [`ApplicationState`], applies the named
//! mutations, writes the full state through to a [`Backend`] after each one
//! and publishes [`StoreEvent`]s to subscribers.
//!
//! Persistence is best effort. A failed write is logged and kept as
//! [`StateStore::last_persistence_error`]; the in-memory state stands for
//! the rest of the session.

mod event;

pub use event::{PostTransitionHint, StoreEvent};

use crate::config::Config;
use crate::course::{Course, Progress};
use crate::state::{ApplicationState, LabId, Language, ProviderId, Theme};
use crate::storage::{Backend, StorageError, persisted};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Errors returned by store operations that validate their input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Strict model selection is on and the model is not offered by the
    /// active provider.
    #[error("model `{model}` is not offered by provider {provider}")]
    UnknownModel {
        /// Active provider at the time of the call
        provider: ProviderId,
        /// Rejected model id
        model: String,
    },
}

/// Construction-time settings for a [`StateStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Key the state document is stored under
    pub storage_key: String,
    /// Current lab of a cold-start state
    pub first_lab_id: LabId,
    /// Reject model ids the active provider does not offer
    pub strict_model_selection: bool,
    /// Delay attached to scroll hints
    pub scroll_delay: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            storage_key: config.storage_key.clone(),
            first_lab_id: config.first_lab_id,
            strict_model_selection: config.strict_model_selection,
            scroll_delay: Duration::from_millis(config.scroll_delay_ms),
        }
    }
}

/// Single owner of the application state.
#[derive(Debug)]
pub struct StateStore<B: Backend> {
    backend: B,
    options: StoreOptions,
    state: ApplicationState,
    subscribers: Vec<Sender<StoreEvent>>,
    last_persistence_error: Option<StorageError>,
}

impl<B: Backend> StateStore<B> {
    /// Open a store over `backend`, restoring any persisted state.
    ///
    /// A missing, unreadable or corrupt document yields the compiled-in
    /// defaults; opening never fails.
    pub fn open(backend: B, options: StoreOptions) -> Self {
        let state = Self::restore(&backend, &options);
        Self {
            backend,
            options,
            state,
            subscribers: Vec::new(),
            last_persistence_error: None,
        }
    }

    fn restore(backend: &B, options: &StoreOptions) -> ApplicationState {
        let defaults = ApplicationState::starting_at(options.first_lab_id);
        let blob = match backend.get(&options.storage_key) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!("No stored state under {:?}, using defaults", options.storage_key);
                return defaults;
            }
            Err(e) => {
                warn!("Failed to read stored state: {}", e);
                return defaults;
            }
        };

        match persisted::decode_over(&blob, defaults.clone()) {
            Ok(state) => {
                debug!("Restored state from {:?}", options.storage_key);
                state
            }
            Err(e) => {
                warn!("Discarding unreadable stored state: {}", e);
                defaults
            }
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> &ApplicationState {
        &self.state
    }

    /// Options the store was opened with
    #[must_use]
    pub const fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Underlying backend
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend, e.g. to inject failures in tests.
    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Error from the most recent write, cleared by the next successful one.
    #[must_use]
    pub const fn last_persistence_error(&self) -> Option<&StorageError> {
        self.last_persistence_error.as_ref()
    }

    /// Completion summary of `course` for the current state.
    #[must_use]
    pub fn progress(&self, course: &Course) -> Progress {
        course.progress(&self.state)
    }

    /// Receive an event for every applied mutation from now on.
    ///
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Configure `provider` with `credential` and `available_models`, then
    /// make it the active provider.
    ///
    /// The first model becomes the selection; an empty list keeps the
    /// current one. Repeating the call with the same arguments is a no-op
    /// on the resulting state.
    pub fn activate_provider(
        &mut self,
        provider: ProviderId,
        credential: impl Into<String>,
        available_models: Vec<String>,
    ) {
        info!(
            provider = %provider,
            models = available_models.len(),
            "Activating provider"
        );
        self.state.activate_provider(provider, credential.into(), available_models);
        self.commit();
    }

    /// Make `provider` the active provider.
    ///
    /// A provider that was never activated is silently ignored: nothing is
    /// changed, persisted or published, and `false` is returned.
    pub fn set_active_provider(&mut self, provider: ProviderId) -> bool {
        if !self.state.set_active_provider(provider) {
            debug!("Ignoring selection of inactive provider {}", provider);
            return false;
        }
        self.commit();
        true
    }

    /// Select `model` for the active provider.
    ///
    /// Any id is accepted unless strict model selection is enabled.
    ///
    /// # Errors
    ///
    /// With strict model selection, returns [`StoreError::UnknownModel`] if
    /// the active provider does not offer `model`; the state is unchanged.
    pub fn set_selected_model(&mut self, model: impl Into<String>) -> Result<(), StoreError> {
        let model = model.into();
        if self.options.strict_model_selection && !self.state.active_provider().offers(&model) {
            return Err(StoreError::UnknownModel {
                provider: self.state.active_provider_id,
                model,
            });
        }
        self.state.set_selected_model(model);
        self.commit();
        Ok(())
    }

    /// Show `lab`. Out-of-catalog ids are stored as given.
    pub fn set_current_lab(&mut self, lab: LabId) {
        self.state.set_current_lab(lab);
        self.commit();
    }

    /// Mark `lab` complete without navigating.
    pub fn mark_lab_complete(&mut self, lab: LabId) {
        self.state.mark_lab_complete(lab);
        self.commit();
    }

    /// Mark `lab` complete and move to the next lab, clamped at
    /// `total_lab_count`.
    ///
    /// The returned scroll hint is also published to subscribers after the
    /// state change.
    pub fn mark_lab_complete_and_advance(
        &mut self,
        lab: LabId,
        total_lab_count: u32,
    ) -> PostTransitionHint {
        let next = self.state.mark_lab_complete_and_advance(lab, total_lab_count);
        debug!("Completed lab {}, now on lab {}", lab, next);
        self.commit();

        let hint = PostTransitionHint::ScrollToTop {
            delay: self.options.scroll_delay,
        };
        self.publish(&StoreEvent::Hint(hint));
        hint
    }

    /// Set the interface language.
    pub fn set_language(&mut self, language: Language) {
        self.state.set_language(language);
        self.commit();
    }

    /// Set the color theme.
    pub fn set_theme(&mut self, theme: Theme) {
        self.state.set_theme(theme);
        self.commit();
    }

    /// Return to the cold-start state and persist it.
    pub fn reset(&mut self) {
        info!("Resetting application state");
        self.state = ApplicationState::starting_at(self.options.first_lab_id);
        self.commit();
    }

    fn commit(&mut self) {
        self.persist();
        self.publish(&StoreEvent::StateChanged(self.state.clone()));
    }

    fn persist(&mut self) {
        let result = persisted::encode(&self.state)
            .and_then(|blob| self.backend.set(&self.options.storage_key, &blob));
        match result {
            Ok(()) => self.last_persistence_error = None,
            Err(e) => {
                warn!("Failed to persist state: {}", e);
                self.last_persistence_error = Some(e);
            }
        }
    }

    fn publish(&mut self, event: &StoreEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
