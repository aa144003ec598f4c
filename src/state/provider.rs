//! LLM provider identifiers and their per-provider configuration

use super::ParseEnumError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Supported LLM providers.
///
/// The set is fixed at compile time; every provider always has an entry in
/// [`Providers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Hosted Cohere API, called with the user's API key.
    Cohere,
    /// Quantized model running inside the browser over WebGPU.
    Browser,
}

impl ProviderId {
    /// All supported providers, in display order.
    pub const ALL: &'static [Self] = &[Self::Cohere, Self::Browser];

    /// Lowercase identifier used in persisted state and on the command line.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cohere => "cohere",
            Self::Browser => "browser",
        }
    }

    /// Human-readable provider name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Cohere => "Cohere",
            Self::Browser => "In-browser (WebGPU)",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProviderId {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ParseEnumError::new("provider", s, Self::ALL.iter().copied().map(Self::label))
            })
    }
}

/// Configuration held for one provider.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Opaque API credential, `None` until configured.
    #[serde(default)]
    pub credential: Option<String>,

    /// Models offered by this provider, in display order.
    #[serde(default)]
    pub available_models: Vec<String>,

    /// Whether the provider has been successfully configured at least once.
    #[serde(default)]
    pub is_active: bool,
}

static UNCONFIGURED: ProviderConfig = ProviderConfig::unconfigured();

impl ProviderConfig {
    /// A provider that has never been configured.
    #[must_use]
    pub const fn unconfigured() -> Self {
        Self {
            credential: None,
            available_models: Vec::new(),
            is_active: false,
        }
    }

    /// First model in display order, used as the default selection.
    #[must_use]
    pub fn default_model(&self) -> Option<&str> {
        self.available_models.first().map(String::as_str)
    }

    /// Whether `model` is one of this provider's models.
    #[must_use]
    pub fn offers(&self, model: &str) -> bool {
        self.available_models.iter().any(|m| m == model)
    }
}

// Credentials never end up in logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("available_models", &self.available_models)
            .field("is_active", &self.is_active)
            .finish()
    }
}

/// Provider table keyed by [`ProviderId`].
///
/// Every id in [`ProviderId::ALL`] is present; entries are never added or
/// removed at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<ProviderId, ProviderConfig>",
    into = "BTreeMap<ProviderId, ProviderConfig>"
)]
pub struct Providers(BTreeMap<ProviderId, ProviderConfig>);

impl Default for Providers {
    fn default() -> Self {
        Self(
            ProviderId::ALL
                .iter()
                .map(|&id| (id, ProviderConfig::unconfigured()))
                .collect(),
        )
    }
}

impl From<BTreeMap<ProviderId, ProviderConfig>> for Providers {
    fn from(mut map: BTreeMap<ProviderId, ProviderConfig>) -> Self {
        for &id in ProviderId::ALL {
            map.entry(id).or_default();
        }
        Self(map)
    }
}

impl From<Providers> for BTreeMap<ProviderId, ProviderConfig> {
    fn from(providers: Providers) -> Self {
        providers.0
    }
}

impl Providers {
    /// Configuration for `id`.
    #[must_use]
    pub fn get(&self, id: ProviderId) -> &ProviderConfig {
        self.0.get(&id).unwrap_or(&UNCONFIGURED)
    }

    /// Replace the configuration for `id`.
    pub fn set(&mut self, id: ProviderId, config: ProviderConfig) {
        self.0.insert(id, config);
    }

    /// Iterate providers in [`ProviderId`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ProviderId, &ProviderConfig)> {
        self.0.iter().map(|(&id, config)| (id, config))
    }

    /// Providers that have been configured at least once.
    pub fn active(&self) -> impl Iterator<Item = ProviderId> {
        self.iter()
            .filter(|(_, config)| config.is_active)
            .map(|(id, _)| id)
    }
}
