use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use url::Url;

/// Store-assigned identifier. `0` until the profile has been persisted.
pub type ProfileId = u64;

/// Free-form options handed to a plugin at scan time.
pub type PluginOptions = Map<String, Value>;

pub type PairsInput = FieldInput<BTreeMap<String, String>>;
pub type CountersInput = FieldInput<BTreeMap<String, Counter>>;
pub type ListInput = FieldInput<Vec<String>>;
pub type PluginsInput = FieldInput<BTreeMap<String, PluginOptions>>;

/// A field that may be submitted either as raw form text or already structured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldInput<T> {
    Text(String),
    Structured(T),
}

impl<T> FieldInput<T> {
    pub fn text(raw: impl Into<String>) -> Self {
        Self::Text(raw.into())
    }

    pub fn structured(value: T) -> Self {
        Self::Structured(value)
    }
}

/// Redundant-link counter as submitted: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Counter {
    Number(Number),
    Text(String),
}

impl From<i64> for Counter {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<&str> for Counter {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCheck {
    pub url: Url,
    pub pattern: String,
}

/// A validated, normalized scan configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: ProfileId,
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub global: bool,
    #[serde(default)]
    pub shared_with: BTreeSet<String>,
    #[serde(default)]
    pub redundant: BTreeMap<String, u32>,
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
    #[serde(default)]
    pub custom_headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_check: Option<LoginCheck>,
    #[serde(default)]
    pub plugins: BTreeMap<String, PluginOptions>,
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub restrict_paths: Vec<String>,
    #[serde(default)]
    pub extend_paths: Vec<String>,
    #[serde(default)]
    pub exclude_vectors: Vec<String>,
    #[serde(default)]
    pub exclude_cookies: Vec<String>,
}

impl Profile {
    pub fn is_visible_to(&self, user: &str) -> bool {
        self.global || self.owner == user || self.shared_with.contains(user)
    }
}

/// Candidate profile as submitted by a form, a draft file or an import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProfileId>,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub global: bool,
    #[serde(default)]
    pub shared_with: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redundant: Option<CountersInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<PairsInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_headers: Option<PairsInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_check_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_check_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<PluginsInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<ListInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<ListInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<ListInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrict_paths: Option<ListInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extend_paths: Option<ListInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_vectors: Option<ListInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_cookies: Option<ListInput>,
}

impl ProfileDraft {
    /// Structured draft of an existing profile. Validating it yields the same profile.
    pub fn from_profile(profile: &Profile) -> Self {
        let redundant = profile
            .redundant
            .iter()
            .map(|(pattern, counter)| (pattern.clone(), Counter::from(i64::from(*counter))))
            .collect();

        Self {
            id: Some(profile.id),
            owner: profile.owner.clone(),
            name: profile.name.clone(),
            description: profile.description.clone(),
            default: profile.default,
            global: profile.global,
            shared_with: profile.shared_with.clone(),
            redundant: Some(FieldInput::Structured(redundant)),
            cookies: Some(FieldInput::Structured(profile.cookies.clone())),
            custom_headers: Some(FieldInput::Structured(profile.custom_headers.clone())),
            login_check_url: profile
                .login_check
                .as_ref()
                .map(|check| check.url.to_string()),
            login_check_pattern: profile
                .login_check
                .as_ref()
                .map(|check| check.pattern.clone()),
            plugins: Some(FieldInput::Structured(profile.plugins.clone())),
            modules: Some(FieldInput::Structured(profile.modules.clone())),
            exclude: Some(FieldInput::Structured(profile.exclude.clone())),
            include: Some(FieldInput::Structured(profile.include.clone())),
            restrict_paths: Some(FieldInput::Structured(profile.restrict_paths.clone())),
            extend_paths: Some(FieldInput::Structured(profile.extend_paths.clone())),
            exclude_vectors: Some(FieldInput::Structured(profile.exclude_vectors.clone())),
            exclude_cookies: Some(FieldInput::Structured(profile.exclude_cookies.clone())),
        }
    }

    /// New candidate derived from `template` (the default profile, or the source of a copy).
    ///
    /// The result is unsaved, owned by `owner`, and carries none of the template's
    /// default/global/sharing state.
    pub fn from_template(template: &Profile, owner: &str, name: &str) -> Self {
        Self {
            id: None,
            owner: owner.to_string(),
            name: name.to_string(),
            default: false,
            global: false,
            shared_with: BTreeSet::new(),
            ..Self::from_profile(template)
        }
    }
}
