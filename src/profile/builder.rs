use std::collections::BTreeMap;

use super::model::{
    CountersInput, FieldInput, ListInput, PairsInput, PluginOptions, PluginsInput, ProfileDraft,
};

/// Fluent construction of a [`ProfileDraft`].
///
/// The single-entry helpers (`cookie`, `plugin`, ...) add to a structured map,
/// replacing any raw text previously set on that field.
#[derive(Debug, Clone, Default)]
pub struct ProfileBuilder {
    draft: ProfileDraft,
}

impl ProfileBuilder {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            draft: ProfileDraft {
                owner: owner.into(),
                name: name.into(),
                ..ProfileDraft::default()
            },
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.draft.description = description.into();
        self
    }

    pub fn default_profile(mut self, default: bool) -> Self {
        self.draft.default = default;
        self
    }

    pub fn global(mut self, global: bool) -> Self {
        self.draft.global = global;
        self
    }

    pub fn redundant(mut self, input: CountersInput) -> Self {
        self.draft.redundant = Some(input);
        self
    }

    pub fn cookies(mut self, input: PairsInput) -> Self {
        self.draft.cookies = Some(input);
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert_pair(&mut self.draft.cookies, name.into(), value.into());
        self
    }

    pub fn custom_headers(mut self, input: PairsInput) -> Self {
        self.draft.custom_headers = Some(input);
        self
    }

    pub fn custom_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        insert_pair(&mut self.draft.custom_headers, name.into(), value.into());
        self
    }

    pub fn login_check_url(mut self, url: impl Into<String>) -> Self {
        self.draft.login_check_url = Some(url.into());
        self
    }

    pub fn login_check_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.draft.login_check_pattern = Some(pattern.into());
        self
    }

    pub fn login_check(self, url: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.login_check_url(url).login_check_pattern(pattern)
    }

    pub fn plugins(mut self, input: PluginsInput) -> Self {
        self.draft.plugins = Some(input);
        self
    }

    pub fn plugin(mut self, key: impl Into<String>, options: PluginOptions) -> Self {
        let mut plugins = match self.draft.plugins.take() {
            Some(FieldInput::Structured(plugins)) => plugins,
            _ => BTreeMap::new(),
        };
        plugins.insert(key.into(), options);
        self.draft.plugins = Some(FieldInput::Structured(plugins));
        self
    }

    pub fn modules(mut self, input: ListInput) -> Self {
        self.draft.modules = Some(input);
        self
    }

    pub fn exclude(mut self, input: ListInput) -> Self {
        self.draft.exclude = Some(input);
        self
    }

    pub fn include(mut self, input: ListInput) -> Self {
        self.draft.include = Some(input);
        self
    }

    pub fn restrict_paths(mut self, input: ListInput) -> Self {
        self.draft.restrict_paths = Some(input);
        self
    }

    pub fn extend_paths(mut self, input: ListInput) -> Self {
        self.draft.extend_paths = Some(input);
        self
    }

    pub fn exclude_vectors(mut self, input: ListInput) -> Self {
        self.draft.exclude_vectors = Some(input);
        self
    }

    pub fn exclude_cookies(mut self, input: ListInput) -> Self {
        self.draft.exclude_cookies = Some(input);
        self
    }

    pub fn build(self) -> ProfileDraft {
        self.draft
    }
}

fn insert_pair(slot: &mut Option<PairsInput>, name: String, value: String) {
    let mut pairs = match slot.take() {
        Some(FieldInput::Structured(pairs)) => pairs,
        _ => BTreeMap::new(),
    };
    pairs.insert(name, value);
    *slot = Some(FieldInput::Structured(pairs));
}
