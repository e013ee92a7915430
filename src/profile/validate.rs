use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::registry::PluginRegistry;

use super::model::{Counter, LoginCheck, Profile, ProfileDraft, ProfileId};
use super::normalize::{self, COUNTER_DELIMITER, MalformedLines, PAIR_DELIMITER};

static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!--|</?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*)?/?>")
        .expect("markup pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Owner,
    Name,
    Description,
    Redundant,
    Cookies,
    CustomHeaders,
    LoginCheckUrl,
    LoginCheckPattern,
    Plugins,
    Modules,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Name => "name",
            Self::Description => "description",
            Self::Redundant => "redundant",
            Self::Cookies => "cookies",
            Self::CustomHeaders => "custom_headers",
            Self::LoginCheckUrl => "login_check_url",
            Self::LoginCheckPattern => "login_check_pattern",
            Self::Plugins => "plugins",
            Self::Modules => "modules",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Blank,
    Taken,
    ContainsMarkup,
    Malformed,
    NotANumber,
    NotPositive,
    OutOfRange,
    EmptyKey,
    MissingCounterpart,
    NotAbsolute,
    InvalidPattern,
    UnknownPlugin,
    UnknownModule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Field,
    pub rule: Rule,
    pub message: String,
}

/// Every rule a draft violated, in the order the rules were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("{}", summarize(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: Field, rule: Rule, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            rule,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    pub fn has(&self, field: Field) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    pub fn has_rule(&self, field: Field, rule: Rule) -> bool {
        self.errors
            .iter()
            .any(|error| error.field == field && error.rule == rule)
    }

    pub fn by_field(&self) -> BTreeMap<Field, Vec<&str>> {
        let mut grouped: BTreeMap<Field, Vec<&str>> = BTreeMap::new();
        for error in &self.errors {
            grouped
                .entry(error.field)
                .or_default()
                .push(error.message.as_str());
        }
        grouped
    }
}

fn summarize(errors: &[FieldError]) -> String {
    let mut fields = errors.iter().map(|error| error.field).collect::<Vec<_>>();
    fields.sort_unstable();
    fields.dedup();
    let names = fields.iter().map(|field| field.as_str()).collect::<Vec<_>>();
    let noun = if errors.len() == 1 { "problem" } else { "problems" };
    format!("{} {noun} in {}", errors.len(), names.join(", "))
}

/// Read access to already stored profiles, for the per-owner name check.
pub trait NameIndex {
    fn name_taken(&self, owner: &str, name: &str, except: Option<ProfileId>) -> bool;
}

impl NameIndex for [Profile] {
    fn name_taken(&self, owner: &str, name: &str, except: Option<ProfileId>) -> bool {
        self.iter().any(|profile| {
            profile.owner == owner && profile.name == name && Some(profile.id) != except
        })
    }
}

/// Normalizes and validates drafts against a plugin registry and the stored profiles.
pub struct Validator<'a, R: ?Sized, N: ?Sized> {
    registry: &'a R,
    names: &'a N,
}

impl<'a, R, N> Validator<'a, R, N>
where
    R: PluginRegistry + ?Sized,
    N: NameIndex + ?Sized,
{
    pub fn new(registry: &'a R, names: &'a N) -> Self {
        Self { registry, names }
    }

    pub fn validate(&self, draft: &ProfileDraft) -> Result<Profile, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let owner = draft.owner.trim();
        if owner.is_empty() {
            errors.push(Field::Owner, Rule::Blank, "can't be blank");
        }

        let name = draft.name.trim();
        if name.is_empty() {
            errors.push(Field::Name, Rule::Blank, "can't be blank");
        } else if self.names.name_taken(owner, name, draft.id) {
            errors.push(Field::Name, Rule::Taken, "has already been taken");
        }

        if MARKUP.is_match(&draft.description) {
            errors.push(
                Field::Description,
                Rule::ContainsMarkup,
                "must not contain HTML",
            );
        }

        let redundant = self.check_redundant(draft, &mut errors);
        let cookies = check_pairs(
            normalize::pairs(draft.cookies.as_ref()),
            Field::Cookies,
            &mut errors,
        );
        let custom_headers = check_pairs(
            normalize::pairs(draft.custom_headers.as_ref()),
            Field::CustomHeaders,
            &mut errors,
        );
        let login_check = check_login(draft, &mut errors);

        let plugins = normalize::plugins(draft.plugins.as_ref(), self.registry);
        for key in plugins.keys() {
            if !self.registry.contains_plugin(key) {
                errors.push(
                    Field::Plugins,
                    Rule::UnknownPlugin,
                    format!("unknown plugin `{key}`"),
                );
            }
        }

        let modules = normalize::modules(draft.modules.as_ref(), self.registry);
        for key in &modules {
            if !self.registry.contains_module(key) {
                errors.push(
                    Field::Modules,
                    Rule::UnknownModule,
                    format!("unknown module `{key}`"),
                );
            }
        }

        if !errors.is_empty() {
            tracing::debug!(
                owner,
                name,
                problems = errors.len(),
                "profile draft rejected"
            );
            return Err(errors);
        }

        Ok(Profile {
            id: draft.id.unwrap_or_default(),
            owner: owner.to_string(),
            name: name.to_string(),
            description: draft.description.clone(),
            default: draft.default,
            global: draft.global,
            shared_with: draft.shared_with.clone(),
            redundant,
            cookies,
            custom_headers,
            login_check,
            plugins,
            modules,
            exclude: normalize::list(draft.exclude.as_ref()),
            include: normalize::list(draft.include.as_ref()),
            restrict_paths: normalize::list(draft.restrict_paths.as_ref()),
            extend_paths: normalize::list(draft.extend_paths.as_ref()),
            exclude_vectors: normalize::list(draft.exclude_vectors.as_ref()),
            exclude_cookies: normalize::list(draft.exclude_cookies.as_ref()),
        })
    }

    fn check_redundant(
        &self,
        draft: &ProfileDraft,
        errors: &mut ValidationErrors,
    ) -> BTreeMap<String, u32> {
        let raw = match normalize::counters(draft.redundant.as_ref()) {
            Ok(raw) => raw,
            Err(lines) => {
                errors.push(
                    Field::Redundant,
                    Rule::Malformed,
                    malformed_message(&lines, COUNTER_DELIMITER),
                );
                return BTreeMap::new();
            }
        };

        let mut counters = BTreeMap::new();
        for (pattern, counter) in raw {
            if pattern.trim().is_empty() {
                errors.push(Field::Redundant, Rule::EmptyKey, "pattern can't be blank");
                continue;
            }

            match coerce_counter(&counter) {
                Ok(value) => {
                    counters.insert(pattern, value);
                }
                Err(rule) => {
                    let reason = match rule {
                        Rule::NotANumber => "is not a number",
                        Rule::OutOfRange => "is too large",
                        _ => "must be greater than 0",
                    };
                    errors.push(
                        Field::Redundant,
                        rule,
                        format!("counter for `{pattern}` {reason}"),
                    );
                }
            }
        }

        counters
    }
}

fn coerce_counter(counter: &Counter) -> Result<u32, Rule> {
    let value = match counter {
        Counter::Number(number) => match number.as_i64() {
            Some(value) => value,
            None if number.as_u64().is_some() => return Err(Rule::OutOfRange),
            None => return Err(Rule::NotANumber),
        },
        Counter::Text(text) => {
            let text = text.trim();
            match text.parse::<i64>() {
                Ok(value) => value,
                Err(_) if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => {
                    return Err(Rule::OutOfRange);
                }
                Err(_) => return Err(Rule::NotANumber),
            }
        }
    };

    if value < 1 {
        return Err(Rule::NotPositive);
    }

    u32::try_from(value).map_err(|_| Rule::OutOfRange)
}

fn check_pairs(
    parsed: Result<BTreeMap<String, String>, MalformedLines>,
    field: Field,
    errors: &mut ValidationErrors,
) -> BTreeMap<String, String> {
    let pairs = match parsed {
        Ok(pairs) => pairs,
        Err(lines) => {
            errors.push(
                field,
                Rule::Malformed,
                malformed_message(&lines, PAIR_DELIMITER),
            );
            return BTreeMap::new();
        }
    };

    if pairs.keys().any(|key| key.trim().is_empty()) {
        errors.push(field, Rule::EmptyKey, "name can't be blank");
    }

    pairs
}

fn check_login(draft: &ProfileDraft, errors: &mut ValidationErrors) -> Option<LoginCheck> {
    let url = present(draft.login_check_url.as_deref());
    let pattern = present(draft.login_check_pattern.as_deref());

    let parsed_url = url.and_then(|raw| match Url::parse(raw) {
        Ok(parsed) if parsed.has_host() => Some(parsed),
        _ => {
            errors.push(
                Field::LoginCheckUrl,
                Rule::NotAbsolute,
                "must be an absolute URL",
            );
            None
        }
    });

    let compiled = pattern.and_then(|raw| match Regex::new(raw) {
        Ok(_) => Some(raw.to_string()),
        Err(err) => {
            errors.push(
                Field::LoginCheckPattern,
                Rule::InvalidPattern,
                format!("is not a valid regular expression: {err}"),
            );
            None
        }
    });

    match (url, pattern) {
        (Some(_), None) => errors.push(
            Field::LoginCheckPattern,
            Rule::MissingCounterpart,
            "is required when login_check_url is set",
        ),
        (None, Some(_)) => errors.push(
            Field::LoginCheckUrl,
            Rule::MissingCounterpart,
            "is required when login_check_pattern is set",
        ),
        _ => {}
    }

    Some(LoginCheck {
        url: parsed_url?,
        pattern: compiled?,
    })
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn malformed_message(lines: &MalformedLines, delimiter: char) -> String {
    let numbers = lines
        .0
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("line {numbers} is missing the `{delimiter}` delimiter")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::profile::ProfileBuilder;
    use crate::profile::model::{CountersInput, PairsInput, PluginOptions, PluginsInput};
    use crate::registry::Catalog;

    fn catalog() -> Catalog {
        Catalog::default()
            .with_plugin("autologin", false)
            .with_plugin("content_types", true)
            .with_module("xss")
            .with_module("sqli")
    }

    fn check(draft: &ProfileDraft, stored: &[Profile]) -> Result<Profile, ValidationErrors> {
        let catalog = catalog();
        Validator::new(&catalog, stored).validate(draft)
    }

    fn draft() -> ProfileBuilder {
        ProfileBuilder::new("alice", "Name here").description("Stuff...")
    }

    fn counters(entries: &[(&str, Counter)]) -> CountersInput {
        CountersInput::structured(
            entries
                .iter()
                .map(|(pattern, counter)| (pattern.to_string(), counter.clone()))
                .collect(),
        )
    }

    #[test]
    fn accepts_minimal_draft() {
        let profile = check(&draft().build(), &[]).unwrap();
        assert_eq!(profile.name, "Name here");
        assert_eq!(profile.owner, "alice");
        assert!(profile.redundant.is_empty());
        assert!(profile.login_check.is_none());
    }

    #[test]
    fn rejects_empty_name() {
        let errors = check(&ProfileBuilder::new("alice", "").build(), &[]).unwrap_err();
        assert!(errors.has_rule(Field::Name, Rule::Blank));

        let errors = check(&ProfileBuilder::new("alice", "   ").build(), &[]).unwrap_err();
        assert!(errors.has_rule(Field::Name, Rule::Blank));
    }

    #[test]
    fn name_is_unique_per_owner() {
        let stored = check(&draft().build(), &[]).unwrap();
        let stored = vec![Profile { id: 1, ..stored }];

        let errors = check(&draft().build(), &stored).unwrap_err();
        assert!(errors.has_rule(Field::Name, Rule::Taken));

        let other_owner = ProfileBuilder::new("bob", "Name here").build();
        assert!(check(&other_owner, &stored).is_ok());
    }

    #[test]
    fn name_uniqueness_is_case_sensitive() {
        let stored = vec![Profile {
            id: 1,
            ..check(&draft().build(), &[]).unwrap()
        }];
        let draft = ProfileBuilder::new("alice", "name here").build();
        assert!(check(&draft, &stored).is_ok());
    }

    #[test]
    fn updating_a_profile_does_not_collide_with_itself() {
        let stored = vec![Profile {
            id: 7,
            ..check(&draft().build(), &[]).unwrap()
        }];
        let mut update = draft().build();
        update.id = Some(7);
        assert!(check(&update, &stored).is_ok());
    }

    #[test]
    fn rejects_html_in_description() {
        let errors = check(&draft().description("<em>Stuff...<em>").build(), &[]).unwrap_err();
        assert!(errors.has_rule(Field::Description, Rule::ContainsMarkup));

        let errors = check(&draft().description("see <a href=\"x\">").build(), &[]).unwrap_err();
        assert!(errors.has(Field::Description));
    }

    #[test]
    fn accepts_plain_description() {
        assert!(check(&draft().description("Stuff...").build(), &[]).is_ok());
        assert!(check(&draft().description("a < b and c > d").build(), &[]).is_ok());
    }

    #[test]
    fn rejects_non_numeric_counter() {
        let draft = draft().redundant(counters(&[("skip", "blah".into())])).build();
        let errors = check(&draft, &[]).unwrap_err();
        assert!(errors.has_rule(Field::Redundant, Rule::NotANumber));
    }

    #[test]
    fn rejects_zero_and_negative_counters() {
        let zero = draft().redundant(counters(&[("skip", 0.into())])).build();
        assert!(check(&zero, &[]).unwrap_err().has_rule(Field::Redundant, Rule::NotPositive));

        let negative = draft().redundant(counters(&[("skip", (-1).into())])).build();
        assert!(
            check(&negative, &[])
                .unwrap_err()
                .has_rule(Field::Redundant, Rule::NotPositive)
        );
    }

    #[test]
    fn huge_counters_are_out_of_range() {
        let beyond_i64 = Counter::Number(serde_json::Number::from(u64::MAX));
        let beyond_u32 = Counter::from(i64::from(u32::MAX) + 1);
        let long_text = Counter::from("99999999999999999999");

        for counter in [beyond_i64, beyond_u32, long_text] {
            let draft = draft().redundant(counters(&[("skip", counter)])).build();
            let errors = check(&draft, &[]).unwrap_err();
            assert!(errors.has_rule(Field::Redundant, Rule::OutOfRange));
            assert!(!errors.has_rule(Field::Redundant, Rule::NotANumber));
        }
    }

    #[test]
    fn numeric_and_string_counters_normalize_alike() {
        let numeric = draft()
            .redundant(counters(&[("skip", 1.into()), ("skip2", 2.into())]))
            .build();
        let text = draft()
            .redundant(counters(&[("skip", "1".into()), ("skip2", "2".into())]))
            .build();
        let expected = BTreeMap::from([("skip".to_string(), 1), ("skip2".to_string(), 2)]);

        assert_eq!(check(&numeric, &[]).unwrap().redundant, expected);
        assert_eq!(check(&text, &[]).unwrap().redundant, expected);
    }

    #[test]
    fn parses_redundant_text() {
        let draft = draft()
            .redundant(CountersInput::text("match-this:3\n\rmatch_this_too:4"))
            .build();
        let profile = check(&draft, &[]).unwrap();
        assert_eq!(profile.redundant["match-this"], 3);
        assert_eq!(profile.redundant["match_this_too"], 4);
    }

    #[test]
    fn rejects_redundant_text_without_delimiter() {
        let draft = draft().redundant(CountersInput::text("match-this 3")).build();
        let errors = check(&draft, &[]).unwrap_err();
        assert!(errors.has_rule(Field::Redundant, Rule::Malformed));
    }

    #[test]
    fn rejects_empty_cookie_and_header_names() {
        let cookies = draft().cookie("", "blah").build();
        assert!(check(&cookies, &[]).unwrap_err().has_rule(Field::Cookies, Rule::EmptyKey));

        let headers = draft().custom_header("", "blah").build();
        assert!(
            check(&headers, &[])
                .unwrap_err()
                .has_rule(Field::CustomHeaders, Rule::EmptyKey)
        );
    }

    #[test]
    fn accepts_named_cookies_and_headers() {
        let draft = draft()
            .cookie("name", "blah")
            .custom_header("name", "blah")
            .build();
        let profile = check(&draft, &[]).unwrap();
        assert_eq!(profile.cookies["name"], "blah");
        assert_eq!(profile.custom_headers["name"], "blah");
    }

    #[test]
    fn parses_cookie_and_header_text() {
        let draft = draft()
            .cookies(PairsInput::text("sessionid=deadbeefbabe\n\ruser=john.doe"))
            .custom_headers(PairsInput::text("From=john.dow@stuff.com\nX-Custom=hihihi"))
            .build();
        let profile = check(&draft, &[]).unwrap();
        assert_eq!(profile.cookies["user"], "john.doe");
        assert_eq!(profile.custom_headers["From"], "john.dow@stuff.com");
    }

    #[test]
    fn login_check_url_requires_pattern() {
        let draft = draft().login_check_url("http://test.com").build();
        let errors = check(&draft, &[]).unwrap_err();
        assert!(errors.has_rule(Field::LoginCheckPattern, Rule::MissingCounterpart));
    }

    #[test]
    fn login_check_pattern_requires_url() {
        let draft = draft().login_check_pattern("stuff").build();
        let errors = check(&draft, &[]).unwrap_err();
        assert!(errors.has_rule(Field::LoginCheckUrl, Rule::MissingCounterpart));
    }

    #[test]
    fn rejects_relative_login_check_url() {
        let draft = draft().login_check("/stuff/", "stuff").build();
        let errors = check(&draft, &[]).unwrap_err();
        assert!(errors.has_rule(Field::LoginCheckUrl, Rule::NotAbsolute));
    }

    #[test]
    fn rejects_invalid_login_check_pattern() {
        let draft = draft().login_check("http://test.com/stuff/", "(unclosed").build();
        let errors = check(&draft, &[]).unwrap_err();
        assert!(errors.has_rule(Field::LoginCheckPattern, Rule::InvalidPattern));
    }

    #[test]
    fn accepts_complete_login_check() {
        let draft = draft().login_check("http://test.com/stuff/", "stuff").build();
        let login = check(&draft, &[]).unwrap().login_check.unwrap();
        assert_eq!(login.url.as_str(), "http://test.com/stuff/");
        assert_eq!(login.pattern, "stuff");
    }

    #[test]
    fn blank_login_fields_count_as_absent() {
        let draft = draft().login_check_url("  ").login_check_pattern("").build();
        assert!(check(&draft, &[]).unwrap().login_check.is_none());
    }

    #[test]
    fn rejects_unknown_plugins() {
        let draft = draft().plugin("stuff", PluginOptions::new()).build();
        let errors = check(&draft, &[]).unwrap_err();
        assert!(errors.has_rule(Field::Plugins, Rule::UnknownPlugin));

        let empty = Catalog::default();
        assert!(Validator::new(&empty, &[] as &[Profile]).validate(&draft).is_err());
    }

    #[test]
    fn accepts_known_plugins_and_modules() {
        let draft = draft()
            .plugin("autologin", PluginOptions::new())
            .modules(crate::profile::model::ListInput::text("xss\nsqli"))
            .build();
        let profile = check(&draft, &[]).unwrap();
        assert!(profile.plugins.contains_key("autologin"));
        assert_eq!(profile.modules, ["xss", "sqli"]);
    }

    #[test]
    fn expands_default_plugin_selection() {
        let draft = draft().plugins(PluginsInput::text("default")).build();
        let profile = check(&draft, &[]).unwrap();
        assert_eq!(profile.plugins.keys().collect::<Vec<_>>(), ["content_types"]);
    }

    #[test]
    fn rejects_unknown_modules() {
        let draft = draft()
            .modules(crate::profile::model::ListInput::text("xss\nnope"))
            .build();
        let errors = check(&draft, &[]).unwrap_err();
        assert!(errors.has_rule(Field::Modules, Rule::UnknownModule));
    }

    #[test]
    fn collects_every_problem_in_one_pass() {
        let draft = ProfileBuilder::new("alice", "")
            .description("<b>bold</b>")
            .cookie("", "x")
            .login_check_url("/relative")
            .plugin("stuff", PluginOptions::new())
            .build();
        let errors = check(&draft, &[]).unwrap_err();
        let grouped = errors.by_field();

        for field in [
            Field::Name,
            Field::Description,
            Field::Cookies,
            Field::LoginCheckUrl,
            Field::LoginCheckPattern,
            Field::Plugins,
        ] {
            assert!(grouped.contains_key(&field), "missing error for {field}");
        }
        assert!(errors.to_string().starts_with(&format!("{} problems", errors.len())));
    }

    #[test]
    fn revalidating_a_profile_is_idempotent() {
        let draft = draft()
            .redundant(CountersInput::text("skip:3"))
            .cookies(PairsInput::text("sessionid=deadbeef"))
            .login_check("http://test.com/stuff/", "stuff")
            .plugins(PluginsInput::text("default"))
            .modules(crate::profile::model::ListInput::text("all"))
            .build();
        let first = check(&draft, &[]).unwrap();
        let second = check(&ProfileDraft::from_profile(&first), &[]).unwrap();
        assert_eq!(first, second);
    }
}
