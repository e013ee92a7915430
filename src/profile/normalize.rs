//! Turns form-encoded field text into structured values.
//!
//! Text is split on `\n`; a stray `\r` on either side of a line is dropped so
//! `\n`, `\r\n` and `\n\r` breaks all parse the same. Blank lines are ignored,
//! keys and values are trimmed, and each line is split on the first delimiter:
//! `:` for redundant counters (`pattern:count`), `=` for cookies and headers
//! (`name=value`). Structured input is passed through untouched.

use std::collections::BTreeMap;

use crate::registry::PluginRegistry;

use super::model::{
    Counter, CountersInput, FieldInput, ListInput, PairsInput, PluginOptions, PluginsInput,
};

pub const COUNTER_DELIMITER: char = ':';
pub const PAIR_DELIMITER: char = '=';

const EXPAND_ALL: &str = "all";
const EXPAND_DEFAULT: &str = "default";

/// 1-based numbers of the lines that lacked the expected delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLines(pub Vec<usize>);

pub fn lines(raw: &str) -> impl Iterator<Item = (usize, &str)> {
    raw.split('\n')
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim_matches('\r').trim()))
        .filter(|(_, line)| !line.is_empty())
}

pub fn parse_pairs(
    raw: &str,
    delimiter: char,
) -> Result<BTreeMap<String, String>, MalformedLines> {
    let mut pairs = BTreeMap::new();
    let mut malformed = Vec::new();

    for (number, line) in lines(raw) {
        match line.split_once(delimiter) {
            Some((key, value)) => {
                pairs.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => malformed.push(number),
        }
    }

    if malformed.is_empty() {
        Ok(pairs)
    } else {
        Err(MalformedLines(malformed))
    }
}

pub fn pairs(input: Option<&PairsInput>) -> Result<BTreeMap<String, String>, MalformedLines> {
    match input {
        None => Ok(BTreeMap::new()),
        Some(FieldInput::Structured(map)) => Ok(map.clone()),
        Some(FieldInput::Text(raw)) => parse_pairs(raw, PAIR_DELIMITER),
    }
}

pub fn counters(
    input: Option<&CountersInput>,
) -> Result<BTreeMap<String, Counter>, MalformedLines> {
    match input {
        None => Ok(BTreeMap::new()),
        Some(FieldInput::Structured(map)) => Ok(map.clone()),
        Some(FieldInput::Text(raw)) => Ok(parse_pairs(raw, COUNTER_DELIMITER)?
            .into_iter()
            .map(|(pattern, counter)| (pattern, Counter::Text(counter)))
            .collect()),
    }
}

pub fn list(input: Option<&ListInput>) -> Vec<String> {
    match input {
        None => Vec::new(),
        Some(FieldInput::Structured(items)) => items.clone(),
        Some(FieldInput::Text(raw)) => lines(raw).map(|(_, line)| line.to_string()).collect(),
    }
}

/// `"all"` and `"default"` select every module the registry knows about.
pub fn modules<R: PluginRegistry + ?Sized>(input: Option<&ListInput>, registry: &R) -> Vec<String> {
    if let Some(FieldInput::Text(raw)) = input {
        let shortcut = raw.trim();
        if shortcut.eq_ignore_ascii_case(EXPAND_ALL) || shortcut.eq_ignore_ascii_case(EXPAND_DEFAULT)
        {
            return registry.module_keys().into_iter().collect();
        }
    }

    list(input)
}

/// `"default"` selects the registry's default plugins with empty options; any
/// other text lists one plugin identifier per line.
pub fn plugins<R: PluginRegistry + ?Sized>(
    input: Option<&PluginsInput>,
    registry: &R,
) -> BTreeMap<String, PluginOptions> {
    match input {
        None => BTreeMap::new(),
        Some(FieldInput::Structured(map)) => map.clone(),
        Some(FieldInput::Text(raw)) if raw.trim().eq_ignore_ascii_case(EXPAND_DEFAULT) => registry
            .default_plugins()
            .into_iter()
            .map(|key| (key, PluginOptions::new()))
            .collect(),
        Some(FieldInput::Text(raw)) => lines(raw)
            .map(|(_, key)| (key.to_string(), PluginOptions::new()))
            .collect(),
    }
}
