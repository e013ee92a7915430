pub mod config;
pub mod copy;
pub mod create;
pub mod default;
pub mod delete;
pub mod import;
pub mod list;
pub mod registry;
pub mod share;
pub mod show;
pub mod update;
pub mod validate;

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::profile::{Profile, ValidationErrors};

#[derive(Debug, Serialize)]
pub struct ValidationReport<'a> {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<&'a Profile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<&'a ValidationErrors>,
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<T> {
    let raw = fs::read_to_string(path).map_err(|err| {
        AppError::InvalidInput(format!("unable to read {}: {err}", path.display()))
    })?;

    serde_json::from_str(&raw).map_err(|err| {
        AppError::InvalidInput(format!(
            "{} is not a valid profile draft: {err}",
            path.display()
        ))
    })
}

pub(crate) fn error_lines(errors: &ValidationErrors) -> Vec<String> {
    errors
        .iter()
        .map(|error| format!("  {}: {}", error.field, error.message))
        .collect()
}

/// Prints the per-field annotations of a rejected draft before handing the errors back.
pub(crate) fn validated(
    ctx: &AppContext,
    result: Result<Profile, ValidationErrors>,
) -> AppResult<Profile> {
    let errors = match result {
        Ok(profile) => return Ok(profile),
        Err(errors) => errors,
    };

    let report = ValidationReport {
        valid: false,
        profile: None,
        errors: Some(&errors),
    };
    ctx.output.emit_lines(&error_lines(&errors), &report)?;
    Err(errors.into())
}

pub(crate) fn owned_by<'a>(profile: &'a Profile, owner: &str) -> AppResult<&'a Profile> {
    if profile.owner != owner {
        return Err(AppError::InvalidInput(format!(
            "profile #{} belongs to {}",
            profile.id, profile.owner
        )));
    }

    Ok(profile)
}

pub(crate) fn visible_to<'a>(profile: &'a Profile, user: &str) -> AppResult<&'a Profile> {
    if !profile.is_visible_to(user) {
        return Err(AppError::NotFound(format!("profile #{}", profile.id)));
    }

    Ok(profile)
}

pub(crate) fn summary_line(profile: &Profile) -> String {
    let mut line = format!("#{} {}", profile.id, profile.name);
    if profile.default {
        line.push_str(" [default]");
    }
    if profile.global {
        line.push_str(" [global]");
    }
    if !profile.shared_with.is_empty() {
        line.push_str(" [shared]");
    }
    line
}
