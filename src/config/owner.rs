use crate::error::{AppError, AppResult};

use super::Settings;

pub fn resolve_owner(requested: Option<&str>, settings: &Settings) -> AppResult<String> {
    let requested = requested.map(str::trim).filter(|owner| !owner.is_empty());

    requested
        .or_else(|| settings.default_owner())
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            AppError::Config(
                "no owner given. pass --owner or set default_owner in settings.json".to_string(),
            )
        })
}
