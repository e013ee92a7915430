use std::path::Path;

use serde::Serialize;

use crate::cli::ConfigArgs;
use crate::config::{self, Settings};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::registry::RegistrySource;

#[derive(Debug, Serialize)]
struct ConfigView<'a> {
    config_dir: &'a Path,
    data_dir: &'a Path,
    settings: &'a Settings,
}

pub fn run(ctx: &AppContext, args: ConfigArgs) -> AppResult<()> {
    let mut settings = ctx.settings.clone();
    let changed = args.default_owner.is_some() || args.set_registry.is_some();

    if let Some(owner) = args.default_owner {
        settings.default_owner = Some(owner.trim().to_string()).filter(|owner| !owner.is_empty());
    }

    if let Some(registry) = args.set_registry {
        RegistrySource::parse(Some(&registry))?;
        settings.registry = Some(registry.trim().to_string()).filter(|raw| !raw.is_empty());
    }

    if changed {
        config::save_settings(&ctx.paths, &settings)?;
        tracing::info!(path = %ctx.paths.settings_file().display(), "settings saved");
    }

    let lines = vec![
        format!("config dir: {}", ctx.paths.config_dir().display()),
        format!("data dir: {}", ctx.paths.data_dir().display()),
        format!(
            "default owner: {}",
            settings.default_owner().unwrap_or("(unset)")
        ),
        format!("registry: {}", settings.registry().unwrap_or("(unset)")),
    ];
    let view = ConfigView {
        config_dir: ctx.paths.config_dir(),
        data_dir: ctx.paths.data_dir(),
        settings: &settings,
    };
    ctx.output.emit_lines(&lines, &view)
}
