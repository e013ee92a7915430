use crate::context::AppContext;
use crate::error::AppResult;

pub async fn run(ctx: &AppContext) -> AppResult<()> {
    let catalog = ctx.registry().await?;
    if catalog.is_empty() {
        return ctx.output.emit("registry lists no plugins or modules", &catalog);
    }

    let mut lines = vec![format!("{} plugins", catalog.plugins.len())];
    for (key, info) in &catalog.plugins {
        let marker = if info.default { " (default)" } else { "" };
        match info.description.as_deref() {
            Some(description) => lines.push(format!("  {key}{marker}: {description}")),
            None => lines.push(format!("  {key}{marker}")),
        }
    }

    lines.push(format!("{} modules", catalog.modules.len()));
    lines.extend(catalog.modules.iter().map(|key| format!("  {key}")));

    ctx.output.emit_lines(&lines, &catalog)
}
