use crate::cli::ListArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::output::OutputMode;
use crate::store::ProfileStore;

use super::summary_line;

pub fn run(ctx: &AppContext, args: ListArgs) -> AppResult<()> {
    let collection = ctx.store.load()?;
    let profiles = if args.global {
        collection.global()
    } else {
        collection.visible_to(&ctx.owner()?)
    };

    if ctx.output.mode() == OutputMode::Text {
        if profiles.is_empty() {
            println!("0 profiles");
            return Ok(());
        }

        for (index, profile) in profiles.iter().enumerate() {
            println!("{}. {}", index + 1, summary_line(profile));
            println!("   owner: {}", profile.owner);
            println!("   {}", format_preview(&profile.description));
        }

        return Ok(());
    }

    let text = format!("{} profiles", profiles.len());
    ctx.output.emit(&text, &profiles)
}

fn format_preview(description: &str) -> String {
    let decoded = html_escape::decode_html_entities(description).to_string();
    let compact = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.is_empty() {
        return "(no description)".to_string();
    }

    if compact.len() <= 120 {
        return compact;
    }

    let mut end = 120;
    while !compact.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &compact[..end])
}
