use crate::cli::DraftArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::profile::{ProfileDraft, Validator};
use crate::store::ProfileStore;

use super::{ValidationReport, read_json, validated};

pub async fn run(ctx: &AppContext, args: DraftArgs) -> AppResult<()> {
    let owner = ctx.owner()?;
    let mut draft: ProfileDraft = read_json(&args.file)?;
    draft.id = None;
    draft.owner = owner;

    let catalog = ctx.registry().await?;
    let stored = ctx.store.load()?;
    let profile = validated(ctx, Validator::new(&catalog, &stored).validate(&draft))?;

    let report = ValidationReport {
        valid: true,
        profile: Some(&profile),
        errors: None,
    };
    let text = format!("{} is valid", profile.name);
    ctx.output.emit(&text, &report)
}
