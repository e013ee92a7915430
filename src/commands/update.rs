use crate::cli::UpdateArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::profile::{ProfileDraft, Validator};
use crate::store::ProfileStore;

use super::{owned_by, read_json, validated};

/// Whole-field reassignment: every editable field comes from the draft, while
/// id, owner, default flag and sharing stay as stored.
pub async fn run(ctx: &AppContext, args: UpdateArgs) -> AppResult<()> {
    let owner = ctx.owner()?;
    let mut draft: ProfileDraft = read_json(&args.file)?;
    let catalog = ctx.registry().await?;

    let profile = ctx.store.transaction(|profiles| {
        let existing = owned_by(profiles.get(args.id)?, &owner)?;
        draft.id = Some(existing.id);
        draft.owner = existing.owner.clone();
        draft.default = existing.default;
        draft.shared_with = existing.shared_with.clone();

        let profile = validated(ctx, Validator::new(&catalog, &*profiles).validate(&draft))?;
        profiles.replace(profile)
    })?;

    let text = format!("updated profile #{} {}", profile.id, profile.name);
    ctx.output.emit(&text, &profile)
}
