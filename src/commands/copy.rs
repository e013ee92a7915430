use crate::cli::CopyArgs;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::profile::{ProfileDraft, Validator};
use crate::store::ProfileStore;

use super::{validated, visible_to};

pub async fn run(ctx: &AppContext, args: CopyArgs) -> AppResult<()> {
    let owner = ctx.owner()?;
    let catalog = ctx.registry().await?;

    let profile = ctx.store.transaction(|profiles| {
        let source = visible_to(profiles.get(args.id)?, &owner)?;
        let name = args
            .name
            .unwrap_or_else(|| format!("Copy of {}", source.name));
        let draft = ProfileDraft::from_template(source, &owner, &name);

        let profile = validated(ctx, Validator::new(&catalog, &*profiles).validate(&draft))?;
        profiles.insert(profile)
    })?;

    let text = format!(
        "copied profile #{} to #{} {}",
        args.id, profile.id, profile.name
    );
    ctx.output.emit(&text, &profile)
}
